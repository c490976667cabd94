use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::Error;
use clap::{values_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use dpll::config::{SolverConfig, SolverConfigUpdate};
use dpll::dimacs::{write_dimacs_model, DimacsParser};
use dpll::solver::Solver;

const EXIT_SAT: i32 = 10;
const EXIT_UNSAT: i32 = 20;
const EXIT_UNKNOWN: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            EXIT_ERROR
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("DPLL_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is dpll {}", env!("DPLL_VERSION"));
    info!(
        "  {} build - {}",
        env!("DPLL_PROFILE"),
        env!("DPLL_RUSTC_VERSION")
    );
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("dpll")
        .version(env!("DPLL_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("OPTION>=<VALUE")
                .help("Specify a single config option, see 'dpll -C help' for a list of options.")
                .multiple(true)
                .number_of_values(1),
        )
        .arg_from_usage(
            "--strict-header 'Reject inputs whose header disagrees with the clauses that follow'",
        )
        .arg_from_usage("--self-check 'Check the model against the input formula'")
        .get_matches();

    let config_options = values_t!(matches, "config-option", String).unwrap_or_default();

    if config_options.iter().any(|option| option == "help") {
        print!("{}", SolverConfig::help());
        return Ok(EXIT_UNKNOWN);
    }

    init_logging();
    banner();

    let mut config_update = SolverConfigUpdate::new();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut config_contents = String::new();
        fs::File::open(config_path)?.read_to_string(&mut config_contents)?;

        config_update.merge(toml::from_str(&config_contents)?);
    }

    for config_option in config_options.iter() {
        config_update.merge(toml::from_str(config_option)?);
    }

    let mut solver = Solver::new();

    solver.config(&config_update);

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    if matches.is_present("self-check") {
        solver.enable_self_checking();
    }

    if matches.is_present("strict-header") {
        let formula = DimacsParser::parse_strict(file)?;
        info!(
            "Parsed formula with {} variables and {} clauses",
            formula.var_count(),
            formula.len()
        );
        solver.add_formula(&formula);
    } else {
        solver.add_dimacs_cnf(file)?;
    }

    match solver.solve() {
        Ok(true) => {
            println!("s SATISFIABLE");
            if let Some(model) = solver.model() {
                let stdout = io::stdout();
                let mut stdout = stdout.lock();
                write_dimacs_model(&mut stdout, &model)?;
                stdout.flush()?;
            }
            Ok(EXIT_SAT)
        }
        Ok(false) => {
            println!("s UNSATISFIABLE");
            Ok(EXIT_UNSAT)
        }
        Err(err) => {
            error!("{}", err);
            println!("s UNKNOWN");
            Ok(EXIT_UNKNOWN)
        }
    }
}
