use std::{env, path::Path, process::Command, str::from_utf8};

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|result| result.status.success())?;
    from_utf8(&output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}

/// Version from the closest release tag, if building from a git checkout.
fn git_version() -> Option<String> {
    if !Path::new("../.git").exists() {
        return None;
    }
    let description = command_output(
        "git",
        &[
            "describe",
            "--tags",
            "--match=v[0-9]*",
            "--dirty=-d",
            "--always",
        ],
    )?;
    Some(description.trim_start_matches('v').to_string())
}

fn main() {
    let rustc = env::var("RUSTC").unwrap();

    let version = git_version().unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap());
    let rustc_version =
        command_output(&rustc, &["--version"]).expect("Failed to query rustc version");

    println!("cargo:rustc-env=DPLL_VERSION={}", version);
    println!("cargo:rustc-env=DPLL_RUSTC_VERSION={}", rustc_version);
    println!(
        "cargo:rustc-env=DPLL_PROFILE={}",
        env::var("PROFILE").unwrap()
    );
}
