//! DIMCAS CNF parser and writer for the dpll SAT solver.
//!
//! The input is a sequence of lines. Lines starting with `c` are comments, lines starting with
//! `p` are problem headers of the form `p cnf <variables> <clauses>`. Every other non-empty line
//! consists of whitespace separated integers and ends with a `0`. Non-zero integers denote
//! literals and each `0` terminates a clause, so a clause never continues on the next line.
//!
//! Only the first well formed header is used. Other header lines are skipped by the parser and
//! reported by [`DimacsParser::check_header`].

use std::{borrow::Borrow, io, mem::replace};

use dpll_formula::{Formula, Lit, Var};

use anyhow::Error;
use log::{debug, warn};
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Clone, Debug, Error)]
pub enum ParserError {
    #[error(
        "line {}: Unexpected character in DIMACS CNF input: '{}'",
        line,
        unexpected
    )]
    UnexpectedInput { line: usize, unexpected: char },
    #[error(
        "line {}: Literal index is too large: {}{}...",
        line,
        index,
        final_digit
    )]
    LiteralTooLarge {
        line: usize,
        index: usize,
        final_digit: usize,
    },
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Another header after the header in line {}", line, first_line)]
    DuplicateHeader { line: usize, first_line: usize },
    #[error("line {}: Unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error(
        "Formula uses variable {} while the header specifies {} variables",
        var_count,
        header_var_count
    )]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error(
        "Formula has {} clauses while the header specifies {} clauses",
        clause_count,
        header_clause_count
    )]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("Parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count present in a DIMACS CNF header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parser for DIMACS CNF files.
///
/// The input can be consumed in chunks of bytes, with the clauses parsed so far retrieved using
/// [`take_formula`](DimacsParser::take_formula) at any point.
///
/// The header only describes the input. Malformed or repeated headers and the counts it
/// specifies are only enforced by [`check_header`](DimacsParser::check_header).
pub struct DimacsParser {
    formula: Formula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,
    header_line_number: usize,
    header_error: Option<ParserError>,

    line_number: usize,
    clause_count: usize,
    max_var_count: usize,
    partial_lit: usize,
    negate_next_lit: bool,

    in_lit: bool,
    in_comment_or_header: bool,
    in_header: bool,
    start_of_line: bool,
    error: bool,

    header_line: Vec<u8>,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: Formula::new(),
            partial_clause: vec![],
            header: None,
            header_line_number: 0,
            header_error: None,

            line_number: 1,
            clause_count: 0,
            max_var_count: 0,
            partial_lit: 0,
            negate_next_lit: false,

            in_lit: false,
            in_comment_or_header: false,
            in_header: false,
            start_of_line: true,
            error: false,

            header_line: vec![],
        }
    }

    /// Parse the given input into a single [`Formula`](dpll_formula::Formula).
    ///
    /// A malformed header or one that disagrees with the parsed formula is reported as a warning
    /// only. Use
    /// [`parse_strict`](DimacsParser::parse_strict) to reject such inputs.
    pub fn parse(input: impl io::Read) -> Result<Formula, Error> {
        let mut parser = Self::parse_incremental(input, |_| Ok(()))?;
        if let Err(err) = parser.check_header() {
            warn!("{}", err);
        }
        Ok(parser.take_formula())
    }

    /// Parse the given input and verify the header if present.
    pub fn parse_strict(input: impl io::Read) -> Result<Formula, Error> {
        let mut parser = Self::parse_incremental(input, |_| Ok(()))?;
        parser.check_header()?;
        Ok(parser.take_formula())
    }

    /// Parse the given input incrementally.
    ///
    /// The callback is invoked after each chunk with a reference to the parser. It can process
    /// the formula incrementally by calling [`take_formula`](DimacsParser::take_formula).
    pub fn parse_incremental(
        input: impl io::Read,
        mut callback: impl FnMut(&mut DimacsParser) -> Result<(), Error>,
    ) -> Result<DimacsParser, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            callback(&mut parser)?;
        }
        parser.eof()?;
        callback(&mut parser)?;

        Ok(parser)
    }

    /// Parse a chunk of input.
    ///
    /// After parsing the last chunk call the [`eof`](DimacsParser::eof) method.
    ///
    /// If this method returns an error, the parser is in an invalid state and cannot parse further
    /// chunks.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            match byte {
                b'\n' | b'\r' if self.in_comment_or_header => {
                    if self.in_header {
                        self.in_header = false;
                        self.parse_header_line();
                    }
                    self.in_comment_or_header = false;
                    self.start_of_line = true
                }
                _ if self.in_comment_or_header => {
                    if self.in_header {
                        self.header_line.push(byte);
                    }
                }
                b'0'..=b'9' => {
                    self.in_lit = true;
                    let digit = (byte - b'0') as usize;

                    const CAN_OVERFLOW: usize = Var::max_count() / 10;
                    const OVERFLOW_DIGIT: usize = Var::max_count() % 10;

                    if CAN_OVERFLOW <= self.partial_lit {
                        let carry = (digit <= OVERFLOW_DIGIT) as usize;

                        if CAN_OVERFLOW + carry <= self.partial_lit {
                            self.error = true;
                            return Err(ParserError::LiteralTooLarge {
                                line: self.line_number,
                                index: self.partial_lit,
                                final_digit: digit,
                            });
                        }
                    }

                    self.partial_lit = self.partial_lit * 10 + digit;

                    self.start_of_line = false
                }
                b'-' if !self.negate_next_lit && !self.in_lit => {
                    self.negate_next_lit = true;
                    self.start_of_line = false
                }
                b' ' | b'\t' | b'\n' | b'\r' if !self.negate_next_lit || self.in_lit => {
                    self.finish_literal();
                    self.negate_next_lit = false;
                    self.in_lit = false;
                    self.partial_lit = 0;
                    self.start_of_line = byte == b'\n' || byte == b'\r';

                    if self.start_of_line && !self.partial_clause.is_empty() {
                        self.error = true;
                        return Err(ParserError::UnterminatedClause {
                            line: self.line_number,
                        });
                    }
                }
                b'c' if self.start_of_line => {
                    self.in_comment_or_header = true;
                }
                b'p' if self.start_of_line => {
                    self.in_comment_or_header = true;
                    self.in_header = true;
                    self.header_line.push(b'p');
                }
                _ => {
                    self.error = true;
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    });
                }
            }
            if byte == b'\n' {
                self.line_number += 1;
            }
        }

        Ok(())
    }

    /// Finish parsing the input.
    ///
    /// This does not check whether the header information was correct, call
    /// [`check_header`](DimacsParser::check_header) for this.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.in_header {
            self.in_header = false;
            self.parse_header_line();
        }

        self.finish_literal();
        self.in_lit = false;
        self.partial_lit = 0;

        if !self.partial_clause.is_empty() || self.negate_next_lit {
            self.error = true;
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        Ok(())
    }

    /// Verifies the header information when present.
    ///
    /// Fails on the first malformed or repeated header line. The formula may use fewer variables
    /// than announced, but no variable past the announced count. The clause count has to match
    /// exactly. Does nothing else when the input doesn't contain a header.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(err) = &self.header_error {
            return Err(err.clone());
        }

        if let Some(header) = self.header {
            if self.max_var_count > header.var_count {
                return Err(ParserError::VarCount {
                    var_count: self.max_var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Returns the subformula of everything parsed since the last call to this method.
    pub fn take_formula(&mut self) -> Formula {
        replace(&mut self.formula, Formula::new())
    }

    /// Return the DIMACS CNF header data if present.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// One more than the largest variable index parsed so far.
    pub fn var_count(&self) -> usize {
        self.max_var_count
    }

    fn finish_literal(&mut self) {
        if self.in_lit {
            if self.partial_lit == 0 {
                self.formula.add_clause(&self.partial_clause);
                self.partial_clause.clear();
                self.clause_count += 1;
            } else {
                self.max_var_count = self.max_var_count.max(self.partial_lit);
                self.partial_clause
                    .push(Var::from_dimacs(self.partial_lit as isize).lit(!self.negate_next_lit));
            }
        }
    }

    /// Records the header or, if it can't be used, the reason for skipping it.
    fn parse_header_line(&mut self) {
        let line = self.line_number;
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();
        self.header_line.clear();

        if self.header.is_some() {
            debug!("line {}: Skipping additional header", line);
            self.record_header_error(ParserError::DuplicateHeader {
                line,
                first_line: self.header_line_number,
            });
            return;
        }

        match parse_header_values(&header_line) {
            Some((var_count, _)) if var_count > Var::max_count() => {
                self.record_header_error(ParserError::LiteralTooLarge {
                    line,
                    index: var_count / 10,
                    final_digit: var_count % 10,
                });
            }
            Some((var_count, clause_count)) => {
                self.header = Some(DimacsHeader {
                    var_count,
                    clause_count,
                });
                self.header_line_number = line;
            }
            None => {
                debug!("line {}: Skipping malformed header", line);
                self.record_header_error(ParserError::InvalidHeader {
                    line,
                    header: header_line,
                });
            }
        }
    }

    fn record_header_error(&mut self, err: ParserError) {
        if self.header_error.is_none() {
            self.header_error = Some(err);
        }
    }
}

/// Variable and clause count of a `p cnf <variables> <clauses>` line.
fn parse_header_values(header_line: &str) -> Option<(usize, usize)> {
    if !header_line.starts_with("p ") {
        return None;
    }

    let mut header_values = header_line[2..].split_whitespace();

    if header_values.next() != Some("cnf") {
        return None;
    }

    let var_count = header_values.next()?.parse().ok()?;
    let clause_count = header_values.next()?.parse().ok()?;

    if header_values.next().is_some() {
        return None;
    }

    Some((var_count, clause_count))
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Can be used with [`write_dimacs_header`] to implement incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &Formula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

/// Write a satisfying assignment as a DIMACS value line.
///
/// Produces `v` followed by the true literals and a terminating `0`.
pub fn write_dimacs_model(target: &mut impl io::Write, model: &[Lit]) -> io::Result<()> {
    target.write_all(b"v")?;
    for lit in model.iter() {
        target.write_all(b" ")?;
        itoa::write(&mut *target, lit.to_dimacs())?;
    }
    target.write_all(b" 0\n")
}
