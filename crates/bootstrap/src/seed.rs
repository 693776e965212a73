// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seed file parsing and application.
//!
//! ## Statement Boundaries
//!
//! Statements end at a `;` that is outside of:
//!
//! - single-quoted strings (`'it''s'`, `'a\'b'`)
//! - double-quoted strings or identifiers
//! - backtick-quoted identifiers
//! - `-- ` and `#` line comments
//! - `/* */` block comments
//!
//! Comments stay attached to the statement they appear in. A piece with no
//! SQL outside of comments is dropped. For files without quoted or commented
//! semicolons this gives the same statements as splitting on every `;` and
//! trimming.
//!
//! ## Failure Policy
//!
//! The first failing statement is logged with its position and a short
//! preview, and the statements after it are not attempted. Seed files are
//! re-applied against already seeded schemas, so failures are expected there
//! and never stop the bootstrap.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::database::SeedSession;
use crate::error::BootstrapError;

/// Outcome of applying a seed file.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub path: PathBuf,
    /// The file did not exist and nothing was attempted.
    pub skipped: bool,
    /// Statements found in the file.
    pub statements: usize,
    /// Statements that executed successfully.
    pub executed: usize,
    /// Statements left unexecuted after a failure.
    pub not_attempted: usize,
    /// Everything that went wrong, in order.
    pub failures: Vec<BootstrapError>,
}

impl SeedReport {
    #[must_use]
    pub fn skipped(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            skipped: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    SingleQuote,
    DoubleQuote,
    Backtick,
    LineComment,
    BlockComment,
}

/// Splits SQL text into individual statements.
#[must_use]
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut state = Scan::Code;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Scan::Code => match c {
                ';' => {
                    flush(&mut statements, &mut current, has_code);
                    has_code = false;
                    continue;
                }
                '\'' => state = Scan::SingleQuote,
                '"' => state = Scan::DoubleQuote,
                '`' => state = Scan::Backtick,
                '#' => state = Scan::LineComment,
                '-' if chars.peek() == Some(&'-') => {
                    current.push(c);
                    if let Some(dash) = chars.next() {
                        current.push(dash);
                    }
                    // MySQL only treats `--` as a comment when followed by whitespace
                    if chars.peek().is_none_or(|n| n.is_whitespace()) {
                        state = Scan::LineComment;
                    } else {
                        has_code = true;
                    }
                    continue;
                }
                '/' if chars.peek() == Some(&'*') => {
                    current.push(c);
                    if let Some(star) = chars.next() {
                        current.push(star);
                    }
                    state = Scan::BlockComment;
                    continue;
                }
                _ => {}
            },
            Scan::SingleQuote | Scan::DoubleQuote | Scan::Backtick => {
                let quote = match state {
                    Scan::SingleQuote => '\'',
                    Scan::DoubleQuote => '"',
                    _ => '`',
                };
                if c == '\\' && state != Scan::Backtick {
                    current.push(c);
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                    continue;
                }
                if c == quote {
                    if chars.peek() == Some(&quote) {
                        current.push(c);
                        if let Some(doubled) = chars.next() {
                            current.push(doubled);
                        }
                        continue;
                    }
                    state = Scan::Code;
                }
            }
            Scan::LineComment => {
                if c == '\n' {
                    state = Scan::Code;
                }
            }
            Scan::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    current.push(c);
                    if let Some(slash) = chars.next() {
                        current.push(slash);
                    }
                    state = Scan::Code;
                    continue;
                }
            }
        }

        if !c.is_whitespace() && !matches!(state, Scan::LineComment | Scan::BlockComment) {
            has_code = true;
        }
        current.push(c);
    }

    flush(&mut statements, &mut current, has_code);
    statements
}

fn flush(statements: &mut Vec<String>, current: &mut String, has_code: bool) {
    let statement = current.trim();
    if has_code && !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}

/// Single-line excerpt of a statement for log messages.
pub(crate) fn preview(statement: &str) -> String {
    const LIMIT: usize = 60;
    let flat: String = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > LIMIT {
        let cut: String = flat.chars().take(LIMIT).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

/// Executes `statements` in order until one fails.
///
/// The failure is recorded rather than propagated and the remaining
/// statements are counted in [`SeedReport::not_attempted`].
pub fn apply_statements<S>(session: &mut S, statements: &[String], report: &mut SeedReport)
where
    S: SeedSession + ?Sized,
{
    report.statements = statements.len();

    for (index, statement) in statements.iter().enumerate() {
        let number = index + 1;
        match session.execute_statement(statement) {
            Ok(()) => report.executed += 1,
            Err(reason) => {
                report.not_attempted = statements.len() - number;
                warn!(
                    "Seed statement #{number} of {} failed, skipping {} remaining: {reason} [{}]",
                    statements.len(),
                    report.not_attempted,
                    preview(statement)
                );
                report.failures.push(BootstrapError::SeedStatement {
                    index: number,
                    reason,
                });
                break;
            }
        }
    }
}

/// Reads the seed file and applies it through a session opened by `open`.
///
/// The session is only opened when the file exists and is readable.
pub fn apply_seed_file<S, F>(path: &Path, open: F) -> SeedReport
where
    S: SeedSession,
    F: FnOnce() -> Result<S, BootstrapError>,
{
    if !path.exists() {
        warn!("Seed file {} not found, skipping import", path.display());
        return SeedReport::skipped(path);
    }

    let mut report = SeedReport {
        path: path.to_path_buf(),
        ..SeedReport::default()
    };

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(source) => {
            let err = BootstrapError::SeedRead {
                path: path.to_path_buf(),
                source,
            };
            error!("{err}");
            report.failures.push(err);
            return report;
        }
    };

    let statements = split_statements(&contents);
    info!(
        "Importing seed file {} ({} statements)",
        path.display(),
        statements.len()
    );

    let mut session = match open() {
        Ok(session) => session,
        Err(err) => {
            error!("Could not open seed session: {err}");
            report.statements = statements.len();
            report.failures.push(err);
            return report;
        }
    };

    apply_statements(&mut session, &statements, &mut report);

    if report.is_clean() {
        info!("Seed file imported: {} statements executed", report.executed);
    } else {
        warn!(
            "Seed file imported with errors: {} executed, {} failed, {} not attempted",
            report.executed,
            report.failed(),
            report.not_attempted
        );
    }

    report
}
