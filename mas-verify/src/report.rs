// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Check results and how they are printed.
//!
//! Informational and passing lines go to stdout. Failures go to stderr so a
//! script capturing stdout only sees a clean log.

use std::io::{self, Write};

/// A line of output attached to a check.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Line {
    /// A supporting value (an extracted identifier, a path, ...).
    Info(String),
    /// A satisfied condition.
    Pass(String),
    /// A violated condition with optional supporting lines.
    Fail { message: String, details: Vec<String> },
}

/// Outcome of evaluating one checklist rule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckResult {
    pub title: String,
    pub lines: Vec<Line>,
}

impl CheckResult {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: vec![],
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Info(text.into()));
    }

    pub fn pass(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Pass(text.into()));
    }

    pub fn fail(&mut self, message: impl Into<String>, details: Vec<String>) {
        self.lines.push(Line::Fail {
            message: message.into(),
            details,
        });
    }

    /// Record `pass` if `condition` holds and `fail` otherwise.
    ///
    /// Returns `condition`.
    pub fn require(
        &mut self,
        condition: bool,
        pass: impl Into<String>,
        fail: impl Into<String>,
        details: Vec<String>,
    ) -> bool {
        if condition {
            self.pass(pass);
        } else {
            self.fail(fail, details);
        }

        condition
    }

    /// A check passes unless it recorded a failure.
    pub fn passed(&self) -> bool {
        !self.lines.iter().any(|l| matches!(l, Line::Fail { .. }))
    }

    /// Failure messages recorded by this check.
    pub fn failures(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Fail { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// The full, ordered result of a verification run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VerificationReport {
    pub checks: Vec<CheckResult>,
    /// Printed after a fully passing run.
    pub success_notes: Vec<String>,
    /// Printed after a run with failures.
    pub failure_hints: Vec<String>,
}

impl VerificationReport {
    /// Whether every check passed.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed())
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.len() - self.passed_count()
    }

    /// Find a check by title.
    pub fn check(&self, title: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.title == title)
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    /// Write the report, splitting failures onto `err`.
    pub fn emit(&self, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        for (i, check) in self.checks.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "{}. {}", i + 1, check.title)?;

            for line in &check.lines {
                match line {
                    Line::Info(text) => writeln!(out, "      {}", text)?,
                    Line::Pass(text) => writeln!(out, "   PASS: {}", text)?,
                    Line::Fail { message, details } => {
                        writeln!(err, "   FAIL: {}", message)?;
                        for detail in details {
                            writeln!(err, "      {}", detail)?;
                        }
                    }
                }
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "Summary: {} passed, {} failed",
            self.passed_count(),
            self.failed_count()
        )?;

        if self.passed() {
            writeln!(out, "All verification checks PASSED")?;
            if !self.success_notes.is_empty() {
                writeln!(out)?;
                for note in &self.success_notes {
                    writeln!(out, "{}", note)?;
                }
            }
        } else {
            writeln!(err, "Verification FAILED")?;
            if !self.failure_hints.is_empty() {
                writeln!(err)?;
                for hint in &self.failure_hints {
                    writeln!(err, "{}", hint)?;
                }
            }
        }

        Ok(())
    }

    /// Write the report to the process's stdout and stderr.
    pub fn emit_to_console(&self) -> io::Result<()> {
        self.emit(&mut io::stdout().lock(), &mut io::stderr().lock())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> VerificationReport {
        let mut ok = CheckResult::new("Checking profile");
        ok.info("Profile TeamIdentifier: T6YG6KXA9D");
        ok.pass("Profile content matches");

        let mut bad = CheckResult::new("Checking universal binary");
        bad.fail(
            "Not a universal binary",
            vec!["Non-fat file: x is architecture: arm64".to_string()],
        );

        VerificationReport {
            checks: vec![ok, bad],
            success_notes: vec!["Ready for upload.".to_string()],
            failure_hints: vec!["Rebuild as universal.".to_string()],
        }
    }

    #[test]
    fn require_records_outcome() {
        let mut check = CheckResult::new("x");
        assert!(check.require(true, "good", "bad", vec![]));
        assert!(check.passed());
        assert!(!check.require(false, "good", "bad", vec!["why".into()]));
        assert!(!check.passed());
        assert_eq!(check.failures(), vec!["bad"]);
    }

    #[test]
    fn failures_go_to_stderr() -> io::Result<()> {
        let report = sample();
        assert!(!report.passed());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failed_count(), 1);

        let mut out = vec![];
        let mut err = vec![];
        report.emit(&mut out, &mut err)?;
        let out = String::from_utf8_lossy(&out);
        let err = String::from_utf8_lossy(&err);

        assert!(out.contains("1. Checking profile"));
        assert!(out.contains("      Profile TeamIdentifier: T6YG6KXA9D"));
        assert!(out.contains("   PASS: Profile content matches"));
        assert!(out.contains("2. Checking universal binary"));
        assert!(out.contains("Summary: 1 passed, 1 failed"));
        assert!(!out.contains("FAIL"));
        assert!(!out.contains("Ready for upload."));

        assert!(err.contains("   FAIL: Not a universal binary"));
        assert!(err.contains("      Non-fat file: x is architecture: arm64"));
        assert!(err.contains("Verification FAILED"));
        assert!(err.contains("Rebuild as universal."));
        assert!(!err.contains("PASS"));

        Ok(())
    }

    #[test]
    fn passing_report_prints_notes() -> io::Result<()> {
        let mut report = sample();
        report.checks.truncate(1);
        assert!(report.passed());
        assert_eq!(report.exit_code(), 0);

        let mut out = vec![];
        let mut err = vec![];
        report.emit(&mut out, &mut err)?;
        let out = String::from_utf8_lossy(&out);

        assert!(out.contains("All verification checks PASSED"));
        assert!(out.contains("Ready for upload."));
        assert!(err.is_empty());

        Ok(())
    }
}
