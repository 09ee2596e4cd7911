//! Console output and reporting
//!
//! Formats conversion results for the terminal. Colors are enabled only when
//! stdout is a TTY. The `OK - Output: <path>` and `FAIL: <message>` lines are a
//! stable contract for scripts wrapping the tool; everything else is decoration
//! controlled by the verbosity level.

use std::path::Path;
use std::time::Duration;

use crate::cli::VerbosityLevel;
use crate::output_validator::MarkupViolation;

/// Per-conversion counters for verbose reporting.
#[derive(Debug, Default, Clone)]
pub struct ConversionSummary {
    pub tasks: usize,
    pub data_objects: usize,
    pub error_entities: usize,
    pub duration: Duration,
}

/// Simple output formatter for human-readable results
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    #[cfg(test)]
    fn without_colors(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: false,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// The success line, plus conversion counters when verbose.
    pub fn format_success(&self, output_path: &Path, summary: &ConversionSummary) -> String {
        if self.verbosity == VerbosityLevel::Quiet {
            return String::new();
        }

        let mut output = format!(
            "{} - Output: {}\n",
            self.colorize("OK", "32"),
            output_path.display()
        );

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!("  Tasks: {}\n", summary.tasks));
            if summary.data_objects > 0 {
                output.push_str(&format!("  Data objects: {}\n", summary.data_objects));
            }
            if summary.error_entities > 0 {
                output.push_str(&format!("  Error entities: {}\n", summary.error_entities));
            }
            output.push_str(&format!(
                "  Duration: {}\n",
                format_duration(summary.duration)
            ));
        }

        output
    }

    /// The failure line. Printed at every verbosity level.
    pub fn format_failure(&self, message: &str) -> String {
        format!("{}: {}\n", self.colorize("FAIL", "31"), message)
    }

    /// Report of violations that were detected but deliberately ignored.
    pub fn format_ignored_violations(&self, suppressed: &[MarkupViolation]) -> String {
        if suppressed.is_empty() || self.verbosity == VerbosityLevel::Quiet {
            return String::new();
        }

        let mut output = self.colorize(
            &format!(
                "Schema validation: {} rule(s) violated but ignored\n",
                suppressed.len()
            ),
            "34",
        );

        if self.verbosity >= VerbosityLevel::Verbose {
            for violation in suppressed {
                output.push_str(&format!("    {violation}\n"));
            }
        }

        output
    }

    /// Non-fatal diagnostic, e.g. schema retrieval falling back to the reduced
    /// check. Suppressed in quiet mode.
    pub fn format_diagnostic(&self, message: &str) -> String {
        if self.verbosity == VerbosityLevel::Quiet {
            return String::new();
        }
        format!("{} {}\n", self.colorize("warning:", "33"), message)
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else {
        format!("{total_secs:.2}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_success_line_contract() {
        let output = Output::without_colors(VerbosityLevel::Normal);
        let formatted = output.format_success(
            &PathBuf::from("generated/login.hmst"),
            &ConversionSummary::default(),
        );
        assert_eq!(formatted, "OK - Output: generated/login.hmst\n");
    }

    #[test]
    fn test_success_suppressed_when_quiet() {
        let output = Output::without_colors(VerbosityLevel::Quiet);
        let formatted = output.format_success(
            &PathBuf::from("generated/login.hmst"),
            &ConversionSummary::default(),
        );
        assert!(formatted.is_empty());
    }

    #[test]
    fn test_verbose_success_includes_counters() {
        let output = Output::without_colors(VerbosityLevel::Verbose);
        let summary = ConversionSummary {
            tasks: 4,
            data_objects: 2,
            error_entities: 0,
            duration: Duration::from_millis(12),
        };
        let formatted = output.format_success(&PathBuf::from("out.hmst"), &summary);
        assert!(formatted.contains("Tasks: 4"));
        assert!(formatted.contains("Data objects: 2"));
        assert!(!formatted.contains("Error entities"));
    }

    #[test]
    fn test_failure_line_contract() {
        let output = Output::without_colors(VerbosityLevel::Quiet);
        let formatted = output.format_failure("unresolved datas[0].links[0] reference");
        assert_eq!(formatted, "FAIL: unresolved datas[0].links[0] reference\n");
    }

    #[test]
    fn test_ignored_violations_report() {
        let output = Output::without_colors(VerbosityLevel::Normal);
        let suppressed = vec![MarkupViolation::new(Some(14), "Missing child element(s)")];
        let formatted = output.format_ignored_violations(&suppressed);
        assert_eq!(formatted, "Schema validation: 1 rule(s) violated but ignored\n");

        let verbose = Output::without_colors(VerbosityLevel::Verbose);
        let formatted = verbose.format_ignored_violations(&suppressed);
        assert!(formatted.contains("Line 14"));
    }

    #[test]
    fn test_no_report_when_nothing_suppressed() {
        let output = Output::without_colors(VerbosityLevel::Normal);
        assert!(output.format_ignored_violations(&[]).is_empty());
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
    }
}
