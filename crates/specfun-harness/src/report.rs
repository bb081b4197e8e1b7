//! Report generation for conformance results.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report for one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Reference the datasets came from, e.g. `mpmath 1.3.0`, or the fixture
    /// directory for offline runs.
    pub reference: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        let _ = writeln!(out, "- Reference: {}", self.reference);
        let _ = writeln!(out, "- Timestamp: {}", self.timestamp);
        let _ = writeln!(out, "- Total: {}", s.total);
        let _ = writeln!(out, "- Passed: {}", s.passed);
        let _ = writeln!(out, "- Failed: {}", s.failed);
        let _ = writeln!(out, "- Skipped: {}", s.skipped);
        let _ = writeln!(out, "- Known failures: {}", s.known_failures);
        let _ = writeln!(out, "- Unexpected passes: {}", s.unexpected_passes);
        let _ = writeln!(out, "- Errors: {}\n", s.errors);

        out.push_str("| Case | Function | Kind | Rows | Max rel err | Status |\n");
        out.push_str("|------|----------|------|------|-------------|--------|\n");
        for r in &s.results {
            let max_rel = r
                .max_rel_error
                .map_or_else(|| String::from("-"), |e| format!("{e:.2e}"));
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                r.case_name,
                r.function,
                r.kind,
                r.rows_checked,
                max_rel,
                r.status.label()
            );
        }

        let noted: Vec<_> = s.results.iter().filter(|r| r.detail.is_some()).collect();
        if !noted.is_empty() {
            out.push_str("\n## Details\n");
            for r in noted {
                let detail = r.detail.as_deref().unwrap_or_default();
                let _ = write!(
                    out,
                    "\n### {} ({})\n\n```text\n{}\n```\n",
                    r.case_name,
                    r.status.label(),
                    detail.trim_end()
                );
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::SpecialFunction;
    use crate::value::ValueKind;
    use crate::verify::{CaseStatus, VerificationResult};

    fn report() -> ConformanceReport {
        let mut pass = VerificationResult::without_check(
            "expi_complex",
            SpecialFunction::Expi,
            ValueKind::Complex,
            CaseStatus::Pass,
            "",
        );
        pass.detail = None;
        pass.rows_checked = 300;
        pass.max_rel_error = Some(8.5e-16);
        let skip = VerificationResult::without_check(
            "hyp2f1_real_random",
            SpecialFunction::Hyp2f1,
            ValueKind::Real,
            CaseStatus::Skip,
            "slow case",
        );
        ConformanceReport {
            title: String::from("specfun vs mpmath"),
            reference: String::from("mpmath 1.3.0"),
            timestamp: String::from("2026-10-18T00:00:00.000Z"),
            summary: VerificationSummary::from_results(vec![pass, skip]),
        }
    }

    #[test]
    fn markdown_lists_every_case() {
        let md = report().to_markdown();
        assert!(md.starts_with("# specfun vs mpmath\n"));
        assert!(md.contains("| expi_complex | expi | complex | 300 | 8.50e-16 | PASS |"));
        assert!(md.contains("| hyp2f1_real_random | hyp2f1 | real | 0 | - | SKIP |"));
        assert!(md.contains("### hyp2f1_real_random (SKIP)"));
        assert!(!md.contains("### expi_complex"));
    }

    #[test]
    fn json_round_trips_summary() {
        let json = report().to_json();
        let parsed: ConformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.summary.total, 2);
        assert_eq!(parsed.summary.skipped, 1);
    }
}
