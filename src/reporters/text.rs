//! Plain-text renderings of the prediction reports, written next to the
//! JSON artifacts so runs can be compared without re-running the sweep.

use std::fmt::Write as _;

use crate::analysis::prediction::{FieldSummary, PredictionRow};

pub fn render_breakpoint_report(results: &[(&'static str, Vec<PredictionRow>)]) -> String {
    let mut out = String::new();
    for (name, rows) in results {
        let _ = writeln!(out, "----- {name} -----");
        for row in rows {
            let _ = writeln!(
                out,
                "top {}% in list => {}% of bugs predicted",
                row.top_percent, row.bugs_found_percent
            );
        }
        let _ = writeln!(out);
    }
    out
}

pub fn render_macro_report(summaries: &[FieldSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "macro analysis generated {}", chrono::Utc::now().to_rfc3339());
    let _ = writeln!(out);
    for summary in summaries {
        let _ = writeln!(out, "{} > avg deviation = {}", summary.name, summary.mean_deviation);
    }
    let _ = writeln!(out);
    for summary in summaries {
        let _ = writeln!(out, "{}", summary.name);
        for (top_percent, avg) in &summary.averages {
            let _ = writeln!(out, "  {top_percent} => {avg}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_report_layout() {
        let rows = vec![
            PredictionRow { top_percent: 1, bugs_found_percent: 12.5 },
            PredictionRow { top_percent: 5, bugs_found_percent: 40.0 },
        ];
        let out = render_breakpoint_report(&[("frequency", rows)]);
        assert!(out.contains("----- frequency -----"));
        assert!(out.contains("top 1% in list => 12.5% of bugs predicted"));
        assert!(out.contains("top 5% in list => 40% of bugs predicted"));
    }

    #[test]
    fn test_macro_report_lists_ranking_then_detail() {
        let summaries = vec![FieldSummary {
            field: 1,
            name: "fixed bugs",
            mean_deviation: 3.5,
            averages: vec![(1, 4.5)],
        }];
        let out = render_macro_report(&summaries);
        assert!(out.contains("fixed bugs > avg deviation = 3.5"));
        assert!(out.contains("  1 => 4.5"));
    }
}
