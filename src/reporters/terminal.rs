use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::analysis::prediction::{FieldSummary, PredictionRow};

/// Prints the single-cutoff prediction report: one row per ranking factor,
/// one column per top-of-list breakpoint.
pub fn report_breakpoints(cutoff_percent: usize, results: &[(&'static str, Vec<PredictionRow>)]) {
    println!(
        "{} — factor quality at {}% history cutoff",
        "git-diffmap".red().bold(),
        cutoff_percent.to_string().bright_black(),
    );
    println!();

    let Some((_, first)) = results.first() else {
        println!("{}", "  No factors to report.".yellow());
        return;
    };

    let mut header = vec!["FACTOR".to_string()];
    header.extend(first.iter().map(|r| format!("TOP {}%", r.top_percent)));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);

    for (name, rows) in results {
        let mut cells = vec![name.to_string()];
        cells.extend(rows.iter().map(|r| format!("{:.1}%", r.bugs_found_percent)));
        table.add_row(cells);
    }

    println!("{table}");
}

/// Prints the multi-analysis outcome: factors ranked by how far their
/// averaged prediction beats reviewing files at random.
pub fn report_field_ranking(summaries: &[FieldSummary]) {
    println!("{} — factor ranking across cutoffs", "git-diffmap".red().bold());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["RANK", "FACTOR", "AVG DEVIATION"]);

    for (i, summary) in summaries.iter().enumerate() {
        let deviation = format!("{:+.2}", summary.mean_deviation);
        let colored_dev = if summary.mean_deviation > 0.0 {
            deviation.green().to_string()
        } else {
            deviation.bright_black().to_string()
        };
        table.add_row(vec![format!("{:3}", i + 1), summary.name.to_string(), colored_dev]);
    }

    println!("{table}");
}
