//! Human-readable report

use std::fmt::Write;

use crate::analysis::Analysis;
use crate::scoring::ScoreMode;

const REPORT_WIDTH: usize = 80;
const NAME_WIDTH: usize = 40;

/// Render an analysis as text tables
pub fn render_table(analysis: &Analysis) -> String {
    // Writing to a String cannot fail.
    let mut out = String::new();
    let _ = write_table(&mut out, analysis);
    out
}

fn write_table(out: &mut String, analysis: &Analysis) -> std::fmt::Result {
    let report = &analysis.report;
    let rule = "=".repeat(REPORT_WIDTH);
    let thin = "-".repeat(REPORT_WIDTH);

    writeln!(out, "{}", rule)?;
    writeln!(out, "ELASTICSEARCH INDEX IMPACT ANALYSIS FOR BILLING")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;

    match report.mode {
        ScoreMode::Normalized => {
            writeln!(out, "Scoring mode: normalized (cluster capacity)")?;
            writeln!(out, "Cluster totals: {}", report.capacity)?;
        }
        ScoreMode::Weighted => {
            writeln!(out, "Scoring mode: weighted")?;
            writeln!(out, "Weights used: {}", report.weights)?;
        }
    }
    writeln!(out)?;

    writeln!(
        out,
        "Indices collected: {} ({} outside the naming convention)",
        analysis.indices_collected,
        analysis.unmatched.len()
    )?;
    writeln!(out, "Total log groups analyzed: {}", report.total_groups)?;
    match report.mode {
        ScoreMode::Normalized => {
            writeln!(out, "Total impact score: {:.4}", report.total_score)?;
            writeln!(
                out,
                "Matched indices share of cluster: {:.2}%",
                report.total_score * 100.0
            )?;
        }
        ScoreMode::Weighted => {
            writeln!(out, "Total impact score: {:.2}", report.total_score)?;
        }
    }
    writeln!(out, "Storage column uses total store size (primaries + replicas).")?;

    if !report.caveats.is_empty() {
        writeln!(out)?;
        for caveat in &report.caveats {
            writeln!(out, "WARNING: {}", caveat)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", thin)?;
    writeln!(
        out,
        "{:<width$} {:>10} {:>10} {:>8} {:>8}",
        "Log Name",
        "Impact",
        "Storage",
        "Shards",
        "Indices",
        width = NAME_WIDTH
    )?;
    writeln!(out, "{}", thin)?;

    let precision = match report.mode {
        ScoreMode::Normalized => 4,
        ScoreMode::Weighted => 2,
    };
    for scored in &report.groups {
        let storage = format!("{:.2}G", scored.group.metrics.total_storage_gb());
        writeln!(
            out,
            "{:<width$} {:>10.prec$} {:>10} {:>8} {:>8}",
            scored.log_name(),
            scored.impact_score,
            storage,
            scored.group.metrics.shard_count,
            scored.group.index_count,
            width = NAME_WIDTH,
            prec = precision
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "BILLING PERCENTAGE BREAKDOWN")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;

    let with_cost = report.groups.iter().any(|g| g.estimated_cost.is_some());
    if with_cost {
        writeln!(
            out,
            "{:<width$} {:>9} {:>20}",
            "Log Name",
            "Impact %",
            "Estimated Monthly $",
            width = NAME_WIDTH
        )?;
    } else {
        writeln!(out, "{:<width$} {:>9}", "Log Name", "Impact %", width = NAME_WIDTH)?;
    }
    writeln!(out, "{}", thin)?;

    for scored in &report.groups {
        match scored.estimated_cost {
            Some(cost) => writeln!(
                out,
                "{:<width$} {:>8.2}% {:>20.2}",
                scored.log_name(),
                scored.impact_percentage,
                cost,
                width = NAME_WIDTH
            )?,
            None => writeln!(
                out,
                "{:<width$} {:>8.2}%",
                scored.log_name(),
                scored.impact_percentage,
                width = NAME_WIDTH
            )?,
        }
    }

    if report.groups.len() < report.total_groups {
        writeln!(
            out,
            "... ({} more groups not shown)",
            report.total_groups - report.groups.len()
        )?;
    }

    Ok(())
}
