//! Reporter
//!
//! Renders an analysis for people (text tables) or machines (JSON). Both
//! are pure functions of the analysis.

mod json;
mod table;

pub use json::{json_groups, render_json, JsonGroup, JsonMetrics, JsonReport};
pub use table::render_table;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::analysis::Analysis;

/// Output format of the rendered report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}', expected 'table' or 'json'", other)),
        }
    }
}

/// Render an analysis in the requested format
pub fn render(analysis: &Analysis, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(analysis)),
        OutputFormat::Json => render_json(&analysis.report),
    }
}
