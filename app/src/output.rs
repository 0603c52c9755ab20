// ==============================================================================
// output.rs - Output Generation
// ==============================================================================
// Description: Image formats, download filenames and the parsed-data table
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::models::RecordStore;

/// Supported rendered outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raster image
    #[default]
    Png,
    /// Vector image
    Svg,
    /// Graphviz source, no layout engine required
    Dot,
}

impl OutputFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Dot => "dot",
        }
    }

    /// Get MIME type for HTTP downloads
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
            OutputFormat::Dot => "text/vnd.graphviz",
        }
    }

    /// Graphviz `-T` output flag
    pub fn graphviz_flag(&self) -> &'static str {
        match self {
            OutputFormat::Png => "-Tpng",
            OutputFormat::Svg => "-Tsvg",
            OutputFormat::Dot => "-Tcanon",
        }
    }

    /// Whether producing this format needs the external layout engine
    pub fn needs_layout(&self) -> bool {
        !matches!(self, OutputFormat::Dot)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "dot" | "gv" => Ok(OutputFormat::Dot),
            other => anyhow::bail!("Unsupported output format: {}", other),
        }
    }
}

/// One row of the parsed-data table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(rename = "Individual ID")]
    pub individual_id: String,

    #[serde(rename = "Father ID")]
    pub father_id: String,

    #[serde(rename = "Mother ID")]
    pub mother_id: String,

    #[serde(rename = "Sex")]
    pub sex: String,

    #[serde(rename = "USGS Band ID")]
    pub usgs_band_id: String,

    #[serde(rename = "Hatch Year")]
    pub hatch_year: String,

    #[serde(rename = "Aux ID")]
    pub aux_id: String,
}

/// Column headers in display order
pub const TABLE_HEADERS: [&str; 7] = [
    "Individual ID",
    "Father ID",
    "Mother ID",
    "Sex",
    "USGS Band ID",
    "Hatch Year",
    "Aux ID",
];

impl TableRow {
    fn cells(&self) -> [&str; 7] {
        [
            self.individual_id.as_str(),
            self.father_id.as_str(),
            self.mother_id.as_str(),
            self.sex.as_str(),
            self.usgs_band_id.as_str(),
            self.hatch_year.as_str(),
            self.aux_id.as_str(),
        ]
    }
}

/// Table rows for every record, in store order
pub fn table_rows(store: &RecordStore) -> Vec<TableRow> {
    store
        .iter()
        .map(|(id, record)| TableRow {
            individual_id: id.to_string(),
            father_id: record.father_id.clone(),
            mother_id: record.mother_id.clone(),
            sex: record.sex.clone(),
            usgs_band_id: record.usgs_band_id.clone(),
            hatch_year: record.hatch_year.clone(),
            aux_id: record.aux_id.clone(),
        })
        .collect()
}

/// Write rows as CSV with a header line
pub fn write_table_csv<W: Write>(rows: &[TableRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .with_context(|| format!("Failed to write table row for {}", row.individual_id))?;
    }
    csv_writer.flush().context("Failed to flush table CSV")?;
    Ok(())
}

/// Column-aligned plain-text rendering of the table
pub fn format_table(rows: &[TableRow]) -> String {
    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_line = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rules: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let rules: Vec<&str> = rules.iter().map(String::as_str).collect();

    let mut out = String::new();
    out.push_str(&render_line(&TABLE_HEADERS));
    out.push('\n');
    out.push_str(&render_line(&rules));
    out.push('\n');
    for row in rows {
        out.push_str(&render_line(&row.cells()));
        out.push('\n');
    }
    out
}

/// Download filename reflecting the focus and filters.
///
/// Prefix is the focal id, else `band_{band_id}` when a band id was typed,
/// else `all_individuals`; a year filter adds a `_{year}` suffix.
pub fn download_file_name(
    focus: Option<&str>,
    band_id: &str,
    hatch_year: Option<&str>,
    format: OutputFormat,
) -> String {
    let prefix = match focus {
        Some(id) if !id.is_empty() => id.to_string(),
        _ if !band_id.is_empty() => format!("band_{}", band_id),
        _ => "all_individuals".to_string(),
    };
    let suffix = hatch_year
        .filter(|year| !year.is_empty())
        .map(|year| format!("_{}", year))
        .unwrap_or_default();

    format!("{}_pedigree{}.{}", prefix, suffix, format.extension())
}
