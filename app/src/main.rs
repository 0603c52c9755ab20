// ==============================================================================
// main.rs - Pedigree Grapher Entry Point
// ==============================================================================
// Description: Command-line pedigree table and family-tree rendering
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pedigree_grapher::focus::{Notice, NoticeLevel};
use pedigree_grapher::graph::GraphAttributes;
use pedigree_grapher::layout::{GraphvizEngine, DEFAULT_DOT_BINARY};
use pedigree_grapher::output::{format_table, write_table_csv, OutputFormat};
use pedigree_grapher::processor::{PedigreeProcessor, PedigreeRequest};

/// Render a pedigree CSV (individual_id, father_id, mother_id, sex,
/// usgs_band_id, hatch_year, aux_id) as a family-tree diagram
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pedigree CSV file (7 columns, no header)
    #[arg(short, long)]
    input: PathBuf,

    /// Individual ID to focus on
    #[arg(long, default_value = "")]
    individual: String,

    /// USGS band ID to focus on (used when no individual ID is given)
    #[arg(long, default_value = "")]
    band: String,

    /// Only show children with this hatch year
    #[arg(long, default_value = "")]
    year: String,

    /// Directory for the rendered diagram
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Graphviz `dot` executable
    #[arg(long, env = "PEDIGREE_DOT_BIN", default_value = DEFAULT_DOT_BINARY)]
    dot_bin: PathBuf,

    /// Raster resolution
    #[arg(long, default_value_t = 1000)]
    dpi: u32,

    /// Also write the parsed table as CSV
    #[arg(long)]
    table_csv: Option<PathBuf>,

    /// Do not print the parsed table
    #[arg(long)]
    no_table: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the table
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pedigree_grapher=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let upload = fs::read(&args.input)
        .with_context(|| format!("Failed to read pedigree file {:?}", args.input))?;
    info!("Loaded {:?} ({} bytes)", args.input, upload.len());

    let attributes = GraphAttributes {
        dpi: args.dpi,
        ..GraphAttributes::default()
    };
    let engine = GraphvizEngine::new(&args.dot_bin);
    let processor = PedigreeProcessor::new(engine, attributes, args.format);

    let response = processor.process(&PedigreeRequest {
        upload,
        individual_id: args.individual.clone(),
        band_id: args.band.clone(),
        hatch_year: args.year.clone(),
    });

    if !args.no_table {
        print!("{}", format_table(&response.rows));
    }

    if let Some(path) = &args.table_csv {
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        write_table_csv(&response.rows, file)?;
        info!("Wrote table CSV to {:?}", path);
    }

    for notice in &response.notices {
        let level = notice_log_level(notice);
        if level == Level::ERROR {
            error!("{}", notice);
        } else if level == Level::WARN {
            warn!("{}", notice);
        } else {
            info!("{}", notice);
        }
    }

    let Some(image) = &response.image else {
        anyhow::bail!("No valid data to generate a {} graph", args.format);
    };

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", args.output_dir))?;
    let output_path = args.output_dir.join(&response.file_name);
    fs::write(&output_path, &image.bytes)
        .with_context(|| format!("Failed to write {:?}", output_path))?;

    info!("Pedigree graph written to {:?}", output_path);
    Ok(())
}

/// Log level matching a notice's severity
fn notice_log_level(notice: &Notice) -> Level {
    match notice.level() {
        NoticeLevel::Info => Level::INFO,
        NoticeLevel::Warning => Level::WARN,
        NoticeLevel::Error => Level::ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["pedigree-grapher", "--input", "owls.csv"]).unwrap();
        assert_eq!(args.format, OutputFormat::Png);
        assert_eq!(args.dpi, 1000);
        assert_eq!(args.individual, "");
        assert_eq!(args.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_cli_focus_flags() {
        let args = Args::try_parse_from([
            "pedigree-grapher",
            "-i",
            "owls.csv",
            "--band",
            "B123",
            "--year",
            "2020",
            "--format",
            "svg",
        ])
        .unwrap();
        assert_eq!(args.band, "B123");
        assert_eq!(args.year, "2020");
        assert_eq!(args.format, OutputFormat::Svg);
    }

    #[test]
    fn test_notice_log_levels() {
        let no_image = Notice::NoImage {
            reason: "No individuals to render".to_string(),
        };
        assert_eq!(notice_log_level(&no_image), Level::ERROR);

        let not_found = Notice::BandNotFound {
            band_id: "B999".to_string(),
        };
        assert_eq!(notice_log_level(&not_found), Level::WARN);

        let resolved = Notice::BandResolved {
            band_id: "B123".to_string(),
            individual_id: "A3".to_string(),
        };
        assert_eq!(notice_log_level(&resolved), Level::INFO);
    }
}
