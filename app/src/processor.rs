// ==============================================================================
// processor.rs - Pedigree Request Processing
// ==============================================================================
// Description: Upload bytes + focus inputs → table, image, filename, notices
// Author: Matt Barham
// Created: 2026-10-15
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Pipeline:
//   1. Parse upload into the record store
//   2. Tabulate the full store
//   3. Resolve focus (individual id, else band id)
//   4. Filter to the focal family (year filter applies to children only)
//   5. Render the filtered store
//   6. Compute the download filename
// ==============================================================================

use serde::Serialize;
use tracing::{info, warn};

use crate::family::filter_family;
use crate::focus::{resolve_focus, Notice};
use crate::graph::GraphAttributes;
use crate::layout::{LayoutEngine, PedigreeRenderer, RenderedImage};
use crate::output::{download_file_name, table_rows, OutputFormat, TableRow};
use crate::parsers::{ParseStats, PedigreeParser};

/// One render request. Text inputs are passed as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct PedigreeRequest {
    pub upload: Vec<u8>,
    pub individual_id: String,
    pub band_id: String,
    pub hatch_year: String,
}

/// Everything produced for one request
#[derive(Debug, Clone, Serialize)]
pub struct PedigreeResponse {
    pub rows: Vec<TableRow>,
    pub focus: Option<String>,
    pub hatch_year: Option<String>,
    pub file_name: String,
    pub notices: Vec<Notice>,
    #[serde(skip)]
    pub image: Option<RenderedImage>,
    #[serde(skip)]
    pub stats: ParseStats,
}

impl PedigreeResponse {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

pub struct PedigreeProcessor<E: LayoutEngine> {
    parser: PedigreeParser,
    renderer: PedigreeRenderer<E>,
}

impl<E: LayoutEngine> PedigreeProcessor<E> {
    pub fn new(engine: E, attributes: GraphAttributes, format: OutputFormat) -> Self {
        Self {
            parser: PedigreeParser::new(),
            renderer: PedigreeRenderer::new(engine, attributes, format),
        }
    }

    pub fn renderer(&self) -> &PedigreeRenderer<E> {
        &self.renderer
    }

    /// Run the full pipeline. Never fails; problems become notices.
    pub fn process(&self, request: &PedigreeRequest) -> PedigreeResponse {
        let parsed = self.parser.parse_bytes(&request.upload);
        let store = parsed.store;
        let rows = table_rows(&store);

        let resolution = resolve_focus(&store, &request.individual_id, &request.band_id);
        let mut notices = resolution.notices;
        let focus = resolution.focus;

        let hatch_year = Some(request.hatch_year.trim())
            .filter(|year| !year.is_empty())
            .map(str::to_string);

        let image = match focus.as_deref() {
            Some(focus_id) => {
                let family = filter_family(&store, focus_id, hatch_year.as_deref());
                self.renderer.render(&family, Some(focus_id))
            }
            None => self.renderer.render(&store, None),
        };

        let image = match image {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("No image produced: {}", e);
                notices.push(Notice::NoImage { reason: e.to_string() });
                None
            }
        };

        let file_name = download_file_name(
            focus.as_deref(),
            &request.band_id,
            hatch_year.as_deref(),
            self.renderer.format(),
        );

        info!(
            "Processed pedigree: {} individuals, focus {:?}, image {}, file {}",
            rows.len(),
            focus,
            image.is_some(),
            file_name
        );

        PedigreeResponse {
            rows,
            focus,
            hatch_year,
            file_name,
            notices,
            image,
            stats: parsed.stats,
        }
    }
}
