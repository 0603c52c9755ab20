// ==============================================================================
// lib.rs - Pedigree Grapher Library
// ==============================================================================
// Description: Library interface for pedigree parsing, filtering and rendering
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod parsers;
pub mod models;
pub mod family;
pub mod focus;
pub mod graph;
pub mod layout;
pub mod output;
pub mod validator;
pub mod processor;

pub use layout::{GraphvizEngine, LayoutEngine, RenderError};
pub use models::{IndividualRecord, RecordStore};
pub use processor::{PedigreeProcessor, PedigreeRequest, PedigreeResponse};
