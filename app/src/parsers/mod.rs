// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for pedigree input files
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-12
// Version: 1.0.0
// ==============================================================================

pub mod pedigree;

pub use pedigree::{
    parse_pedigree, ParseStats, ParsedPedigree, PedigreeParseError, PedigreeParser,
    PEDIGREE_COLUMNS,
};
