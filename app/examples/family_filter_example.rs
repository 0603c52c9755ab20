// ==============================================================================
// family_filter_example.rs - Example of Family Filtering and DOT Output
// ==============================================================================
// Description: Parses a small pedigree, filters one family, prints DOT source
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use pedigree_grapher::family::{filter_family, find_mates};
use pedigree_grapher::graph::{build_graph, GraphAttributes};
use pedigree_grapher::parsers::PedigreeParser;

const PEDIGREE: &str = "\
A1,0,0,1,0,,0
A2,0,0,2,0,,0
A3,A1,A2,1,B123,1999,0
A4,A1,A2,2,B124,2000,0
A5,0,0,2,B200,1998,0
A6,A3,A5,1,0,2021,0
";

fn main() {
    println!("=== Family Filter Example ===\n");

    let parsed = PedigreeParser::new().parse_str(PEDIGREE);
    println!("✓ Parsed {} individuals\n", parsed.store.len());

    let mates: Vec<&str> = find_mates(&parsed.store, "A3").into_iter().collect();
    println!("Mates of A3: {:?}", mates);

    let family = filter_family(&parsed.store, "A3", None);
    println!("Family of A3: {:?}\n", family.ids().collect::<Vec<_>>());

    let attributes = GraphAttributes {
        dpi: 96,
        ..GraphAttributes::default()
    };
    match build_graph(&family, Some("A3"), &attributes) {
        Some(graph) => {
            println!("--- DOT source (pipe into `dot -Tpng`) ---");
            print!("{}", graph.to_dot());
        }
        None => println!("Nothing to render"),
    }
}
