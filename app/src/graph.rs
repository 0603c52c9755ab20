// ==============================================================================
// graph.rs - Pedigree Graph Construction
// ==============================================================================
// Description: Styled directed-graph model of a record store, serialized to DOT
// Author: Matt Barham
// Created: 2026-10-13
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Styling:
//   - male (sex "1")    → box, lightblue fill, blue outgoing edges
//   - female (sex "2")  → ellipse, lightpink fill, red outgoing edges
//   - anything else     → egg, gray fill, gray outgoing edges
// Focused layout:
//   parents (same rank) → focal individual + mates (same rank) → children
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as FmtWrite;

use crate::family::find_mates;
use crate::models::{IndividualRecord, RecordStore, Sex, NOT_AVAILABLE};

/// Graphviz node shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Box,
    Ellipse,
    Egg,
}

impl NodeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeShape::Box => "box",
            NodeShape::Ellipse => "ellipse",
            NodeShape::Egg => "egg",
        }
    }
}

/// Named Graphviz colors used for fills and edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    LightBlue,
    LightPink,
    Gray,
    Blue,
    Red,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::LightBlue => "lightblue",
            Color::LightPink => "lightpink",
            Color::Gray => "gray",
            Color::Blue => "blue",
            Color::Red => "red",
        }
    }
}

impl Sex {
    pub fn node_shape(&self) -> NodeShape {
        match self {
            Sex::Male => NodeShape::Box,
            Sex::Female => NodeShape::Ellipse,
            Sex::Unknown => NodeShape::Egg,
        }
    }

    pub fn fill_color(&self) -> Color {
        match self {
            Sex::Male => Color::LightBlue,
            Sex::Female => Color::LightPink,
            Sex::Unknown => Color::Gray,
        }
    }

    pub fn edge_color(&self) -> Color {
        match self {
            Sex::Male => Color::Blue,
            Sex::Female => Color::Red,
            Sex::Unknown => Color::Gray,
        }
    }
}

/// Graph-level layout attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAttributes {
    /// Rank direction (TB = parents above children)
    pub rank_dir: String,
    /// Minimum space between nodes in a rank (inches)
    pub node_sep: f64,
    /// Minimum space between ranks (inches)
    pub rank_sep: f64,
    /// Drawing size; a trailing "!" scales up to fill it
    pub size: String,
    /// Raster resolution
    pub dpi: u32,
}

impl Default for GraphAttributes {
    fn default() -> Self {
        Self {
            rank_dir: "TB".to_string(),
            node_sep: 0.2,
            rank_sep: 0.6,
            size: "8,8!".to_string(),
            dpi: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub label_lines: Vec<String>,
    pub shape: NodeShape,
    pub fill: Color,
}

impl GraphNode {
    fn from_record(id: &str, record: &IndividualRecord) -> Self {
        let sex = record.sex();
        Self {
            id: id.to_string(),
            label_lines: label_lines(id, record),
            shape: sex.node_shape(),
            fill: sex.fill_color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub color: Color,
}

/// Statements in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphItem {
    Node(GraphNode),
    Edge(GraphEdge),
    /// Nodes constrained to one horizontal rank
    SameRank(Vec<GraphNode>),
}

/// Styled pedigree graph, independent of any layout engine
#[derive(Debug, Clone, PartialEq)]
pub struct PedigreeGraph {
    pub attributes: GraphAttributes,
    pub items: Vec<GraphItem>,
}

impl PedigreeGraph {
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.items.iter().flat_map(|item| {
            let nodes: &[GraphNode] = match item {
                GraphItem::Node(node) => std::slice::from_ref(node),
                GraphItem::SameRank(nodes) => nodes,
                GraphItem::Edge(_) => &[],
            };
            nodes.iter()
        })
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.items.iter().filter_map(|item| match item {
            GraphItem::Edge(edge) => Some(edge),
            _ => None,
        })
    }

    pub fn same_rank_groups(&self) -> impl Iterator<Item = Vec<&str>> {
        self.items.iter().filter_map(|item| match item {
            GraphItem::SameRank(nodes) => Some(nodes.iter().map(|n| n.id.as_str()).collect()),
            _ => None,
        })
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes().find(|node| node.id == id)
    }

    /// Serialize to Graphviz DOT source
    pub fn to_dot(&self) -> String {
        let attrs = &self.attributes;
        let mut dot = String::new();

        dot.push_str("digraph pedigree {\n");
        let _ = writeln!(
            dot,
            "\tgraph [dpi={} nodesep={} rankdir={} ranksep={} size={}]",
            attrs.dpi,
            attrs.node_sep,
            quote(&attrs.rank_dir),
            attrs.rank_sep,
            quote(&attrs.size)
        );

        for item in &self.items {
            match item {
                GraphItem::Node(node) => write_node(&mut dot, node, "\t"),
                GraphItem::Edge(edge) => {
                    let _ = writeln!(
                        dot,
                        "\t{} -> {} [color={}]",
                        quote(&edge.source),
                        quote(&edge.target),
                        edge.color.as_str()
                    );
                }
                GraphItem::SameRank(nodes) => {
                    dot.push_str("\t{\n\t\trank=same\n");
                    for node in nodes {
                        write_node(&mut dot, node, "\t\t");
                    }
                    dot.push_str("\t}\n");
                }
            }
        }

        dot.push_str("}\n");
        dot
    }
}

fn write_node(dot: &mut String, node: &GraphNode, indent: &str) {
    let label = node
        .label_lines
        .iter()
        .map(|line| escape(line))
        .collect::<Vec<_>>()
        .join("\\n");
    let _ = writeln!(
        dot,
        "{}{} [label=\"{}\" fillcolor={} shape={} style=filled]",
        indent,
        quote(&node.id),
        label,
        node.fill.as_str(),
        node.shape.as_str()
    );
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn quote(text: &str) -> String {
    format!("\"{}\"", escape(text))
}

/// Label lines for one node.
///
/// Hatch year is hidden when "N/A"; band and aux ids are only hidden when
/// empty, so their "N/A" placeholder is shown.
pub fn label_lines(id: &str, record: &IndividualRecord) -> Vec<String> {
    let mut lines = vec![format!("Individual: {}", id)];

    if !record.hatch_year.is_empty() && record.hatch_year != NOT_AVAILABLE {
        lines.push(format!("Hatch Year: {}", record.hatch_year));
    }
    if !record.usgs_band_id.is_empty() {
        lines.push(format!("Primary ID: {}", record.usgs_band_id));
    }
    if !record.aux_id.is_empty() {
        lines.push(format!("Aux ID: {}", record.aux_id));
    }

    lines
}

/// Edge color for a parent; parents missing from the store are gray
pub fn edge_color(store: &RecordStore, parent_id: &str) -> Color {
    store
        .get(parent_id)
        .map(|record| record.sex().edge_color())
        .unwrap_or(Color::Gray)
}

/// Emits each node at most once
struct GraphBuilder<'a> {
    store: &'a RecordStore,
    drawn: HashSet<&'a str>,
    items: Vec<GraphItem>,
}

impl<'a> GraphBuilder<'a> {
    fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            drawn: HashSet::new(),
            items: Vec::new(),
        }
    }

    /// Node for `id` unless already drawn or not in the store
    fn take_node(&mut self, id: &str) -> Option<GraphNode> {
        let store = self.store;
        let (key, record) = store.get_key_value(id)?;
        if !self.drawn.insert(key) {
            return None;
        }
        Some(GraphNode::from_record(key, record))
    }

    fn draw_node(&mut self, id: &str) {
        if let Some(node) = self.take_node(id) {
            self.items.push(GraphItem::Node(node));
        }
    }

    fn draw_same_rank<'i>(&mut self, ids: impl IntoIterator<Item = &'i str>) {
        let nodes: Vec<GraphNode> = ids.into_iter().filter_map(|id| self.take_node(id)).collect();
        if !nodes.is_empty() {
            self.items.push(GraphItem::SameRank(nodes));
        }
    }

    fn draw_edge(&mut self, source: &str, target: &str) {
        self.items.push(GraphItem::Edge(GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            color: edge_color(self.store, source),
        }));
    }

    fn finish(self, attributes: &GraphAttributes) -> PedigreeGraph {
        PedigreeGraph {
            attributes: attributes.clone(),
            items: self.items,
        }
    }
}

/// Build the styled graph for `store`.
///
/// With a focus present in the store, draws its parents, itself with its
/// mates, and the children of itself or any mate. Otherwise draws every
/// record and every parent link that resolves inside the store. Returns
/// `None` for an empty store.
pub fn build_graph(
    store: &RecordStore,
    focus: Option<&str>,
    attributes: &GraphAttributes,
) -> Option<PedigreeGraph> {
    if store.is_empty() {
        return None;
    }

    let mut builder = GraphBuilder::new(store);
    match focus.filter(|id| !id.is_empty()).and_then(|id| store.get(id).map(|r| (id, r))) {
        Some((focus_id, focal)) => draw_focused(&mut builder, focus_id, focal),
        None => draw_everything(&mut builder),
    }

    Some(builder.finish(attributes))
}

fn draw_focused(builder: &mut GraphBuilder<'_>, focus_id: &str, focal: &IndividualRecord) {
    let store = builder.store;
    let father_id = focal.father_id.as_str();
    let mother_id = focal.mother_id.as_str();
    let has_father = store.is_linkable(father_id);
    let has_mother = store.is_linkable(mother_id);

    if has_father && has_mother {
        builder.draw_same_rank([father_id, mother_id]);
        builder.draw_edge(father_id, focus_id);
        builder.draw_edge(mother_id, focus_id);
    } else {
        if has_father {
            builder.draw_node(father_id);
            builder.draw_edge(father_id, focus_id);
        }
        if has_mother {
            builder.draw_node(mother_id);
            builder.draw_edge(mother_id, focus_id);
        }
    }

    let mates = find_mates(store, focus_id);
    builder.draw_same_rank(std::iter::once(focus_id).chain(mates.iter().copied()));

    let is_family_parent = |id: &str| id == focus_id || mates.contains(id);
    for (child_id, child) in store.iter() {
        let from_father = is_family_parent(child.father_id.as_str());
        let from_mother = is_family_parent(child.mother_id.as_str());
        if !(from_father || from_mother) {
            continue;
        }

        builder.draw_node(child_id);
        if from_father {
            builder.draw_edge(&child.father_id, child_id);
        }
        if from_mother {
            builder.draw_edge(&child.mother_id, child_id);
        }
    }
}

fn draw_everything(builder: &mut GraphBuilder<'_>) {
    let store = builder.store;
    for id in store.ids() {
        builder.draw_node(id);
    }
    for (id, record) in store.iter() {
        if store.is_linkable(&record.father_id) {
            builder.draw_edge(&record.father_id, id);
        }
        if store.is_linkable(&record.mother_id) {
            builder.draw_edge(&record.mother_id, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::filter_family;
    use crate::parsers::parse_pedigree;

    const FAMILY: &str = "\
G1,0,0,1,0,,0
G2,0,0,2,0,,0
P1,G1,G2,1,B1,2015,0
M1,0,0,2,0,2016,0
C1,P1,M1,1,0,2020,0
C2,P1,M1,9,,2021,
";

    fn graph(input: &str, focus: Option<&str>) -> PedigreeGraph {
        let store = parse_pedigree(input.as_bytes());
        build_graph(&store, focus, &GraphAttributes::default()).unwrap()
    }

    fn edge_list(graph: &PedigreeGraph) -> Vec<(String, String, Color)> {
        graph
            .edges()
            .map(|e| (e.source.clone(), e.target.clone(), e.color))
            .collect()
    }

    #[test]
    fn test_empty_store_has_no_graph() {
        let store = RecordStore::new();
        assert!(build_graph(&store, None, &GraphAttributes::default()).is_none());
        assert!(build_graph(&store, Some("A"), &GraphAttributes::default()).is_none());
    }

    #[test]
    fn test_label_lines() {
        let store = parse_pedigree(FAMILY.as_bytes());

        assert_eq!(
            label_lines("P1", store.get("P1").unwrap()),
            vec!["Individual: P1", "Hatch Year: 2015", "Primary ID: B1", "Aux ID: N/A"]
        );
        // N/A hatch year hidden, N/A band shown
        assert_eq!(
            label_lines("G1", store.get("G1").unwrap()),
            vec!["Individual: G1", "Primary ID: N/A", "Aux ID: N/A"]
        );
        // Truly empty band and aux are hidden
        assert_eq!(
            label_lines("C2", store.get("C2").unwrap()),
            vec!["Individual: C2", "Hatch Year: 2021"]
        );
    }

    #[test]
    fn test_node_styles_follow_sex() {
        let g = graph(FAMILY, None);

        let p1 = g.node("P1").unwrap();
        assert_eq!((p1.shape, p1.fill), (NodeShape::Box, Color::LightBlue));
        let m1 = g.node("M1").unwrap();
        assert_eq!((m1.shape, m1.fill), (NodeShape::Ellipse, Color::LightPink));
        let c2 = g.node("C2").unwrap();
        assert_eq!((c2.shape, c2.fill), (NodeShape::Egg, Color::Gray));
    }

    #[test]
    fn test_unfocused_draws_every_record_and_link() {
        let g = graph(FAMILY, None);

        assert_eq!(g.nodes().count(), 6);
        assert_eq!(g.same_rank_groups().count(), 0);
        assert_eq!(
            edge_list(&g),
            vec![
                ("G1".into(), "P1".into(), Color::Blue),
                ("G2".into(), "P1".into(), Color::Red),
                ("P1".into(), "C1".into(), Color::Blue),
                ("M1".into(), "C1".into(), Color::Red),
                ("P1".into(), "C2".into(), Color::Blue),
                ("M1".into(), "C2".into(), Color::Red),
            ]
        );
    }

    #[test]
    fn test_unfocused_skips_links_outside_store() {
        let g = graph("K,GHOST,0,1,0,,0\n", None);
        assert_eq!(g.nodes().count(), 1);
        assert_eq!(g.edges().count(), 0);
    }

    #[test]
    fn test_focused_ranks_and_edges() {
        let g = graph(FAMILY, Some("P1"));

        let groups: Vec<Vec<&str>> = g.same_rank_groups().collect();
        assert_eq!(groups, vec![vec!["G1", "G2"], vec!["P1", "M1"]]);

        assert_eq!(
            edge_list(&g),
            vec![
                ("G1".into(), "P1".into(), Color::Blue),
                ("G2".into(), "P1".into(), Color::Red),
                ("P1".into(), "C1".into(), Color::Blue),
                ("M1".into(), "C1".into(), Color::Red),
                ("P1".into(), "C2".into(), Color::Blue),
                ("M1".into(), "C2".into(), Color::Red),
            ]
        );
        assert_eq!(g.nodes().count(), 6);
    }

    #[test]
    fn test_focused_single_parent() {
        let input = "F,0,0,1,0,,0\nK,F,0,2,0,,0\n";
        let g = graph(input, Some("K"));

        let groups: Vec<Vec<&str>> = g.same_rank_groups().collect();
        assert_eq!(groups, vec![vec!["K"]]);
        assert_eq!(edge_list(&g), vec![("F".into(), "K".into(), Color::Blue)]);
        assert!(matches!(g.items[0], GraphItem::Node(ref n) if n.id == "F"));
    }

    #[test]
    fn test_focused_child_with_outside_parent_gets_one_edge() {
        let input = "\
P,0,0,1,0,,0
M,0,0,2,0,,0
C1,P,M,1,0,,0
C2,0,M,1,0,,0
";
        let g = graph(input, Some("P"));
        let into_c2: Vec<_> = g.edges().filter(|e| e.target == "C2").collect();
        assert_eq!(into_c2.len(), 1);
        assert_eq!(into_c2[0].source, "M");
    }

    #[test]
    fn test_each_node_drawn_once() {
        // Mate is also the focal individual's mother
        let input = "\
F,0,0,1,0,,0
M,0,0,2,0,,0
P,F,M,1,0,,0
C,P,M,1,0,,0
";
        let g = graph(input, Some("P"));
        let mut ids: Vec<&str> = g.nodes().map(|n| n.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["C", "F", "M", "P"]);
    }

    #[test]
    fn test_edge_color_of_missing_parent_is_gray() {
        let store = parse_pedigree(b"K,0,0,1,0,,0\n");
        assert_eq!(edge_color(&store, "missing"), Color::Gray);
        assert_eq!(edge_color(&store, "K"), Color::Blue);
    }

    #[test]
    fn test_filtered_store_renders_focus() {
        let store = parse_pedigree(FAMILY.as_bytes());
        let family = filter_family(&store, "C1", None);
        let g = build_graph(&family, Some("C1"), &GraphAttributes::default()).unwrap();

        let groups: Vec<Vec<&str>> = g.same_rank_groups().collect();
        assert_eq!(groups, vec![vec!["P1", "M1"], vec!["C1"]]);
    }

    #[test]
    fn test_to_dot() {
        let g = graph("A,0,0,1,B\"7,1999,0\nK,A,0,2,0,,0\n", None);
        let dot = g.to_dot();

        assert!(dot.starts_with("digraph pedigree {\n"));
        assert!(dot.contains("graph [dpi=1000 nodesep=0.2 rankdir=\"TB\" ranksep=0.6 size=\"8,8!\"]"));
        assert!(dot.contains(
            "\t\"A\" [label=\"Individual: A\\nHatch Year: 1999\\nPrimary ID: B\\\"7\\nAux ID: N/A\" fillcolor=lightblue shape=box style=filled]"
        ));
        assert!(dot.contains("\t\"A\" -> \"K\" [color=blue]"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_to_dot_same_rank_block() {
        let dot = graph(FAMILY, Some("P1")).to_dot();
        assert!(dot.contains("\t{\n\t\trank=same\n\t\t\"G1\" ["));
    }
}
