// ==============================================================================
// layout.rs - Layout Engine Integration
// ==============================================================================
// Description: Rasterizes pedigree graphs through an external layout engine
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Default engine: Graphviz `dot`, DOT source on stdin, image bytes on stdout
// ==============================================================================

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::{build_graph, GraphAttributes};
use crate::models::RecordStore;
use crate::output::OutputFormat;

/// Default Graphviz executable
pub const DEFAULT_DOT_BINARY: &str = "dot";

/// Errors that can occur while producing an image
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No individuals to render")]
    NothingToRender,

    #[error("Failed to start layout engine '{program}': {source}")]
    EngineUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Layout engine failed ({status}): {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("Layout engine produced no output")]
    EmptyOutput,

    #[error("IO error talking to layout engine: {0}")]
    IoError(#[from] std::io::Error),
}

/// Turns DOT source into image bytes
pub trait LayoutEngine: Send + Sync {
    fn layout(&self, dot_source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError>;

    /// Whether the engine can currently be invoked
    fn is_available(&self) -> bool {
        true
    }
}

impl<E: LayoutEngine + ?Sized> LayoutEngine for Arc<E> {
    fn layout(&self, dot_source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        (**self).layout(dot_source, format)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Graphviz `dot` run as a child process
#[derive(Debug, Clone)]
pub struct GraphvizEngine {
    program: PathBuf,
}

impl Default for GraphvizEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DOT_BINARY)
    }
}

impl GraphvizEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl LayoutEngine for GraphvizEngine {
    fn layout(&self, dot_source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        debug!("Running {} {} on {} bytes of DOT", self.program_name(), format.graphviz_flag(), dot_source.len());

        let mut child = Command::new(&self.program)
            .arg(format.graphviz_flag())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::EngineUnavailable {
                program: self.program_name(),
                source,
            })?;

        // Closing stdin signals end of input. A write error is held until the
        // child has been reaped so an early exit reports its own stderr.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(dot_source.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;

        if !output.status.success() {
            if let Err(e) = &write_result {
                debug!("Layout engine exited before reading all input: {}", e);
            }
            return Err(RenderError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        write_result?;
        if output.stdout.is_empty() {
            return Err(RenderError::EmptyOutput);
        }

        Ok(output.stdout)
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Rendered image and its format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// Builds styled graphs and hands them to a layout engine
pub struct PedigreeRenderer<E: LayoutEngine> {
    engine: E,
    attributes: GraphAttributes,
    format: OutputFormat,
}

impl<E: LayoutEngine> PedigreeRenderer<E> {
    pub fn new(engine: E, attributes: GraphAttributes, format: OutputFormat) -> Self {
        Self {
            engine,
            attributes,
            format,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render `store`, centred on `focus` when it is present in the store.
    ///
    /// The DOT format is returned directly without calling the engine.
    pub fn render(&self, store: &RecordStore, focus: Option<&str>) -> Result<RenderedImage, RenderError> {
        let graph = build_graph(store, focus, &self.attributes).ok_or(RenderError::NothingToRender)?;
        let dot_source = graph.to_dot();

        let bytes = if self.format.needs_layout() {
            self.engine.layout(&dot_source, self.format).map_err(|e| {
                warn!("Layout failed for {} individuals: {}", store.len(), e);
                e
            })?
        } else {
            dot_source.into_bytes()
        };

        info!(
            "Rendered {} individuals as {} ({} bytes, focus {:?})",
            store.len(),
            self.format,
            bytes.len(),
            focus
        );

        Ok(RenderedImage {
            format: self.format,
            bytes,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parsers::parse_pedigree;
    use std::sync::Mutex;

    /// Records the DOT it was given and returns fixed bytes
    #[derive(Default)]
    pub(crate) struct StubEngine {
        pub(crate) seen: Mutex<Vec<String>>,
    }

    impl LayoutEngine for StubEngine {
        fn layout(&self, dot_source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
            self.seen.lock().unwrap().push(dot_source.to_string());
            Ok(format!("{}:{}", format, dot_source.len()).into_bytes())
        }
    }

    /// Always fails like a crashed engine
    pub(crate) struct FailingEngine;

    impl LayoutEngine for FailingEngine {
        fn layout(&self, _dot_source: &str, _format: OutputFormat) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::EngineFailed {
                status: "exit status: 1".to_string(),
                stderr: "syntax error".to_string(),
            })
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    const SAMPLE: &str = "A1,0,0,1,0,,0\nA2,0,0,2,0,,0\nA3,A1,A2,1,B123,1999,0\n";

    #[test]
    fn test_render_with_stub_engine() {
        let store = parse_pedigree(SAMPLE.as_bytes());
        let renderer = PedigreeRenderer::new(StubEngine::default(), GraphAttributes::default(), OutputFormat::Png);

        let image = renderer.render(&store, Some("A3")).unwrap();
        assert_eq!(image.format, OutputFormat::Png);
        assert!(image.bytes.starts_with(b"png:"));

        let seen = renderer.engine().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("rank=same"));
    }

    #[test]
    fn test_render_empty_store() {
        let renderer = PedigreeRenderer::new(StubEngine::default(), GraphAttributes::default(), OutputFormat::Png);
        let result = renderer.render(&RecordStore::new(), None);

        assert!(matches!(result, Err(RenderError::NothingToRender)));
        assert!(renderer.engine().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_render_dot_skips_engine() {
        let store = parse_pedigree(SAMPLE.as_bytes());
        let renderer = PedigreeRenderer::new(FailingEngine, GraphAttributes::default(), OutputFormat::Dot);

        let image = renderer.render(&store, None).unwrap();
        let text = String::from_utf8(image.bytes).unwrap();
        assert!(text.starts_with("digraph pedigree {"));
    }

    #[test]
    fn test_engine_failure_is_reported() {
        let store = parse_pedigree(SAMPLE.as_bytes());
        let renderer = PedigreeRenderer::new(FailingEngine, GraphAttributes::default(), OutputFormat::Svg);

        let err = renderer.render(&store, None).unwrap_err();
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn test_missing_graphviz_binary() {
        let engine = GraphvizEngine::new("/nonexistent/bin/dot");
        assert!(!engine.is_available());

        let result = engine.layout("digraph {}", OutputFormat::Png);
        match result {
            Err(RenderError::EngineUnavailable { program, .. }) => {
                assert_eq!(program, "/nonexistent/bin/dot");
            }
            other => panic!("expected EngineUnavailable, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_exiting_before_reading_input() {
        // `false` ignores its arguments and exits 1 without touching stdin
        let engine = GraphvizEngine::new("false");
        let dot_source = "a -> b; ".repeat(100_000);

        match engine.layout(&dot_source, OutputFormat::Png) {
            Err(RenderError::EngineFailed { status, .. }) => {
                assert!(status.contains('1'), "unexpected status: {}", status);
            }
            other => panic!("expected EngineFailed, got {:?}", other),
        }
    }
}
