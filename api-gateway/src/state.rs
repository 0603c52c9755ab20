// ==============================================================================
// state.rs - Application State Management
// ==============================================================================
// Description: Shared configuration and layout engine for the API gateway
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use pedigree_grapher::graph::GraphAttributes;
use pedigree_grapher::layout::{GraphvizEngine, LayoutEngine, DEFAULT_DOT_BINARY};
use pedigree_grapher::validator::{UploadValidator, DEFAULT_MAX_UPLOAD_SIZE};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8099;

/// Gateway settings read from the environment
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub dot_binary: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            dot_binary: PathBuf::from(DEFAULT_DOT_BINARY),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_SIZE,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl GatewayConfig {
    /// Read `PEDIGREE_PORT`, `PEDIGREE_DOT_BIN`, `PEDIGREE_MAX_UPLOAD_BYTES`
    /// and `CORS_ALLOWED_ORIGINS` (comma-separated)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PEDIGREE_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("PEDIGREE_PORT is not a valid port: {}", value))?,
            None => defaults.port,
        };

        let dot_binary = lookup("PEDIGREE_DOT_BIN")
            .map(PathBuf::from)
            .unwrap_or(defaults.dot_binary);

        let max_upload_bytes = match lookup("PEDIGREE_MAX_UPLOAD_BYTES") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("PEDIGREE_MAX_UPLOAD_BYTES is not a byte count: {}", value))?,
            None => defaults.max_upload_bytes,
        };

        let cors_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(value) => value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            port,
            dot_binary,
            max_upload_bytes,
            cors_origins,
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,

    /// Layout engine shared by every request
    engine: Arc<dyn LayoutEngine>,

    attributes: GraphAttributes,

    validator: UploadValidator,
}

impl AppState {
    /// Create application state with the Graphviz engine from `config`
    pub fn new(config: GatewayConfig) -> Self {
        let engine = GraphvizEngine::new(&config.dot_binary);
        if engine.is_available() {
            info!("Layout engine ready: {}", engine.program().display());
        } else {
            warn!(
                "Layout engine {} not reachable; renders will return no image",
                engine.program().display()
            );
        }

        Self::with_engine(config, Arc::new(engine))
    }

    pub fn with_engine(config: GatewayConfig, engine: Arc<dyn LayoutEngine>) -> Self {
        let validator = UploadValidator::with_max_size(config.max_upload_bytes);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                attributes: GraphAttributes::default(),
                validator,
            }),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn engine(&self) -> Arc<dyn LayoutEngine> {
        Arc::clone(&self.inner.engine)
    }

    pub fn attributes(&self) -> &GraphAttributes {
        &self.inner.attributes
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.inner.validator
    }

    /// State backed by a stub engine that echoes the DOT source
    #[cfg(test)]
    pub fn mock() -> Self {
        Self::with_engine(GatewayConfig::default(), Arc::new(tests::EchoEngine))
    }
}
