use std::path::Path;
use std::sync::Arc;

use crate::locate::{self, LocateError};
use crate::position::{DiskRange, ExactPosition, FuzzyPosition};
use crate::resolve::{self, ResolveError, ResolverConfig};
use crate::source::ContentSource;

/// Long-lived resolution engine: construction-time config plus the injected
/// read capability, nothing else.
///
/// Every call re-reads and re-scans content independently, so one engine can
/// serve arbitrarily many concurrent requests without coordination. Failed
/// resolutions are terminal for that call; there is no retry logic inside.
#[derive(Clone)]
pub struct SymbolResolver {
    config: ResolverConfig,
    source: Arc<dyn ContentSource>,
}

impl SymbolResolver {
    pub fn new(config: ResolverConfig, source: Arc<dyn ContentSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Map a fuzzy anchor to an exact coordinate against current disk state.
    pub async fn resolve_position(
        &self,
        path: &Path,
        fuzzy: &FuzzyPosition,
    ) -> Result<ExactPosition, ResolveError> {
        let content = self.source.read_to_string(path).await?;
        resolve::resolve_in_content(&content, fuzzy, self.config.line_search_radius)
    }

    /// Locate a literal text span uniquely against current disk state.
    pub async fn find_exact_text(
        &self,
        path: &Path,
        literal: &str,
    ) -> Result<DiskRange, LocateError> {
        let content = self.source.read_to_string(path).await?;
        locate::locate_in_content(&content, literal)
    }
}
