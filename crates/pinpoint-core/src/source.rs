use std::io;
use std::path::Path;

use async_trait::async_trait;

/// The engine's single boundary dependency: read current file content.
///
/// Implementations must return what is on disk right now, bypassing any
/// unsaved in-memory buffers an editor may hold. The engine treats the
/// result as authoritative and does not validate the path beyond what the
/// implementation itself enforces.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Reads straight from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskContentSource;

#[async_trait]
impl ContentSource for DiskContentSource {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}
