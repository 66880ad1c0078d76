//! Filesystem-backed include resolution for the CLI.

use cyc_include::{ResolveError, Resolver};
use std::path::PathBuf;

/// Resolves include keys as UTF-8 files relative to a base directory
/// (the directory of the document being compiled).
pub struct FsResolver {
    base: PathBuf,
}

impl FsResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        FsResolver { base: base.into() }
    }
}

impl Resolver for FsResolver {
    async fn resolve(&mut self, key: &str, _open: char) -> Result<String, ResolveError> {
        let path = self.base.join(key);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ResolveError(format!("{}: {}", path.display(), e)))
    }
}
