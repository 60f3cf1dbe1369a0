use crate::types::Result;
use async_trait::async_trait;
use std::path::Path;

/// Turns formula text into an image file.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Human-readable name for logging
    fn renderer_name(&self) -> String;

    /// Render `formula` with the executable at `program`, writing the image to `output`.
    ///
    /// Returns once the image exists at `output`, or with the reason it does not.
    async fn render(&self, program: &str, formula: &str, output: &Path) -> Result<()>;
}
