use crate::types::{Artifact, FilterError, Result};
use interfaces::SmileyStore;
use std::path::Path;
use tracing::{debug, info};

/// Registers rendered formulas as smileys and removes the ones it made.
///
/// Shortcuts are `<prefix>-<n>` with `n` counting successful registrations
/// from zero. The counter only goes back to zero through [`ArtifactBridge::reset`],
/// which the plugin calls on load right after purging.
pub struct ArtifactBridge {
    prefix: String,
    counter: u64,
}

impl ArtifactBridge {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    /// Number of artifacts registered since the last reset.
    pub fn created(&self) -> u64 {
        self.counter
    }

    pub fn next_shortcut(&self) -> String {
        format!("{}-{}", self.prefix, self.counter)
    }

    /// Register the image at `path` under a freshly generated shortcut.
    pub fn register_next<S: SmileyStore + ?Sized>(&mut self, store: &mut S, path: &Path) -> Result<Artifact> {
        let shortcut = self.next_shortcut();
        let artifact = Self::register(store, &shortcut, path)?;
        self.counter += 1;
        Ok(artifact)
    }

    /// Register the image at `path` under `shortcut` as given.
    pub fn register<S: SmileyStore + ?Sized>(store: &mut S, shortcut: &str, path: &Path) -> Result<Artifact> {
        let smiley = store
            .smiley_from_file(shortcut, path)
            .ok_or_else(|| FilterError::Registration {
                shortcut: shortcut.to_string(),
                path: path.to_path_buf(),
            })?;

        debug!("Created smiley {} from {} ({} bytes)", smiley.shortcut, smiley.path.display(), smiley.size);
        Ok(Artifact::from(smiley))
    }

    /// Whether `shortcut` has the exact shape this bridge generates.
    pub fn owns(&self, shortcut: &str) -> bool {
        shortcut
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .map(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false)
    }

    /// Delete every smiley in `store` that this bridge could have created.
    /// Returns how many were removed.
    pub fn purge<S: SmileyStore + ?Sized>(&self, store: &mut S) -> usize {
        let mut removed = 0;
        for smiley in store.smileys() {
            if self.owns(&smiley.shortcut) && store.delete_smiley(&smiley.shortcut) {
                removed += 1;
            }
        }
        info!("Purged {} {}-* smileys", removed, self.prefix);
        removed
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
