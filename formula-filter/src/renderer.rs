use crate::traits::Renderer;
use crate::types::{FilterError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs the configured executable as `program <formula> <output>`.
pub struct CommandRenderer {
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    fn renderer_name(&self) -> String {
        "command".to_string()
    }

    async fn render(&self, program: &str, formula: &str, output: &Path) -> Result<()> {
        if program.trim().is_empty() {
            return Err(FilterError::ConfigurationMissing);
        }

        let start_time = Instant::now();
        debug!("Rendering '{}' with {} into {}", formula, program, output.display());

        let child = Command::new(program)
            .arg(formula)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FilterError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let finished = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(finished) => finished?,
            Err(_) => {
                warn!("Renderer {} timed out after {:?} on '{}'", program, self.timeout, formula);
                return Err(FilterError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let stderr = String::from_utf8_lossy(&finished.stderr);
        if !stderr.trim().is_empty() {
            debug!("Renderer stderr: {}", stderr.trim_end());
        }

        if !finished.status.success() {
            return Err(match finished.status.code() {
                Some(code) => FilterError::Render { code },
                None => FilterError::Killed,
            });
        }

        if tokio::fs::metadata(output).await.is_err() {
            return Err(FilterError::MissingOutput {
                path: output.to_path_buf(),
            });
        }

        info!(
            "Rendered '{}' in {}ms",
            formula,
            start_time.elapsed().as_millis()
        );
        Ok(())
    }
}

/// What a [`ScriptedRenderer`] does for a given formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// Write a small placeholder image and succeed.
    Image,
    /// Exit with the given status without writing anything.
    Exit(i32),
    /// Succeed but leave an empty file behind.
    EmptyImage,
    /// Succeed without writing anything.
    NoOutput,
}

/// Renderer stand-in for development and testing.
///
/// Never spawns a process. Every call is recorded so callers can check which
/// formulas reached the renderer and in what order.
pub struct ScriptedRenderer {
    outcomes: HashMap<String, ScriptedOutcome>,
    default_outcome: ScriptedOutcome,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            default_outcome: ScriptedOutcome::Image,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outcome(mut self, formula: impl Into<String>, outcome: ScriptedOutcome) -> Self {
        self.outcomes.insert(formula.into(), outcome);
        self
    }

    pub fn with_default(mut self, outcome: ScriptedOutcome) -> Self {
        self.default_outcome = outcome;
        self
    }

    /// Shared handle on the formulas rendered so far; stays valid after the
    /// renderer is boxed and handed to a pipeline.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

impl Default for ScriptedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    fn renderer_name(&self) -> String {
        "scripted".to_string()
    }

    async fn render(&self, _program: &str, formula: &str, output: &Path) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(formula.to_string());
        }

        let outcome = self
            .outcomes
            .get(formula)
            .unwrap_or(&self.default_outcome)
            .clone();
        debug!("Scripted render of '{}': {:?}", formula, outcome);

        match outcome {
            ScriptedOutcome::Image => {
                let image = format!("\u{89}PNG formula:{}", formula);
                tokio::fs::write(output, image.as_bytes()).await?;
                Ok(())
            }
            ScriptedOutcome::Exit(code) => Err(FilterError::Render { code }),
            ScriptedOutcome::EmptyImage => {
                tokio::fs::write(output, b"").await?;
                Ok(())
            }
            ScriptedOutcome::NoOutput => Ok(()),
        }
    }
}
