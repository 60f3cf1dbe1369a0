use std::fmt;
use std::path::PathBuf;

use interfaces::Smiley;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RENDERER_PATH: &str = "/usr/share/formula-filter/ff.sh";
pub const DEFAULT_OUTPUT_PATH: &str = "/tmp/formula-filter.png";
pub const DEFAULT_SHORTCUT_PREFIX: &str = "ff";
pub const DELIMITER: &str = "$$";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Renderer used when the host has no preference registered yet.
    pub renderer_path: String,
    /// Every render writes here, so renders must never overlap.
    pub output_path: PathBuf,
    pub timeout_seconds: u64,
    pub shortcut_prefix: String,
    pub delimiter: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            renderer_path: DEFAULT_RENDERER_PATH.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            timeout_seconds: 30,
            shortcut_prefix: DEFAULT_SHORTCUT_PREFIX.to_string(),
            delimiter: DELIMITER.to_string(),
        }
    }
}

/// Outcome of the last outgoing message, waiting for its display event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum PendingResult {
    #[default]
    Empty,
    Success(String),
    Failure,
}

impl PendingResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, PendingResult::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Formula(String),
}

impl Segment {
    pub fn is_formula(&self) -> bool {
        matches!(self, Segment::Formula(_))
    }
}

/// A rendered formula registered as a smiley.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub shortcut: String,
    pub path: PathBuf,
    pub size: u64,
}

impl From<Smiley> for Artifact {
    fn from(smiley: Smiley) -> Self {
        Self {
            shortcut: smiley.shortcut,
            path: smiley.path,
            size: smiley.size,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("renderer exited with status {code}")]
    Render { code: i32 },

    #[error("renderer was terminated by a signal")]
    Killed,

    #[error("renderer did not finish within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("failed to start renderer {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer produced no image at {}", path.display())]
    MissingOutput { path: PathBuf },

    #[error("registry rejected {shortcut} from {}", path.display())]
    Registration { shortcut: String, path: PathBuf },

    #[error("no renderer path configured")]
    ConfigurationMissing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterError {
    /// Exit status of the renderer, when the failure came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            FilterError::Render { code } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

/// A formula that could not be turned into a smiley.
///
/// Its `Display` output is the line shown to the sender.
#[derive(Debug)]
pub struct FormulaFailure {
    pub formula: String,
    pub source: FilterError,
}

impl fmt::Display for FormulaFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source.exit_code() {
            Some(code) if code != 0 => write!(
                f,
                "Error creating smiley from '{}', return code = {}",
                self.formula, code
            ),
            _ => write!(f, "Error creating smiley from '{}'", self.formula),
        }
    }
}

impl std::error::Error for FormulaFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
