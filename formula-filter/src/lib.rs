pub mod types;
pub mod traits;
pub mod splitter;
pub mod renderer;
pub mod stage;
pub mod bridge;
pub mod pipeline;
pub mod plugin;

pub use types::*;
pub use traits::Renderer;
pub use splitter::FormulaSplitter;
pub use renderer::{CommandRenderer, ScriptedOutcome, ScriptedRenderer};
pub use stage::PendingStage;
pub use bridge::ArtifactBridge;
pub use pipeline::FormulaFilter;
pub use plugin::{pref_frame, PluginInfo, INFO, PLUGIN_ID, PREFS_BASE, PREF_PATH};
