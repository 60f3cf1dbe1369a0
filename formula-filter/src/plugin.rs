use crate::pipeline::FormulaFilter;
use interfaces::{Host, PrefFrame, Preferences, Signal};
use serde::Serialize;
use tracing::info;

pub const PLUGIN_ID: &str = "code-esmil-formula-filter";
pub const PREFS_BASE: &str = "/plugins/core/formula-filter";
pub const PREF_PATH: &str = "/plugins/core/formula-filter/path";

const SIGNALS: [Signal; 2] = [Signal::WritingImMsg, Signal::SendingImMsg];

/// Static description shown in the host's plugin list.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub website: &'static str,
}

pub const INFO: PluginInfo = PluginInfo {
    id: PLUGIN_ID,
    name: "Formula Filter",
    version: "0.1",
    summary: "Formula Filter plugin",
    description: "Runs text between $$'s through a script to create custom smileys on the fly. E.g. using latex.",
    author: "Emil Renner Berthing <esmil@mailme.dk>",
    website: "http://github.com/esmil/formula-filter",
};

/// Preference frame: a "Script" heading over the renderer path field.
pub fn pref_frame() -> PrefFrame {
    PrefFrame::new().heading("Script").field(PREF_PATH, "Path")
}

impl FormulaFilter {
    /// Register the plugin's preferences. Values the user already set are kept.
    pub fn init<P: Preferences + ?Sized>(&self, prefs: &mut P) {
        prefs.add_none(PREFS_BASE);
        prefs.add_string(PREF_PATH, &self.config().renderer_path);
    }

    /// Clear smileys left behind by an earlier run and attach both hooks.
    pub fn load<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        info!("Loading {}", PLUGIN_ID);

        self.bridge.purge(&mut *host);
        self.bridge.reset();
        self.stage.clear();

        for signal in SIGNALS {
            host.connect(signal, PLUGIN_ID);
        }
        true
    }

    /// Detach both hooks and remove every smiley this run created.
    pub fn unload<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        info!("Unloading {}", PLUGIN_ID);

        for signal in SIGNALS {
            host.disconnect(signal, PLUGIN_ID);
        }

        self.bridge.purge(&mut *host);
        self.stage.clear();
        true
    }
}
