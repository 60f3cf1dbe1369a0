pub mod command;

use anyhow::{anyhow, Result};
use formula_filter::PluginInfo;
use interfaces::{CommandId, Commands};
use tracing::info;

pub use command::{command_spec, create_custom_smiley, CommandError, COMMAND_ARGS, COMMAND_HELP, COMMAND_NAME};

pub const PLUGIN_ID: &str = "code-esmil-simple";

pub const INFO: PluginInfo = PluginInfo {
    id: PLUGIN_ID,
    name: "Custom Smiley Shortcut",
    version: "0.1",
    summary: "Create custom smiley with /cs command",
    description: "Type /cs <shortcut> <path> in any IM conversation to create a custom smiley from image at <path>",
    author: "Emil Renner Berthing <esmil@mailme.dk>",
    website: "http://github.com/esmil/formula-filter",
};

/// Owns the `/cs` registration for as long as the plugin is loaded.
#[derive(Debug, Default)]
pub struct CustomSmileyPlugin {
    command_id: Option<CommandId>,
}

impl CustomSmileyPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.command_id.is_some()
    }

    pub fn load<H: Commands + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let id = host
            .register_command(command_spec(PLUGIN_ID))
            .ok_or_else(|| anyhow!("host refused to register /{}", COMMAND_NAME))?;
        info!("Registered /{} for {}", COMMAND_NAME, PLUGIN_ID);
        self.command_id = Some(id);
        Ok(())
    }

    pub fn unload<H: Commands + ?Sized>(&mut self, host: &mut H) {
        if let Some(id) = self.command_id.take() {
            host.unregister_command(id);
            info!("Unregistered /{}", COMMAND_NAME);
        }
    }
}
