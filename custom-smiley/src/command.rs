use formula_filter::{Artifact, ArtifactBridge};
use interfaces::{
    CommandFlags, CommandPriority, CommandSpec, ConnectionFeatures, ConversationId, Conversations,
    SmileyStore,
};
use std::path::Path;
use tracing::{debug, info};

pub const COMMAND_NAME: &str = "cs";
/// One word (the shortcut), then the rest of the line (the path).
pub const COMMAND_ARGS: &str = "ws";
pub const COMMAND_HELP: &str = "cs <shortcut> <path>: Create custom smiley from image at <path>";

/// Why a `/cs` invocation was refused. The display text goes straight to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("This conversation doesn't allow custom smileys")]
    CustomSmileysNotAllowed,

    #[error("Invalid arguments")]
    InvalidArguments,

    #[error("Error creating custom smiley from '{path}'")]
    Create { path: String },
}

pub fn command_spec(plugin_id: &str) -> CommandSpec {
    CommandSpec {
        name: COMMAND_NAME.to_string(),
        args: COMMAND_ARGS.to_string(),
        priority: CommandPriority::Default,
        flags: CommandFlags::IM,
        plugin_id: plugin_id.to_string(),
        help: COMMAND_HELP.to_string(),
    }
}

/// Handle `/cs <shortcut> <path>` typed into `conversation`.
pub fn create_custom_smiley<H: Conversations + SmileyStore + ?Sized>(
    host: &mut H,
    conversation: ConversationId,
    args: &[&str],
) -> Result<Artifact, CommandError> {
    debug!(
        "command_cb: arg[0] = '{}', arg[1] = '{}'",
        args.first().copied().unwrap_or("(not present)"),
        args.get(1).copied().unwrap_or("(not present)")
    );

    if !host
        .conversation_features(conversation)
        .contains(ConnectionFeatures::ALLOW_CUSTOM_SMILEY)
    {
        return Err(CommandError::CustomSmileysNotAllowed);
    }

    let (shortcut, path) = match args {
        [shortcut, path, ..] if !shortcut.is_empty() && !path.is_empty() => (*shortcut, *path),
        _ => return Err(CommandError::InvalidArguments),
    };

    let artifact = ArtifactBridge::register(host, shortcut, Path::new(path)).map_err(|e| {
        debug!("Registration of {} failed: {}", shortcut, e);
        CommandError::Create {
            path: path.to_string(),
        }
    })?;

    info!("Created custom smiley with shortcut = '{}' from {}", artifact.shortcut, path);
    Ok(artifact)
}
