use std::fmt;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account the local user is signed in with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub protocol_id: String,
}

impl Account {
    pub fn new(username: impl Into<String>, protocol_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            protocol_id: protocol_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Direction and kind of a message passing through the conversation layer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageFlags: u32 {
        const SEND = 1 << 0;
        const RECV = 1 << 1;
        const SYSTEM = 1 << 2;
        const AUTO_RESP = 1 << 3;
        const NO_LOG = 1 << 6;
        const ERROR = 1 << 9;
        const RAW = 1 << 13;
    }
}

bitflags! {
    /// Capabilities of the connection behind a conversation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConnectionFeatures: u32 {
        const HTML = 1 << 0;
        const NO_BGCOLOR = 1 << 1;
        const NO_NEWLINES = 1 << 3;
        const ALLOW_CUSTOM_SMILEY = 1 << 8;
    }
}

/// Outcome a hook hands back to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookResult {
    /// Let the host carry on with its default handling.
    #[default]
    Continue,
    /// The hook already rewrote the message; skip any further default transformation.
    Handled,
    /// Stop the message here: it is neither sent nor displayed.
    Cancel,
}

/// Conversation signals a plugin can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Fired with a mutable outgoing message right before it goes on the wire.
    SendingImMsg,
    /// Fired with a mutable message right before it is written to a conversation window.
    WritingImMsg,
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::SendingImMsg => "sending-im-msg",
            Signal::WritingImMsg => "writing-im-msg",
        }
    }
}

/// A custom smiley known to the host registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smiley {
    pub shortcut: String,
    pub path: PathBuf,
    pub size: u64,
}

/// One line written into a conversation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLine {
    pub who: Option<String>,
    pub text: String,
    pub system: bool,
    pub error: bool,
    pub written_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandPriority {
    Low,
    #[default]
    Default,
    PluginDefault,
    High,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u32 {
        const IM = 1 << 0;
        const CHAT = 1 << 1;
        const PRPL_ONLY = 1 << 2;
        const ALLOW_WRONG_ARGS = 1 << 3;
    }
}

/// Registration record for a slash command.
///
/// `args` follows the host's argument format: one character per argument,
/// `w` for a single word and `s` for the rest of the line.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: String,
    pub args: String,
    pub priority: CommandPriority,
    pub flags: CommandFlags,
    pub plugin_id: String,
    pub help: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(pub u32);

/// A row in a plugin preference frame. Rows without a key are headings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefEntry {
    pub key: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefFrame {
    pub entries: Vec<PrefEntry>,
}

impl PrefFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(mut self, label: impl Into<String>) -> Self {
        self.entries.push(PrefEntry { key: None, label: label.into() });
        self
    }

    pub fn field(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.entries.push(PrefEntry { key: Some(key.into()), label: label.into() });
        self
    }
}

// Host services. Every call happens on the host's dispatch thread, so none of
// these traits require Send or Sync.

pub trait Preferences {
    /// Register a grouping node with no value.
    fn add_none(&mut self, key: &str);

    /// Register a string preference; an existing value is left untouched.
    fn add_string(&mut self, key: &str, default: &str);

    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&mut self, key: &str, value: &str);
}

pub trait Conversations {
    fn find_conversation(&self, account: &Account, who: &str) -> Option<ConversationId>;

    fn conversation_features(&self, conversation: ConversationId) -> ConnectionFeatures;

    fn write_conversation(
        &mut self,
        conversation: ConversationId,
        who: Option<&str>,
        text: &str,
        flags: MessageFlags,
        time: DateTime<Utc>,
    );
}

pub trait SmileyStore {
    /// Build a persistent smiley from the image at `path`.
    /// Returns `None` when the file cannot be read or is not accepted.
    fn smiley_from_file(&mut self, shortcut: &str, path: &Path) -> Option<Smiley>;

    fn smileys(&self) -> Vec<Smiley>;

    fn delete_smiley(&mut self, shortcut: &str) -> bool;
}

pub trait Signals {
    fn connect(&mut self, signal: Signal, owner: &str) -> bool;

    fn disconnect(&mut self, signal: Signal, owner: &str) -> bool;
}

pub trait Commands {
    /// Returns `None` if the host refuses the registration.
    fn register_command(&mut self, spec: CommandSpec) -> Option<CommandId>;

    fn unregister_command(&mut self, id: CommandId);
}

/// Everything a plugin can reach on the host side.
pub trait Host: Preferences + Conversations + SmileyStore + Signals + Commands {}

impl<T> Host for T where T: Preferences + Conversations + SmileyStore + Signals + Commands {}
