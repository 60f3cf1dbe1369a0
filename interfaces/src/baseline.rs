use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::defs::{
    Account, CommandId, CommandSpec, Commands, ConnectionFeatures, ConversationId,
    ConversationLine, Conversations, MessageFlags, Preferences, Signal, Signals, Smiley,
    SmileyStore,
};

struct BaselineConversation {
    id: ConversationId,
    account: Account,
    who: String,
    features: ConnectionFeatures,
    lines: Vec<ConversationLine>,
}

/// In-memory host. Keeps every service in plain collections so a plugin can
/// be driven end to end without a running chat client.
#[derive(Default)]
pub struct BaselineHost {
    prefs: HashMap<String, Option<String>>,
    conversations: Vec<BaselineConversation>,
    smileys: BTreeMap<String, Smiley>,
    connected: HashSet<(Signal, String)>,
    commands: HashMap<CommandId, CommandSpec>,
    next_command_id: u32,
}

impl BaselineHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a conversation window with `who` on `account`.
    pub fn open_conversation(
        &mut self,
        account: &Account,
        who: &str,
        features: ConnectionFeatures,
    ) -> ConversationId {
        let id = ConversationId::new();
        self.conversations.push(BaselineConversation {
            id,
            account: account.clone(),
            who: who.to_string(),
            features,
            lines: Vec::new(),
        });
        debug!("Opened conversation {} with {}", id, who);
        id
    }

    pub fn close_conversation(&mut self, conversation: ConversationId) {
        self.conversations.retain(|c| c.id != conversation);
    }

    pub fn conversation_lines(&self, conversation: ConversationId) -> &[ConversationLine] {
        self.conversations
            .iter()
            .find(|c| c.id == conversation)
            .map(|c| c.lines.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_connected(&self, signal: Signal, owner: &str) -> bool {
        self.connected.contains(&(signal, owner.to_string()))
    }

    pub fn command(&self, name: &str) -> Option<(CommandId, &CommandSpec)> {
        self.commands
            .iter()
            .find(|(_, spec)| spec.name == name)
            .map(|(id, spec)| (*id, spec))
    }

    pub fn smiley(&self, shortcut: &str) -> Option<&Smiley> {
        self.smileys.get(shortcut)
    }
}

impl Preferences for BaselineHost {
    fn add_none(&mut self, key: &str) {
        self.prefs.entry(key.to_string()).or_insert(None);
    }

    fn add_string(&mut self, key: &str, default: &str) {
        self.prefs
            .entry(key.to_string())
            .or_insert_with(|| Some(default.to_string()));
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.prefs.get(key).cloned().flatten()
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.prefs.insert(key.to_string(), Some(value.to_string()));
    }
}

impl Conversations for BaselineHost {
    fn find_conversation(&self, account: &Account, who: &str) -> Option<ConversationId> {
        self.conversations
            .iter()
            .find(|c| &c.account == account && c.who == who)
            .map(|c| c.id)
    }

    fn conversation_features(&self, conversation: ConversationId) -> ConnectionFeatures {
        self.conversations
            .iter()
            .find(|c| c.id == conversation)
            .map(|c| c.features)
            .unwrap_or_default()
    }

    fn write_conversation(
        &mut self,
        conversation: ConversationId,
        who: Option<&str>,
        text: &str,
        flags: MessageFlags,
        time: DateTime<Utc>,
    ) {
        if let Some(c) = self.conversations.iter_mut().find(|c| c.id == conversation) {
            c.lines.push(ConversationLine {
                who: who.map(str::to_string),
                text: text.to_string(),
                system: flags.contains(MessageFlags::SYSTEM),
                error: flags.contains(MessageFlags::ERROR),
                written_at: time,
            });
        }
    }
}

impl SmileyStore for BaselineHost {
    fn smiley_from_file(&mut self, shortcut: &str, path: &Path) -> Option<Smiley> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                debug!("Cannot read smiley image {}: {}", path.display(), e);
                return None;
            }
        };
        if data.is_empty() {
            debug!("Refusing empty smiley image {}", path.display());
            return None;
        }

        let smiley = Smiley {
            shortcut: shortcut.to_string(),
            path: path.to_path_buf(),
            size: data.len() as u64,
        };
        self.smileys.insert(shortcut.to_string(), smiley.clone());
        Some(smiley)
    }

    fn smileys(&self) -> Vec<Smiley> {
        self.smileys.values().cloned().collect()
    }

    fn delete_smiley(&mut self, shortcut: &str) -> bool {
        self.smileys.remove(shortcut).is_some()
    }
}

impl Signals for BaselineHost {
    fn connect(&mut self, signal: Signal, owner: &str) -> bool {
        self.connected.insert((signal, owner.to_string()))
    }

    fn disconnect(&mut self, signal: Signal, owner: &str) -> bool {
        self.connected.remove(&(signal, owner.to_string()))
    }
}

impl Commands for BaselineHost {
    fn register_command(&mut self, spec: CommandSpec) -> Option<CommandId> {
        if self.command(&spec.name).is_some() {
            return None;
        }
        self.next_command_id += 1;
        let id = CommandId(self.next_command_id);
        self.commands.insert(id, spec);
        Some(id)
    }

    fn unregister_command(&mut self, id: CommandId) {
        self.commands.remove(&id);
    }
}
