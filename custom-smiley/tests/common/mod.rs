use interfaces::{Account, BaselineHost, ConnectionFeatures, ConversationId};
use std::path::{Path, PathBuf};

pub const TEST_ACCOUNT: &str = "alice@example.org";
pub const TEST_PEER: &str = "bob@example.org";

/// Host with one open conversation using the given connection features
pub fn setup_host(features: ConnectionFeatures) -> (BaselineHost, ConversationId) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let mut host = BaselineHost::new();
    let account = Account::new(TEST_ACCOUNT, "prpl-jabber");
    let conversation = host.open_conversation(&account, TEST_PEER, features);
    (host, conversation)
}

/// Write a small image under `dir` and return its path
pub fn write_image(dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, b"\x89PNG\r\n\x1a\n")?;
    Ok(path)
}
