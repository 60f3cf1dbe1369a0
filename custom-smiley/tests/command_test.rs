mod common;

use common::{setup_host, write_image};
use custom_smiley::{create_custom_smiley, CommandError, CustomSmileyPlugin, COMMAND_ARGS, COMMAND_NAME, PLUGIN_ID};
use interfaces::{CommandFlags, ConnectionFeatures, SmileyStore};

#[test]
fn test_creates_smiley_with_given_shortcut() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let image = write_image(dir.path(), "wave.png")?;
    let (mut host, conversation) = setup_host(ConnectionFeatures::ALLOW_CUSTOM_SMILEY);

    let artifact = create_custom_smiley(&mut host, conversation, &[":wave:", image.to_str().unwrap()])?;

    assert_eq!(artifact.shortcut, ":wave:");
    assert_eq!(artifact.path, image);
    assert_eq!(host.smiley(":wave:").map(|s| s.size), Some(8));
    Ok(())
}

#[test]
fn test_refuses_conversations_without_custom_smileys() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let image = write_image(dir.path(), "wave.png")?;
    let (mut host, conversation) = setup_host(ConnectionFeatures::HTML);

    let err = create_custom_smiley(&mut host, conversation, &[":wave:", image.to_str().unwrap()]).unwrap_err();

    assert_eq!(err, CommandError::CustomSmileysNotAllowed);
    assert_eq!(err.to_string(), "This conversation doesn't allow custom smileys");
    assert!(host.smileys().is_empty());
    Ok(())
}

#[test]
fn test_requires_shortcut_and_path() {
    let (mut host, conversation) = setup_host(ConnectionFeatures::ALLOW_CUSTOM_SMILEY);

    for args in [&[][..], &[":wave:"][..], &[":wave:", ""][..]] {
        let err = create_custom_smiley(&mut host, conversation, args).unwrap_err();
        assert_eq!(err, CommandError::InvalidArguments);
        assert_eq!(err.to_string(), "Invalid arguments");
    }
}

#[test]
fn test_unreadable_image_is_reported_with_path() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("missing.png");
    let (mut host, conversation) = setup_host(ConnectionFeatures::ALLOW_CUSTOM_SMILEY);

    let err = create_custom_smiley(&mut host, conversation, &[":x:", missing.to_str().unwrap()]).unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("Error creating custom smiley from '{}'", missing.display())
    );
    Ok(())
}

#[test]
fn test_shortcut_in_filter_namespace_is_left_to_the_user() -> anyhow::Result<()> {
    // "ff-notes" is not shaped like a generated shortcut, so the filter's purge keeps it.
    let dir = tempfile::tempdir()?;
    let image = write_image(dir.path(), "notes.png")?;
    let (mut host, conversation) = setup_host(ConnectionFeatures::ALLOW_CUSTOM_SMILEY);

    create_custom_smiley(&mut host, conversation, &["ff-notes", image.to_str().unwrap()])?;
    let bridge = formula_filter::ArtifactBridge::new("ff");
    assert_eq!(bridge.purge(&mut host), 0);
    assert!(host.smiley("ff-notes").is_some());
    Ok(())
}

#[test]
fn test_load_registers_and_unload_removes_command() -> anyhow::Result<()> {
    let (mut host, _) = setup_host(ConnectionFeatures::ALLOW_CUSTOM_SMILEY);
    let mut plugin = CustomSmileyPlugin::new();

    plugin.load(&mut host)?;
    assert!(plugin.is_loaded());
    let (_, spec) = host.command(COMMAND_NAME).expect("command registered");
    assert_eq!(spec.args, COMMAND_ARGS);
    assert_eq!(spec.plugin_id, PLUGIN_ID);
    assert!(spec.flags.contains(CommandFlags::IM));

    // A second plugin instance cannot claim the same command
    let mut duplicate = CustomSmileyPlugin::new();
    assert!(duplicate.load(&mut host).is_err());

    plugin.unload(&mut host);
    assert!(!plugin.is_loaded());
    assert!(host.command(COMMAND_NAME).is_none());
    Ok(())
}
