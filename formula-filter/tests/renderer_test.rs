#![cfg(unix)]

use formula_filter::{CommandRenderer, FilterConfig, FilterError, FormulaFilter, Renderer, Result, PREF_PATH};
use interfaces::{Account, BaselineHost, ConnectionFeatures, HookResult, MessageFlags, Preferences, SmileyStore};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

#[tokio::test]
async fn test_renderer_writes_image() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = script(dir.path(), "ok.sh", r#"printf '%s' "$1" > "$2""#)?;
    let output = dir.path().join("out.png");

    let renderer = CommandRenderer::new(Duration::from_secs(10));
    renderer.render(program.to_str().unwrap(), "x^2", &output).await?;

    assert_eq!(fs::read_to_string(&output)?, "x^2");
    Ok(())
}

#[tokio::test]
async fn test_nonzero_exit_carries_status() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = script(dir.path(), "fail.sh", "echo 'undefined control sequence' >&2\nexit 2")?;
    let output = dir.path().join("out.png");

    let renderer = CommandRenderer::new(Duration::from_secs(10));
    let err = renderer
        .render(program.to_str().unwrap(), "\\oops", &output)
        .await
        .unwrap_err();

    assert!(matches!(err, FilterError::Render { code: 2 }), "unexpected error: {:?}", err);
    assert_eq!(err.exit_code(), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_clean_exit_without_image_is_missing_output() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = script(dir.path(), "lazy.sh", "exit 0")?;
    let output = dir.path().join("out.png");

    let renderer = CommandRenderer::new(Duration::from_secs(10));
    let err = renderer
        .render(program.to_str().unwrap(), "x", &output)
        .await
        .unwrap_err();

    assert!(matches!(err, FilterError::MissingOutput { .. }), "unexpected error: {:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_missing_program_fails_to_spawn() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = dir.path().join("does-not-exist");

    let renderer = CommandRenderer::new(Duration::from_secs(10));
    let err = renderer
        .render(program.to_str().unwrap(), "x", &dir.path().join("out.png"))
        .await
        .unwrap_err();

    assert!(matches!(err, FilterError::Spawn { .. }), "unexpected error: {:?}", err);
    assert_eq!(err.exit_code(), None);
    Ok(())
}

#[tokio::test]
async fn test_hung_renderer_times_out() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = script(dir.path(), "hang.sh", "exec sleep 30")?;

    let renderer = CommandRenderer::new(Duration::from_millis(200));
    let started = Instant::now();
    let err = renderer
        .render(program.to_str().unwrap(), "x", &dir.path().join("out.png"))
        .await
        .unwrap_err();

    assert!(matches!(err, FilterError::Timeout { .. }), "unexpected error: {:?}", err);
    assert!(started.elapsed() < Duration::from_secs(10));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_with_real_renderer() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = script(
        dir.path(),
        "render.sh",
        "case \"$1\" in\n  bad*) exit 4 ;;\nesac\nprintf 'img:%s' \"$1\" > \"$2\"",
    )?;

    let config = FilterConfig {
        renderer_path: program.to_string_lossy().into_owned(),
        output_path: dir.path().join("formula-filter.png"),
        timeout_seconds: 10,
        ..FilterConfig::default()
    };
    let mut host = BaselineHost::new();
    let mut filter = FormulaFilter::with_command_renderer(config);
    filter.init(&mut host);
    filter.load(&mut host);
    assert_eq!(host.get_string(PREF_PATH), Some(program.to_string_lossy().into_owned()));

    let account = Account::new("alice", "prpl-test");
    let conversation = host.open_conversation(&account, "bob", ConnectionFeatures::ALLOW_CUSTOM_SMILEY);

    let mut message = "area is $$\\pi r^2$$ exactly".to_string();
    let sent = filter.on_sending_im_msg(&mut host, &account, "bob", &mut message).await;
    assert_eq!(sent, HookResult::Continue);
    assert_eq!(message, "area is ff-0 exactly");

    let smiley = host.smiley("ff-0").cloned().unwrap();
    assert_eq!(smiley.size, "img:\\pi r^2".len() as u64);

    let shown = filter.on_writing_im_msg(&account, "bob", &mut message, conversation, MessageFlags::SEND);
    assert_eq!(shown, HookResult::Handled);

    let mut bad = "$$bad$$".to_string();
    let sent = filter.on_sending_im_msg(&mut host, &account, "bob", &mut bad).await;
    assert_eq!(sent, HookResult::Cancel);
    let lines = host.conversation_lines(conversation);
    assert_eq!(lines.last().map(|l| l.text.as_str()), Some("Error creating smiley from 'bad', return code = 4"));

    filter.unload(&mut host);
    assert!(host.smileys().is_empty());
    Ok(())
}
