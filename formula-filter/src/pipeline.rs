use crate::bridge::ArtifactBridge;
use crate::plugin::PREF_PATH;
use crate::renderer::CommandRenderer;
use crate::splitter::FormulaSplitter;
use crate::stage::PendingStage;
use crate::traits::Renderer;
use crate::types::{Artifact, FilterConfig, FilterError, FormulaFailure, PendingResult, Result, Segment};
use chrono::Utc;
use interfaces::{Account, ConversationId, Conversations, Host, HookResult, MessageFlags, SmileyStore};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The formula substitution pipeline.
///
/// `on_sending_im_msg` renders every formula of an outgoing message and stages
/// the rewritten text; `on_writing_im_msg` picks the staged result up when the
/// same message is about to be displayed.
pub struct FormulaFilter {
    config: FilterConfig,
    splitter: FormulaSplitter,
    renderer: Box<dyn Renderer>,
    pub(crate) bridge: ArtifactBridge,
    pub(crate) stage: PendingStage,
}

impl FormulaFilter {
    pub fn new(config: FilterConfig, renderer: Box<dyn Renderer>) -> Self {
        info!("Creating formula filter with {} renderer", renderer.renderer_name());
        Self {
            splitter: FormulaSplitter::new(config.delimiter.clone()),
            bridge: ArtifactBridge::new(config.shortcut_prefix.clone()),
            stage: PendingStage::new(),
            renderer,
            config,
        }
    }

    /// Pipeline that spawns the configured executable for every formula.
    pub fn with_command_renderer(config: FilterConfig) -> Self {
        let renderer = CommandRenderer::new(Duration::from_secs(config.timeout_seconds));
        Self::new(config, Box::new(renderer))
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn bridge(&self) -> &ArtifactBridge {
        &self.bridge
    }

    pub fn stage(&self) -> &PendingStage {
        &self.stage
    }

    /// `sending-im-msg` handler.
    ///
    /// A failure staged by an earlier, cancelled send is discarded first.
    /// Messages without a delimiter are left alone and nothing is staged. On
    /// success the outgoing text is rewritten and staged for display. On the
    /// first failing formula the message is cancelled, `Failure` is staged and
    /// an error line goes to the conversation with `receiver`.
    pub async fn on_sending_im_msg<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        account: &Account,
        receiver: &str,
        message: &mut String,
    ) -> HookResult {
        // A cancelled send is never displayed, so its Failure must not outlive it.
        if matches!(self.stage.peek(), PendingResult::Failure) {
            debug!("Dropping failure left by a cancelled send");
            self.stage.clear();
        }

        if !self.splitter.contains_formula(message) {
            return HookResult::Continue;
        }

        debug!("sending_im_msg: message = '{}'", message);

        let renderer_path = host
            .get_string(PREF_PATH)
            .unwrap_or_else(|| self.config.renderer_path.clone());

        match self.substitute(&mut *host, &renderer_path, message).await {
            Ok(rewritten) => {
                debug!("final message = '{}'", rewritten);
                *message = rewritten.clone();
                self.stage.set(PendingResult::Success(rewritten));
                HookResult::Continue
            }
            Err(failure) => {
                error!("Formula rendering failed: {} ({})", failure, failure.source);
                report_failure(&mut *host, account, receiver, &failure);
                message.clear();
                self.stage.set(PendingResult::Failure);
                HookResult::Cancel
            }
        }
    }

    /// `writing-im-msg` handler. Only messages flowing in the send direction
    /// consume the staged result.
    pub fn on_writing_im_msg(
        &mut self,
        account: &Account,
        who: &str,
        message: &mut String,
        conversation: ConversationId,
        flags: MessageFlags,
    ) -> HookResult {
        debug!(
            "writing_im_msg: account = {}, who = {}, conversation = {}, message = '{}'",
            account.username, who, conversation, message
        );

        if !flags.contains(MessageFlags::SEND) {
            return HookResult::Continue;
        }

        match self.stage.take() {
            PendingResult::Empty => HookResult::Continue,
            PendingResult::Failure => {
                debug!("Suppressing display of a message whose formulas failed");
                HookResult::Cancel
            }
            PendingResult::Success(text) => {
                debug!("new_message = '{}'", text);
                *message = text;
                HookResult::Handled
            }
        }
    }

    /// Render each formula of `text` in order and return the message with every
    /// formula replaced by its smiley shortcut. Stops at the first failure.
    async fn substitute<S: SmileyStore + ?Sized>(
        &mut self,
        store: &mut S,
        renderer_path: &str,
        text: &str,
    ) -> std::result::Result<String, FormulaFailure> {
        let segments = self.splitter.split(text);
        debug!(
            "Split message into {} segments, {} formulas",
            segments.len(),
            FormulaSplitter::formula_count(&segments)
        );

        let mut rewritten = String::with_capacity(text.len());
        let mut created: Vec<String> = Vec::new();
        for segment in &segments {
            match segment {
                Segment::Literal(literal) => rewritten.push_str(literal),
                Segment::Formula(formula) => {
                    match self.render_formula(&mut *store, renderer_path, formula).await {
                        Ok(artifact) => {
                            rewritten.push_str(&artifact.shortcut);
                            created.push(artifact.shortcut);
                        }
                        Err(source) => {
                            // The message is dropped, so are the smileys made for it.
                            for shortcut in &created {
                                store.delete_smiley(shortcut);
                            }
                            return Err(FormulaFailure {
                                formula: formula.clone(),
                                source,
                            });
                        }
                    }
                }
            }
        }

        Ok(rewritten)
    }

    async fn render_formula<S: SmileyStore + ?Sized>(
        &mut self,
        store: &mut S,
        renderer_path: &str,
        formula: &str,
    ) -> Result<Artifact> {
        let output = self.config.output_path.as_path();

        clear_stale_output(output).await?;
        self.renderer.render(renderer_path, formula, output).await?;

        let artifact = self.bridge.register_next(store, output)?;
        info!("Created new smiley {} for '{}'", artifact.shortcut, formula);
        Ok(artifact)
    }
}

/// Remove a previous render's image so a renderer that exits cleanly without
/// writing cannot get the old picture registered.
async fn clear_stale_output(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FilterError::Io(e)),
    }
}

fn report_failure<C: Conversations + ?Sized>(
    host: &mut C,
    account: &Account,
    receiver: &str,
    failure: &FormulaFailure,
) {
    let Some(conversation) = host.find_conversation(account, receiver) else {
        warn!("No conversation with {} to report: {}", receiver, failure);
        return;
    };

    host.write_conversation(
        conversation,
        None,
        &failure.to_string(),
        MessageFlags::SYSTEM | MessageFlags::ERROR,
        Utc::now(),
    );
}
