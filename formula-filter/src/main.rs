use anyhow::Context;
use clap::{Parser, Subcommand};
use formula_filter::{
    pref_frame, Artifact, CommandRenderer, FilterConfig, FormulaFilter, Renderer, ScriptedRenderer, INFO,
};
use interfaces::{Account, BaselineHost, ConnectionFeatures, HookResult, MessageFlags, SmileyStore};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "formula-filter", version, about = "Render $$formulas$$ in chat messages into smileys")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one message through the filter and show what the sender would see
    Render {
        message: String,

        /// Renderer executable, called as `<renderer> <formula> <output>`
        #[arg(long)]
        renderer: Option<String>,

        /// Where the renderer writes its image
        #[arg(long)]
        output: Option<PathBuf>,

        /// Seconds to wait for each render
        #[arg(long)]
        timeout: Option<u64>,

        /// Use a built-in fake renderer instead of spawning a process
        #[arg(long)]
        dry_run: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print plugin metadata and preferences
    Info,
}

#[derive(Serialize)]
struct RenderReport {
    input: String,
    sent: Option<String>,
    displayed: Option<String>,
    artifacts: Vec<Artifact>,
    errors: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Render {
            message,
            renderer,
            output,
            timeout,
            dry_run,
            json,
        } => {
            let mut config = FilterConfig::default();
            // Environment first, flags override
            if let Ok(path) = env::var("FORMULA_FILTER_PATH") {
                config.renderer_path = path;
            }
            if let Some(path) = renderer {
                config.renderer_path = path;
            }
            if let Some(path) = output {
                config.output_path = path;
            }
            if let Some(seconds) = timeout {
                config.timeout_seconds = seconds;
            }

            let report = render(config, message, dry_run).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report).context("serializing report")?);
            } else {
                print_report(&report);
            }
        }
        Command::Info => {
            println!("{} {} ({})", INFO.name, INFO.version, INFO.id);
            println!("{}", INFO.description);
            println!("{} <{}>", INFO.author, INFO.website);
            println!();
            for entry in pref_frame().entries {
                match entry.key {
                    Some(key) => println!("  {}: {}", entry.label, key),
                    None => println!("{}", entry.label),
                }
            }
        }
    }

    Ok(())
}

async fn render(config: FilterConfig, message: String, dry_run: bool) -> anyhow::Result<RenderReport> {
    let renderer: Box<dyn Renderer> = if dry_run {
        Box::new(ScriptedRenderer::new())
    } else {
        Box::new(CommandRenderer::new(Duration::from_secs(config.timeout_seconds)))
    };

    let mut host = BaselineHost::new();
    let mut filter = FormulaFilter::new(config, renderer);
    filter.init(&mut host);
    filter.load(&mut host);

    let account = Account::new("local", "prpl-demo");
    let peer = "peer";
    let conversation = host.open_conversation(&account, peer, ConnectionFeatures::ALLOW_CUSTOM_SMILEY);

    info!("Sending '{}' to {}", message, peer);
    let mut outgoing = message.clone();
    let sent = filter.on_sending_im_msg(&mut host, &account, peer, &mut outgoing).await;
    let sent = (sent != HookResult::Cancel).then_some(outgoing);

    // The host echoes whatever went out back into the sender's window.
    let mut displayed = sent.clone().unwrap_or_default();
    let shown = filter.on_writing_im_msg(&account, peer, &mut displayed, conversation, MessageFlags::SEND);
    let displayed = (shown != HookResult::Cancel).then_some(displayed);

    let report = RenderReport {
        input: message,
        sent,
        displayed,
        artifacts: host.smileys().into_iter().map(Artifact::from).collect(),
        errors: host
            .conversation_lines(conversation)
            .iter()
            .filter(|line| line.error)
            .map(|line| line.text.clone())
            .collect(),
    };

    filter.unload(&mut host);
    Ok(report)
}

fn print_report(report: &RenderReport) {
    println!("input:     {}", report.input);
    println!("sent:      {}", report.sent.as_deref().unwrap_or("(cancelled)"));
    println!("displayed: {}", report.displayed.as_deref().unwrap_or("(suppressed)"));
    for artifact in &report.artifacts {
        println!("smiley:    {} -> {} ({} bytes)", artifact.shortcut, artifact.path.display(), artifact.size);
    }
    for error in &report.errors {
        println!("error:     {}", error);
    }
}
