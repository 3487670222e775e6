//! SpeechFlow - Voice commands for a mind-map canvas
//!
//! Runs the voice pipeline against the console: every stdin line is treated
//! as a final transcript and routed as a command or as dictation.

use anyhow::{Context, Result};
use clap::Parser;
use speechflow::commands::{command_reference, BubbleKind, VoiceCommand};
use speechflow::config::VoiceSettings;
use speechflow::console::ConsoleSessionFactory;
use speechflow::core::ParsedVoiceInput;
use speechflow::pipeline::VoicePipeline;
use speechflow::router::{VoiceHandlers, VoiceRouter};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Recognition language (BCP-47), overrides the settings file
    #[arg(short, long)]
    language: Option<String>,

    /// Do not restart recognition after it ends or fails
    #[arg(long)]
    no_auto_restart: bool,

    /// Print the voice command reference and exit
    #[arg(long)]
    commands: bool,

    /// Voice settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Confirm destructive commands such as "clear map"
    #[arg(long)]
    allow_destructive: bool,
}

/// Prints what the canvas would do
struct ConsoleHost {
    allow_destructive: bool,
}

impl VoiceHandlers for ConsoleHost {
    fn dictation(&mut self, transcript: &str, _parsed: &ParsedVoiceInput) {
        println!("💬 New bubble: {}", transcript);
    }

    fn typed_intent(&mut self, kind: BubbleKind, _remainder: &str, _parsed: &ParsedVoiceInput) {
        println!("🏷️ Next bubble is a {}", kind.keyword());
    }

    fn command(&mut self, command: &VoiceCommand, _parsed: &ParsedVoiceInput) {
        match command {
            VoiceCommand::VoiceHelp => print_reference(),
            VoiceCommand::SelectBubble { bubble_index } => {
                println!("👉 Select bubble #{}", bubble_index + 1)
            }
            VoiceCommand::AddBubble {
                transcript: Some(text),
            } => println!("➕ Add bubble: {}", text),
            other => println!("⚡ {}", other.intent()),
        }
    }

    fn confirm_destructive(&mut self, parsed: &ParsedVoiceInput) -> bool {
        if !self.allow_destructive {
            warn!(
                "🛡️ Refusing '{}' (run with --allow-destructive)",
                parsed.normalized.text
            );
        }
        self.allow_destructive
    }
}

fn print_reference() {
    println!("Voice commands:");
    for entry in command_reference() {
        println!("  {:<26} {}", entry.intent.as_str(), entry.phrases.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.commands {
        print_reference();
        return Ok(());
    }

    let mut settings = match &args.settings {
        Some(path) => VoiceSettings::load_from(path)
            .with_context(|| format!("Failed to load settings from {:?}", path))?,
        None => VoiceSettings::load().context("Failed to load voice settings")?,
    };
    if let Some(language) = args.language {
        settings.language = language;
    }
    if args.no_auto_restart {
        settings.auto_restart = false;
    }
    let settings = settings.sanitized();

    info!("🧠 SpeechFlow v{} starting...", env!("CARGO_PKG_VERSION"));

    let factory = ConsoleSessionFactory::new();
    let router = VoiceRouter::new(ConsoleHost {
        allow_destructive: args.allow_destructive,
    });
    let (pipeline, handle) =
        VoicePipeline::new(Some(Box::new(factory.clone())), &settings, router);

    if settings.push_to_talk_enabled {
        // No talk key on a terminal: the session is held open instead.
        info!("💡 Push-to-talk has no key binding on the console, listening anyway");
        handle.start();
    }

    let input = {
        let handle = handle.clone();
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            let delivered = factory.pump(stdin).await;
            handle.shutdown();
            delivered
        })
    };

    let interrupt = {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.shutdown();
            }
        })
    };

    info!("✅ SpeechFlow ready - type what you would say");
    info!("   Try: 'bubble 2', 'question what next', 'undo', 'help'");

    let controller = pipeline.run().await;
    interrupt.abort();

    if input.is_finished() {
        let delivered = input.await.context("Console reader panicked")??;
        info!("📝 {} transcripts delivered", delivered);
    }
    info!("👋 Final voice state: {}", controller.machine().state());

    Ok(())
}
