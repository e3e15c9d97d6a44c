//! Vastra CLI — fashion & beauty answers from the terminal.
//!
//! Serve the chat API, ask a single question, or keep a conversation
//! going in an interactive loop.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use vastra_core::engine::{Reply, ReplyCategory};
use vastra_core::{Engine, VastraConfig};

// ─── CLI Definition ────────────────────────────────────────

/// Vastra — bilingual fashion & beauty responder 👗
#[derive(Parser)]
#[command(name = "vastra", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(short, long, global = true, env = "VASTRA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 🌐 Start the chat API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// ❓ Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,

        /// Session key
        #[arg(short, long)]
        session: Option<String>,

        /// Show how the reply was chosen
        #[arg(short, long)]
        explain: bool,

        /// Print the full reply as JSON
        #[arg(long, conflicts_with = "explain")]
        json: bool,
    },

    /// 💬 Interactive chat that keeps session context
    Chat {
        /// Session key
        #[arg(short, long, default_value = "cli")]
        session: String,
    },

    /// ⚙️  Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ─── Helpers ───────────────────────────────────────────────

fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    let title = format!("    ║        👗 Vastra v{} 👗           ║", version);
    println!();
    println!("{}", "    ╔══════════════════════════════════════╗".magenta());
    println!("{}", title.magenta());
    println!("{}", "    ║   Fashion & beauty, EN / ಕನ್ನಡ        ║".magenta());
    println!("{}", "    ╚══════════════════════════════════════╝\n".magenta());
}

fn config_path(provided: Option<&Path>) -> PathBuf {
    provided
        .map(Path::to_path_buf)
        .unwrap_or_else(VastraConfig::default_path)
}

fn load_engine(path: &Path) -> anyhow::Result<Engine> {
    if path.exists() {
        tracing::debug!("Loading config from {}", path.display());
    } else {
        tracing::info!("No config at {}, using defaults", path.display());
    }
    let config = VastraConfig::load(path)?;
    Ok(Engine::from_config(config)?)
}

fn print_reply(reply: &Reply) {
    let label = match reply.category {
        ReplyCategory::Classified => "Vastra ›".magenta().bold(),
        ReplyCategory::OutOfScope => "Vastra ›".yellow().bold(),
        _ => "Vastra ›".cyan().bold(),
    };
    println!("{} {}\n", label, reply.response);
}

fn print_explain(reply: &Reply) {
    println!("  {}", "Explain:".bold());
    println!("    {} {}", "Language:".dimmed(), reply.language.cyan());
    println!("    {} {}", "Category:".dimmed(), reply.category.label().cyan());

    let Some(trace) = &reply.trace else {
        println!("    {} {}", "Classifier:".dimmed(), "skipped".yellow());
        return;
    };

    println!("    {} {}", "Intent:".dimmed(), trace.intent.label().green());
    println!(
        "    {} {} {}",
        "Rule:".dimmed(),
        trace.rule.green(),
        format!("(tier {})", trace.tier).dimmed()
    );
    let keywords = if trace.keywords.is_empty() {
        "—".to_string()
    } else {
        trace.keywords.join(", ")
    };
    println!("    {} {}", "Keywords:".dimmed(), keywords);
    let links: Vec<String> = trace.links.iter().map(|g| g.to_string()).collect();
    let links = if links.is_empty() {
        "—".to_string()
    } else {
        links.join(", ")
    };
    println!("    {} {}", "Links:".dimmed(), links);
}

// ─── Main ──────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,vastra_core=debug,vastra_hub=debug")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let path = config_path(cli.config.as_deref());

    match cli.command {
        // ─── API Server ────────────────────────────────
        Some(Commands::Serve { host, port }) => {
            run_serve(&path, host, port).await?;
        }

        // ─── One-shot Ask ──────────────────────────────
        Some(Commands::Ask {
            message,
            session,
            explain,
            json,
        }) => {
            run_ask(&path, &message, session.as_deref(), explain, json).await?;
        }

        // ─── Interactive Chat ──────────────────────────
        Some(Commands::Chat { session }) => {
            run_chat(&path, &session).await?;
        }

        // ─── Config Management ─────────────────────────
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => run_config_show(&path)?,
            ConfigAction::Path => println!("{}", path.display()),
            ConfigAction::Init { force } => run_config_init(&path, force)?,
        },

        None => {
            print_banner();
            println!(
                "  {} {}",
                "Try:".dimmed(),
                "vastra chat  |  vastra ask \"wedding outfit\"  |  vastra serve".green()
            );
            println!();
        }
    }

    Ok(())
}

// ─── Commands ──────────────────────────────────────────────

async fn run_serve(path: &Path, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let engine = Arc::new(load_engine(path)?);
    let host = host.unwrap_or_else(|| engine.config().server.host.clone());
    let port = port.unwrap_or(engine.config().server.port);

    print_banner();
    println!("  {} {}", "Mode:".dimmed(), "🌐 Chat API Server".green().bold());
    println!(
        "  {} {}",
        "Endpoint:".dimmed(),
        format!("http://{}:{}", host, port).green().bold()
    );
    println!(
        "  {} {}",
        "Sessions:".dimmed(),
        format!(
            "max {} (idle timeout {}s)",
            engine.config().memory.max_sessions,
            engine.config().memory.inactive_timeout_secs
        )
        .cyan()
    );
    println!("  {} {}", "Stop:".dimmed(), "Ctrl-C".yellow());
    println!();

    vastra_hub::start_server(engine, &host, port).await
}

async fn run_ask(
    path: &Path,
    message: &str,
    session: Option<&str>,
    explain: bool,
    json: bool,
) -> anyhow::Result<()> {
    let engine = load_engine(path)?;
    let reply = engine.respond(session, message).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!("{}", reply.response);
    if explain {
        println!();
        print_explain(&reply);
    }
    Ok(())
}

async fn run_chat(path: &Path, session: &str) -> anyhow::Result<()> {
    let engine = load_engine(path)?;

    print_banner();
    println!("  {} {}", "Session:".dimmed(), session.green());
    println!("  {} {}", "Commands:".dimmed(), "/explain /quit".dimmed());
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut explain = false;

    loop {
        print!("{} ", "You ›".green().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match line.trim() {
            "/quit" | "/exit" => break,
            "/explain" => {
                explain = !explain;
                let state = if explain { "on" } else { "off" };
                println!("  {} {}\n", "Explain:".dimmed(), state.cyan());
                continue;
            }
            _ => {}
        }

        let reply = engine.respond(Some(session), &line).await;
        print_reply(&reply);
        if explain {
            print_explain(&reply);
            println!();
        }
    }

    println!("{}", "Goodbye! 👋".dimmed());
    Ok(())
}

fn run_config_show(path: &Path) -> anyhow::Result<()> {
    let config = VastraConfig::load(path)?;
    let source = if path.exists() {
        path.display().to_string().green()
    } else {
        "built-in defaults".yellow()
    };
    println!("{} {}", "# Source:".dimmed(), source);
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    VastraConfig::default().save(path)?;
    println!("{} {}", "✅ Wrote".green(), path.display());
    Ok(())
}
