//! TabTerm
//!
//! Interactive shell sessions from one process. Starts with one session
//! open against the configured host and bridges it to the local terminal.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console::config::Config;
use console::registry::SessionRegistry;
use console::ShellEvent;
use tokio::io::AsyncReadExt;
use transport::{LocalTransport, TermSize};

/// TabTerm - interactive shell sessions from one process.
#[derive(Parser, Debug)]
#[command(name = "tabterm")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Program to run instead of the login shell
    #[arg(short, long)]
    program: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Host to open the initial session against
    host: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    config.validate()?;

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log.level.clone()))
    };
    // Stdout belongs to the session; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // One current-thread runtime is the cooperative scheduler every
    // session and the registry run on.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;
    runtime.block_on(run(cli, config))
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let mut options = config.session_options(cli.host.as_deref());
    if let Some(program) = cli.program {
        options.program = Some(program);
    }
    if let Ok((cols, rows)) = crossterm::terminal::size() {
        options.size = TermSize::new(cols, rows);
    }

    let mut registry = SessionRegistry::new(LocalTransport);
    let id = registry.create(&options).await?;
    tracing::info!(session_id = %id, host = %options.host, "initial session open");

    crossterm::terminal::enable_raw_mode().context("failed to enter raw mode")?;
    let result = shell_loop(&mut registry).await;
    let _ = crossterm::terminal::disable_raw_mode();
    result
}

/// Dispatch loop of the bundled shell: stdin bytes go to the active
/// session, session output goes to stdout, and the process ends when the
/// last session is gone.
async fn shell_loop(registry: &mut SessionRegistry<LocalTransport>) -> anyhow::Result<()> {
    let mut stdin = tokio::io::stdin();
    let mut stdout = std::io::stdout();
    let mut input = [0u8; 1024];

    loop {
        tokio::select! {
            event = registry.next_event() => match event {
                Some(ShellEvent::Data { bytes, .. }) => {
                    stdout.write_all(&bytes)?;
                    stdout.flush()?;
                }
                Some(ShellEvent::Closed { id, reason, .. }) => {
                    if let Some(reason) = reason {
                        tracing::warn!(session_id = %id, reason = %reason, "session lost");
                    }
                    if registry.is_empty() {
                        break;
                    }
                }
                Some(ShellEvent::Selected { .. }) => {}
                None => break,
            },
            read = stdin.read(&mut input) => {
                let n = read.context("failed to read stdin")?;
                if n == 0 {
                    // Local input is gone; wind the sessions down and let
                    // their close events end the loop.
                    registry.close_all();
                    continue;
                }
                if let Some(session) = registry.active() {
                    session.send(&input[..n])?;
                }
            }
        }
    }
    Ok(())
}
