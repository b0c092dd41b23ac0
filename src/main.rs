use anyhow::{Context, Result, bail};
use clap::Parser;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use typecast::clock::FRAME_INTERVAL;
use typecast::config::{DEFAULT_COMMAND, parse_duration};
use typecast::terminal::TerminalHost;
use typecast::{
    ClipboardSink, CopyOutcome, EventLoop, Phase, ScratchCopy, Services, SnippetConfig,
    SystemClipboard, init,
};

#[derive(Parser, Debug)]
#[command(
    name = "typecast",
    about = "Play a typing animation of shell commands in the terminal",
    version
)]
struct Args {
    /// Command to type (repeat for several)
    #[arg(short, long = "command", default_value = DEFAULT_COMMAND)]
    commands: Vec<String>,

    /// Delay between typed characters
    #[arg(long, default_value = "50ms", value_parser = parse_duration)]
    typing_speed: Duration,

    /// Delay between deleted characters
    #[arg(long, default_value = "30ms", value_parser = parse_duration)]
    delete_speed: Duration,

    /// Pause on a fully typed command
    #[arg(long, default_value = "2s", value_parser = parse_duration)]
    pause_between: Duration,

    /// Type each command once instead of cycling
    #[arg(long)]
    no_loop: bool,

    /// Stop after this long
    #[arg(short, long, default_value = "15s", value_parser = parse_duration)]
    duration: Duration,

    /// Copy the first fully typed command to the clipboard
    #[arg(long)]
    copy: bool,

    /// Log state transitions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = SnippetConfig::with_commands(args.commands)
        .typing_speed(args.typing_speed)
        .delete_speed(args.delete_speed)
        .pause_between(args.pause_between)
        .looping(!args.no_loop);

    let host = TerminalHost::stdout();
    let event_loop = Rc::new(EventLoop::new());
    let clipboard = ClipboardSink::new()
        .with_strategy(SystemClipboard)
        .with_strategy(ScratchCopy::new(host.osc52_surface()));

    let Some(widget) = init(&host, event_loop.clone(), &config, Services::new(clipboard))
        .context("Failed to initialize widget")?
    else {
        bail!("Terminal host has no widget root");
    };
    widget.on_visibility(1.0);

    let started = tokio::time::Instant::now();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let mut pending_copy = args.copy;

    loop {
        frames.tick().await;
        let elapsed = started.elapsed();
        event_loop.pump(elapsed);

        let phase = widget.snapshot().phase;
        if pending_copy && matches!(phase, Phase::Paused | Phase::Finished) {
            pending_copy = false;
            if let Some(CopyOutcome::Failed) = widget.on_copy_click().await {
                tracing::error!("could not copy the command to the clipboard");
            }
        }

        let settled = phase == Phase::Finished && !widget.feedback_active() && !pending_copy;
        if settled || elapsed >= args.duration {
            break;
        }
    }

    widget.dispose();
    host.finish();
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "typecast=debug" } else { "typecast=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
