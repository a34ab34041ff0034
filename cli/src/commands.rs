use std::io::Write;

use clap::{ArgGroup, Parser, Subcommand};

use hourglass_core::HourglassConfigExt;

use crate::CliContext;

#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start (or restart) the timer
    Start {
        /// Target seconds; falls back to the configured default
        #[arg(short, long, allow_negative_numbers = true)]
        seconds: Option<i64>,
    },
    Pause,
    Resume,
    /// Change the target, or clear it with --never
    #[command(group(ArgGroup::new("deadline").required(true).args(["seconds", "never"])))]
    Update {
        #[arg(short, long, allow_negative_numbers = true)]
        seconds: Option<i64>,
        #[arg(long)]
        never: bool,
    },
    Status,
    Reset,
    Config,
    /// Change the default target used by `start`
    #[command(group(ArgGroup::new("deadline").required(true).args(["seconds", "never"])))]
    SetDefault {
        #[arg(short, long, allow_negative_numbers = true)]
        seconds: Option<i64>,
        #[arg(long)]
        never: bool,
    },
    /// Persist the current configuration
    Save,
    Exit,
}

/// Parse and run one REPL line. Returns `Ok(true)` when the user asked to quit.
pub async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "hourglass".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Start { seconds }) => start(ctx, seconds).await,
        Some(Commands::Pause) => pause(ctx).await,
        Some(Commands::Resume) => resume(ctx).await,
        Some(Commands::Update { seconds, never }) => {
            update(ctx, if never { None } else { seconds }).await
        }
        Some(Commands::Status) => status(ctx).await,
        Some(Commands::Reset) => reset(ctx).await,
        Some(Commands::Config) => show_config(ctx).await,
        Some(Commands::SetDefault { seconds, never }) => {
            set_default_target(ctx, if never { None } else { seconds }).await?
        }
        Some(Commands::Save) => save_config(ctx).await?,
        Some(Commands::Exit) => {
            exit()?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}

pub async fn start(ctx: &CliContext, seconds: Option<i64>) {
    let target = match seconds {
        Some(secs) => Some(secs),
        None => ctx.config.read().await.default_target_secs,
    };

    let mut timer = ctx.timer.lock().await;
    timer.start(|| {
        tracing::info!("Timer fired");
        println!("\ntimer fired");
    });
    timer.update(target);

    match target {
        Some(secs) => println!("started, firing after {}s", secs),
        None => println!("started with no deadline"),
    }
}

pub async fn pause(ctx: &CliContext) {
    let mut timer = ctx.timer.lock().await;
    timer.pause();
    println!("{}", timer.snapshot());
}

pub async fn resume(ctx: &CliContext) {
    let mut timer = ctx.timer.lock().await;
    timer.resume();
    println!("{}", timer.snapshot());
}

pub async fn update(ctx: &CliContext, seconds: Option<i64>) {
    let mut timer = ctx.timer.lock().await;
    if !timer.is_started() {
        println!("timer is not started");
        return;
    }
    timer.update(seconds);
    println!("{}", timer.snapshot());
}

pub async fn status(ctx: &CliContext) {
    let timer = ctx.timer.lock().await;
    println!("{}", timer.snapshot());
}

pub async fn reset(ctx: &CliContext) {
    ctx.timer.lock().await.reset();
    println!("timer reset");
}

pub async fn show_config(ctx: &CliContext) {
    let config = ctx.config.read().await;
    println!("clock:          {}", config.clock.label());
    match config.default_target_secs {
        Some(secs) => println!("default target: {}s", secs),
        None => println!("default target: none"),
    }
    println!("debug logging:  {}", config.debug_logging);
}

pub async fn set_default_target(ctx: &CliContext, seconds: Option<i64>) -> Result<(), String> {
    let mut config = ctx.config.write().await;
    let previous = config.default_target_secs;
    config.default_target_secs = seconds;

    if let Err(reason) = config.validate() {
        config.default_target_secs = previous;
        return Err(reason.to_string());
    }
    println!("default target updated (use `save` to persist)");
    Ok(())
}

pub async fn save_config(ctx: &CliContext) -> Result<(), String> {
    ctx.config.read().await.save().map_err(|e| e.to_string())?;
    println!("configuration saved");
    Ok(())
}

pub fn exit() -> Result<(), String> {
    writeln!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}
