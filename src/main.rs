//! Console control surface for hotclick.
//!
//! `hotclick` with no subcommand starts the listener and runs until Ctrl+C
//! or the emergency-stop hotkey. The remaining subcommands edit and inspect
//! the configuration and manage profiles.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use hotclick::global_hotkey::{EMERGENCY_STOP_HOTKEY, PAUSE_HOTKEY};
use hotclick::{ClickAction, Config, HotkeyKey, HotkeyListener, MouseButton, ProfileManager};

const STATUS_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "hotclick", version, about = "Hotkey-driven mouse click sequencer")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Directory for configuration profiles
    #[arg(long, default_value = "profiles", global = true)]
    profiles_dir: PathBuf,

    /// Directory for log files
    #[arg(long, default_value = "logs", global = true)]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the hotkey listener (default)
    Run,
    /// Load and validate the configuration
    Check,
    /// Print the current bindings and char settings
    Show,
    /// Add a click action to a hotkey binding
    Bind {
        /// Hotkey to bind (f1-f8, 0-9, backtick)
        key: HotkeyKey,
        /// Absolute screen x coordinate
        #[arg(long)]
        x: i32,
        /// Absolute screen y coordinate
        #[arg(long)]
        y: i32,
        /// Mouse button: left or right
        #[arg(long, default_value = "left")]
        button: MouseButton,
        /// Number of clicks
        #[arg(long, default_value_t = 1)]
        repeat: u32,
        /// Char slot referenced by the action
        #[arg(long = "char")]
        char_slot: String,
        /// Replace the existing binding instead of appending
        #[arg(long)]
        replace: bool,
    },
    /// Remove a hotkey binding
    Unbind {
        /// Hotkey to clear (f1-f8, 0-9, backtick)
        key: HotkeyKey,
    },
    /// Set a char slot to a text payload
    SetChar { name: String, value: String },
    /// Manage configuration profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// List stored profiles
    List,
    /// Save the current configuration as a profile
    Save { name: String },
    /// Load a profile and make it the active configuration
    Load { name: String },
    /// Delete a profile
    Delete { name: String },
    /// Rename a profile
    Rename { from: String, to: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(&cli.log_dir) {
        eprintln!(
            "{} failed to initialize logging: {err:#}",
            "error:".red().bold()
        );
        process::exit(1);
    }

    if let Err(err) = dispatch(cli).await {
        error!("{err:#}");
        eprintln!("{} {err:#}", "error:".red().bold());
        process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config: config_path,
        profiles_dir,
        command,
        ..
    } = cli;

    match command.unwrap_or(Command::Run) {
        Command::Run => run(&config_path).await,
        Command::Check => check(&config_path),
        Command::Show => show(&config_path),
        Command::Bind {
            key,
            x,
            y,
            button,
            repeat,
            char_slot,
            replace,
        } => {
            let action = ClickAction {
                x,
                y,
                button,
                repeat,
                char: char_slot,
            };
            bind_action(&config_path, key, action, replace)
        }
        Command::Unbind { key } => unbind_action(&config_path, key),
        Command::SetChar { name, value } => set_char(&config_path, &name, &value),
        Command::Profile { action } => profile_command(&config_path, &profiles_dir, action),
    }
}

/// Initialize console + rotating file logging.
///
/// Daily rotation with a bounded file count stands in for the size-based
/// policy; tracing-appender does not rotate by size.
fn init_tracing(log_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("hotclick")
        .filename_suffix("log")
        .max_log_files(7)
        .build(log_dir)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the flush guard alive for the life of the process.
    static GUARD: OnceLock<WorkerGuard> = OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_ansi(true))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    Ok(())
}

/// Load the configuration, seeding the file with defaults when it does not
/// exist yet. A malformed file is an error, never silently replaced.
fn load_or_init(path: &Path) -> hotclick::Result<Config> {
    if !path.exists() {
        let config = Config::default();
        config.save_to_file(path)?;
        info!(path = %path.display(), "created default configuration");
        return Ok(config);
    }
    Config::from_file(path)
}

async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = load_or_init(config_path)?;
    let bindings = config.hotkeys.len();

    let mut listener = HotkeyListener::new(config);
    let mut stop_rx = listener.stop_receiver();
    listener.start()?;

    println!("{} v{}", "hotclick".bold(), env!("CARGO_PKG_VERSION"));
    println!("  config: {} ({bindings} bindings)", config_path.display());
    println!(
        "  pause/resume: {}    emergency stop: {}",
        PAUSE_HOTKEY.yellow(),
        EMERGENCY_STOP_HOTKEY.yellow()
    );
    println!("  press Ctrl+C to quit");

    // SIGHUP reloads the configuration in place; the listener picks the new
    // bindings up on the next key event.
    #[cfg(unix)]
    {
        let handle = listener.config_handle();
        let path = config_path.to_path_buf();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let Ok(mut hangup) = signal(SignalKind::hangup()) else {
                return;
            };
            while hangup.recv().await.is_some() {
                match Config::from_file(&path) {
                    Ok(new_config) => match handle.write() {
                        Ok(mut config) => {
                            *config = new_config;
                            info!("configuration reloaded");
                        }
                        Err(_) => error!("configuration lock poisoned, reload dropped"),
                    },
                    Err(err) => error!("configuration reload failed: {err}"),
                }
            }
        });
    }

    let started = Instant::now();
    let mut status = tokio::time::interval(STATUS_INTERVAL);
    status.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow_and_update() {
                    break;
                }
            }
            _ = status.tick() => {
                info!(
                    uptime = %format_uptime(started.elapsed()),
                    executions = listener.executions(),
                    "status"
                );
            }
        }
    }

    listener.stop();
    Ok(())
}

fn check(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::from_file(config_path)?;
    let actions: usize = config.hotkeys.values().map(Vec::len).sum();
    println!(
        "{} {} ({} bindings, {} actions, {} char slots)",
        "ok:".green().bold(),
        config_path.display(),
        config.hotkeys.len(),
        actions,
        config.char_settings.len()
    );
    Ok(())
}

fn show(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::from_file(config_path)?;

    println!("{}", "char settings".bold());
    for (name, value) in &config.char_settings {
        if value.is_empty() {
            println!("  {:<8} {}", name.cyan(), "(empty)".dimmed());
        } else {
            println!("  {:<8} {}", name.cyan(), value);
        }
    }

    println!();
    println!("{}", "hotkey bindings".bold());
    if config.hotkeys.is_empty() {
        println!("  (none)");
    }
    for (key, actions) in &config.hotkeys {
        println!("  {}", key.to_string().yellow().bold());
        for (index, action) in actions.iter().enumerate() {
            println!(
                "    {}. ({}, {}) {} x{} char={}",
                index + 1,
                action.x,
                action.y,
                action.button,
                action.repeat,
                action.char
            );
        }
    }
    Ok(())
}

fn bind_action(
    config_path: &Path,
    key: HotkeyKey,
    action: ClickAction,
    replace: bool,
) -> anyhow::Result<()> {
    let mut config = load_or_init(config_path)?;
    config.bind(key, action, replace);
    config.save_to_file(config_path)?;

    let count = config.hotkeys.get(&key).map_or(0, Vec::len);
    println!(
        "{} '{key}' now has {count} action(s)",
        "ok:".green().bold()
    );
    Ok(())
}

fn unbind_action(config_path: &Path, key: HotkeyKey) -> anyhow::Result<()> {
    let mut config = Config::from_file(config_path)?;
    if config.unbind(key) {
        config.save_to_file(config_path)?;
        println!("{} removed binding for '{key}'", "ok:".green().bold());
    } else {
        println!("no binding for '{key}'");
    }
    Ok(())
}

fn set_char(config_path: &Path, name: &str, value: &str) -> anyhow::Result<()> {
    let mut config = load_or_init(config_path)?;
    config.set_char(name, value);
    config.save_to_file(config_path)?;
    println!("{} {name} = '{value}'", "ok:".green().bold());
    Ok(())
}

fn profile_command(
    config_path: &Path,
    profiles_dir: &Path,
    action: ProfileCommand,
) -> anyhow::Result<()> {
    let manager = ProfileManager::new(profiles_dir, config_path)?;

    match action {
        ProfileCommand::List => {
            println!(
                "{} ({})",
                "profiles".bold(),
                manager.profiles_dir().display()
            );
            for name in manager.list()? {
                println!("  {name}");
            }
        }
        ProfileCommand::Save { name } => {
            let config = Config::from_file(config_path)?;
            manager.save(&name, &config)?;
            println!("{} saved profile '{name}'", "ok:".green().bold());
        }
        ProfileCommand::Load { name } => {
            let config = manager.load(&name)?;
            println!(
                "{} loaded profile '{name}' ({} bindings)",
                "ok:".green().bold(),
                config.hotkeys.len()
            );
        }
        ProfileCommand::Delete { name } => {
            manager.delete(&name)?;
            println!("{} deleted profile '{name}'", "ok:".green().bold());
        }
        ProfileCommand::Rename { from, to } => {
            manager.rename(&from, &to)?;
            println!(
                "{} renamed profile '{from}' to '{to}'",
                "ok:".green().bold()
            );
        }
    }
    Ok(())
}

fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
