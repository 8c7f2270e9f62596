#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

mod app;
mod core;
mod error;
mod event;
#[cfg(target_os = "macos")]
mod macos;
mod monitor;
mod platform;
mod settings_store;
mod settings_watcher;

use anyhow::{bail, Result};
use appresize_config::{Modifier, SettingKey, Settings};
use argh::FromArgs;
use settings_store::SettingsStore;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Appresize - move and resize macOS windows with modifier keys
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    Start(StartCmd),
    Version(VersionCmd),
    ShowConfig(ShowConfigCmd),
    ToggleModifier(ToggleModifierCmd),
    Set(SetCmd),
    ResetConfig(ResetConfigCmd),
}

/// Start the appresize daemon
#[derive(FromArgs)]
#[argh(subcommand, name = "start")]
struct StartCmd {}

/// Show version information
#[derive(FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCmd {}

/// Print the current settings
#[derive(FromArgs)]
#[argh(subcommand, name = "show-config")]
struct ShowConfigCmd {}

/// Add or remove a modifier key from the move or resize set
#[derive(FromArgs)]
#[argh(subcommand, name = "toggle-modifier")]
struct ToggleModifierCmd {
    /// gesture: move, resize
    #[argh(positional)]
    role: String,
    /// modifier: alt, cmd, ctrl, fn, shift
    #[argh(positional)]
    modifier: String,
}

/// Change a boolean setting
#[derive(FromArgs)]
#[argh(subcommand, name = "set")]
struct SetCmd {
    /// setting: resize-from-nearest-corner, require-drag-to-activate,
    /// enable-window-tiling, show-menu-icon, launch-at-login
    #[argh(positional)]
    key: String,
    /// true or false
    #[argh(positional)]
    value: bool,
}

/// Restore the default settings
#[derive(FromArgs)]
#[argh(subcommand, name = "reset-config")]
struct ResetConfigCmd {}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();
    match cli.command {
        None => {
            // No subcommand - show help (simulate --help)
            let args: Vec<&str> = vec!["appresize", "--help"];
            match Cli::from_args(&args[..1], &args[1..]) {
                Ok(_) => {}
                Err(e) => {
                    println!("{}", e.output);
                }
            }
            Ok(())
        }
        Some(SubCommand::Start(_)) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
            tracing::info!("appresize {} starting", VERSION);
            run_daemon()
        }
        Some(SubCommand::Version(_)) => {
            println!("appresize {}", VERSION);
            Ok(())
        }
        Some(SubCommand::ShowConfig(_)) => run_cli(ConfigCommand::Show),
        Some(SubCommand::ToggleModifier(cmd)) => run_cli(ConfigCommand::ToggleModifier(cmd)),
        Some(SubCommand::Set(cmd)) => run_cli(ConfigCommand::Set(cmd)),
        Some(SubCommand::ResetConfig(_)) => run_cli(ConfigCommand::Reset),
    }
}

/// Subcommands that read or edit the settings file.
enum ConfigCommand {
    Show,
    ToggleModifier(ToggleModifierCmd),
    Set(SetCmd),
    Reset,
}

#[cfg(target_os = "macos")]
fn run_daemon() -> Result<()> {
    app::App::run(SettingsStore::open_default()?)
}

#[cfg(not(target_os = "macos"))]
fn run_daemon() -> Result<()> {
    bail!("appresize only runs on macOS")
}

fn run_cli(command: ConfigCommand) -> Result<()> {
    let store = SettingsStore::open_default()?;
    let settings = apply_config_command(&store, command)?;

    println!("# {}", store.path().display());
    print!("{}", describe(&settings));
    for warning in settings.validate() {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

/// Runs one settings command against `store` and returns the resulting settings.
fn apply_config_command(store: &SettingsStore, command: ConfigCommand) -> Result<Settings> {
    let settings = match command {
        ConfigCommand::Show => store.load()?,
        ConfigCommand::ToggleModifier(cmd) => {
            let modifier: Modifier = cmd.modifier.parse().map_err(anyhow::Error::msg)?;
            let mut settings = store.load()?;
            toggle_modifier(&mut settings, &cmd.role, modifier)?;
            store.save(&settings)?;
            settings
        }
        ConfigCommand::Set(cmd) => {
            let key: SettingKey = cmd.key.parse().map_err(anyhow::Error::msg)?;
            store.update(|s| s.set_flag(key, cmd.value))?
        }
        ConfigCommand::Reset => {
            let first_launched = store.load().ok().and_then(|s| s.first_launched);
            let settings = Settings {
                first_launched,
                ..Settings::default()
            };
            store.save(&settings)?;
            settings
        }
    };
    Ok(settings)
}

fn toggle_modifier(settings: &mut Settings, role: &str, modifier: Modifier) -> Result<()> {
    match role.to_lowercase().as_str() {
        "move" => settings.move_modifiers = settings.move_modifiers.toggle(modifier),
        "resize" => settings.resize_modifiers = settings.resize_modifiers.toggle(modifier),
        _ => bail!("Unknown gesture: {} (expected move or resize)", role),
    }
    Ok(())
}

fn describe(settings: &Settings) -> String {
    let mut out = format!(
        "move-modifiers: {}\nresize-modifiers: {}\n",
        settings.move_modifiers, settings.resize_modifiers
    );
    for key in SettingKey::ALL {
        out.push_str(&format!("{}: {}\n", key, settings.flag(key)));
    }
    if let Some(ts) = settings.first_launched {
        out.push_str(&format!("first-launched: {}\n", ts));
    }
    out
}
