#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]

use anyhow::Result;
use focus_veil::config::{Config, CONFIG_FILE};
use focus_veil::dialogs::{Dialogs, NativeDialogs};
use focus_veil::editor::Editor;
use focus_veil::elevation::{self, Elevation};
use focus_veil::{logging, overlay, tray};
use std::path::PathBuf;

fn main() -> Result<()> {
    logging::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "focus veil starting");

    let dialogs = NativeDialogs;
    if elevation::ensure_elevated(&dialogs) == Elevation::Relaunched {
        return Ok(());
    }

    let config_path = PathBuf::from(CONFIG_FILE);
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "could not load saved configuration, starting fresh");
            dialogs.warn(
                "Configuration",
                &format!("Could not load the saved configuration:\n{err}\n\nStarting with defaults."),
            );
            Config::default()
        }
    };

    let mut editor = Editor::new();
    editor.apply(&config);

    let tray = tray::spawn()?;
    overlay::run(overlay::Shell {
        editor,
        tray,
        dialogs,
        config_path,
    })
}
