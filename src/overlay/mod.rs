//! The veil window: a borderless, always-on-top, full-screen layered window
//! whose focus areas are filled with the transparency key color.
//!
//! The platform window lives in [`window`]; this module holds the pieces the
//! window shares with tests, chiefly the context menu command table.

#[cfg(target_os = "windows")]
mod window;

use crate::config::Config;
use crate::dialogs::NativeDialogs;
use crate::editor::Editor;
use crate::tray::Tray;
use std::path::PathBuf;

/// One entry of the right-click context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    TogglePause,
    ChooseColor,
    ResetToBlack,
    SetOpacity,
    SetPeekOpacity,
    DeleteAll,
    SaveConfig,
    LoadConfig,
    ShowGuide,
    About,
    ToggleConsole,
    Exit,
}

pub(crate) const MENU_ACTIONS: &[(u32, MenuAction)] = &[
    (1, MenuAction::TogglePause),
    (2, MenuAction::ChooseColor),
    (3, MenuAction::ResetToBlack),
    (4, MenuAction::SetOpacity),
    (5, MenuAction::SetPeekOpacity),
    (6, MenuAction::DeleteAll),
    (7, MenuAction::SaveConfig),
    (8, MenuAction::LoadConfig),
    (9, MenuAction::ShowGuide),
    (10, MenuAction::About),
    (11, MenuAction::ToggleConsole),
    (12, MenuAction::Exit),
];

/// Map a `TrackPopupMenu` command id back to its action.
pub fn menu_action(command: u32) -> Option<MenuAction> {
    MENU_ACTIONS
        .iter()
        .find(|(id, _)| *id == command)
        .map(|(_, action)| *action)
}

/// Everything the veil window owns on the UI thread.
pub struct Shell {
    pub editor: Editor,
    pub tray: Tray,
    pub dialogs: NativeDialogs,
    pub config_path: PathBuf,
}

impl Shell {
    /// Save the current editor state, reporting the outcome through the
    /// dialogs seam; in-memory state is never touched on failure.
    pub fn save_config(&self) -> bool {
        use crate::dialogs::Dialogs;
        match self.editor.snapshot().save(&self.config_path) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(%err, "saving configuration failed");
                self.dialogs.error("Error", &format!("Failed to save configuration:\n{err}"));
                false
            }
        }
    }

    /// Load and apply the saved configuration. A parse failure is surfaced
    /// and leaves the editor untouched; a missing file applies defaults.
    pub fn load_config(&mut self) -> bool {
        use crate::dialogs::Dialogs;
        match Config::load(&self.config_path) {
            Ok(config) => {
                self.editor.apply(&config);
                true
            }
            Err(err) => {
                tracing::error!(%err, "loading configuration failed");
                self.dialogs.error("Error", &format!("Failed to load configuration:\n{err}"));
                false
            }
        }
    }
}

/// Run the veil window until the user quits. Only implemented on Windows,
/// where the compositor honors the colorkey transparency the veil needs.
pub fn run(shell: Shell) -> anyhow::Result<()> {
    #[cfg(target_os = "windows")]
    {
        window::run_event_loop(shell)
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = shell;
        anyhow::bail!("the veil overlay window requires Windows colorkey compositing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_ids_are_unique_and_round_trip() {
        for (id, action) in MENU_ACTIONS {
            assert_eq!(menu_action(*id), Some(*action));
        }
        let mut ids: Vec<u32> = MENU_ACTIONS.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), MENU_ACTIONS.len());
        assert_eq!(menu_action(0), None);
        assert_eq!(menu_action(999), None);
    }

    #[test]
    fn shell_config_round_trip_on_disk() {
        use crate::editor::PointerButton;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let mut editor = Editor::new();
        editor.pointer_press(10.0, 10.0, PointerButton::Left);
        editor.pointer_drag(60.0, 90.0);
        editor.pointer_release();
        editor.set_veil_opacity(0.42);

        let mut shell = Shell {
            editor,
            tray: crate::tray::disconnected(),
            dialogs: NativeDialogs,
            config_path: path,
        };
        assert!(shell.save_config());

        shell.editor.delete_all();
        shell.editor.set_veil_opacity(1.0);
        assert!(shell.load_config());
        assert_eq!(shell.editor.areas().len(), 1);
        assert_eq!(shell.editor.veil_opacity(), 0.42);
    }
}
