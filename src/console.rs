//! Show/hide the console window attached to the process.
//!
//! The console starts hidden; the tray and context menu toggle it back for
//! reading the log output.

#[derive(Debug, Default)]
pub struct Console {
    visible: bool,
}

impl Console {
    /// Hidden-by-default handle; hides the attached console immediately.
    pub fn hidden() -> Self {
        set_console_visible(false);
        Self { visible: false }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        set_console_visible(self.visible);
        tracing::debug!(visible = self.visible, "console toggled");
    }
}

#[cfg(target_os = "windows")]
fn set_console_visible(visible: bool) {
    use windows::Win32::System::Console::GetConsoleWindow;
    use windows::Win32::UI::WindowsAndMessaging::{ShowWindow, SW_HIDE, SW_SHOW};

    unsafe {
        let hwnd = GetConsoleWindow();
        if !hwnd.is_invalid() {
            let _ = ShowWindow(hwnd, if visible { SW_SHOW } else { SW_HIDE });
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn set_console_visible(_visible: bool) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_visibility_flag() {
        let mut console = Console::default();
        assert!(!console.is_visible());
        console.toggle();
        assert!(console.is_visible());
        console.toggle();
        assert!(!console.is_visible());
    }
}
