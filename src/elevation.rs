//! Startup administrator check and self-relaunch with elevation.

use crate::dialogs::Dialogs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// Already elevated, or the platform has no elevation concept.
    Elevated,
    /// A new elevated instance was started; this process should exit.
    Relaunched,
    /// Elevation was refused or failed; continue unelevated.
    Failed,
}

/// Check for admin rights and relaunch elevated when missing. Failure is
/// recoverable: the user is told and the app keeps running unelevated.
pub fn ensure_elevated(dialogs: &dyn Dialogs) -> Elevation {
    let outcome = platform_elevation();
    if outcome == Elevation::Failed {
        dialogs.error(
            "Elevation Failed",
            "Failed to run with administrator privileges.\nThe application may not function correctly.",
        );
    }
    outcome
}

#[cfg(target_os = "windows")]
fn platform_elevation() -> Elevation {
    use windows::core::{w, PCWSTR};
    use windows::Win32::UI::Shell::{IsUserAnAdmin, ShellExecuteW};
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    unsafe {
        if IsUserAnAdmin().as_bool() {
            tracing::debug!("already running elevated");
            return Elevation::Elevated;
        }
    }

    let exe = match std::env::current_exe() {
        Ok(path) => path,
        Err(err) => {
            tracing::warn!(%err, "cannot resolve own executable for elevation");
            return Elevation::Failed;
        }
    };
    let exe_w: Vec<u16> = exe
        .as_os_str()
        .to_string_lossy()
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();

    let result = unsafe {
        ShellExecuteW(
            None,
            w!("runas"),
            PCWSTR::from_raw(exe_w.as_ptr()),
            PCWSTR::null(),
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };
    // ShellExecuteW reports success with a value above 32.
    if result.0 as isize > 32 {
        tracing::info!("elevated instance started, exiting this one");
        Elevation::Relaunched
    } else {
        tracing::warn!(code = result.0 as isize, "elevation request failed");
        Elevation::Failed
    }
}

#[cfg(not(target_os = "windows"))]
fn platform_elevation() -> Elevation {
    Elevation::Elevated
}
