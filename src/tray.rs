//! System tray icon on its own thread.
//!
//! Tray callbacks fire on a foreign thread and must never touch editor
//! state. Every menu selection is posted as a [`TrayRequest`] over a channel
//! and executed by the UI thread at its next pump iteration.

use anyhow::Result;
use std::sync::mpsc::{channel, Receiver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayRequest {
    /// Show/hide the veil; same transition as pause/resume.
    ToggleVisibility,
    TogglePause,
    ShowGuide,
    ToggleConsole,
    Quit,
}

const IDM_TOGGLE: u32 = 1;
const IDM_PAUSE: u32 = 2;
const IDM_GUIDE: u32 = 3;
const IDM_CONSOLE: u32 = 4;
const IDM_EXIT: u32 = 5;

/// Map a popup menu command id to the request it stands for.
pub fn menu_request(command: u32) -> Option<TrayRequest> {
    match command {
        IDM_TOGGLE => Some(TrayRequest::ToggleVisibility),
        IDM_PAUSE => Some(TrayRequest::TogglePause),
        IDM_GUIDE => Some(TrayRequest::ShowGuide),
        IDM_CONSOLE => Some(TrayRequest::ToggleConsole),
        IDM_EXIT => Some(TrayRequest::Quit),
        _ => None,
    }
}

pub struct Tray {
    requests: Receiver<TrayRequest>,
    #[cfg(target_os = "windows")]
    hwnd: std::sync::Arc<std::sync::Mutex<Option<isize>>>,
    #[cfg(target_os = "windows")]
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Tray {
    /// Requests posted since the last drain, in arrival order.
    pub fn drain(&self) -> Vec<TrayRequest> {
        self.requests.try_iter().collect()
    }

    pub fn shutdown(&mut self) {
        #[cfg(target_os = "windows")]
        {
            if let Ok(store) = self.hwnd.lock() {
                if let Some(hwnd) = *store {
                    unsafe {
                        let _ = windows::Win32::UI::WindowsAndMessaging::PostMessageW(
                            windows::Win32::Foundation::HWND(hwnd as *mut _),
                            windows::Win32::UI::WindowsAndMessaging::WM_CLOSE,
                            windows::Win32::Foundation::WPARAM(0),
                            windows::Win32::Foundation::LPARAM(0),
                        );
                    }
                }
            }
            if let Some(handle) = self.thread.take() {
                let _ = handle.join();
            }
        }
    }
}

/// Handle with no thread behind it; it never yields requests. Used on
/// platforms without a tray and by tests that do not want a real icon.
pub fn disconnected() -> Tray {
    let (_, rx) = channel::<TrayRequest>();
    Tray {
        requests: rx,
        #[cfg(target_os = "windows")]
        hwnd: std::sync::Arc::new(std::sync::Mutex::new(None)),
        #[cfg(target_os = "windows")]
        thread: None,
    }
}

/// Start the tray icon thread. On platforms without a tray the returned
/// handle simply never yields requests.
pub fn spawn() -> Result<Tray> {
    let (tx, rx) = channel::<TrayRequest>();

    #[cfg(target_os = "windows")]
    {
        let hwnd_store = std::sync::Arc::new(std::sync::Mutex::new(None));
        let hwnd_for_thread = std::sync::Arc::clone(&hwnd_store);
        let thread = std::thread::Builder::new()
            .name("tray-icon".to_string())
            .spawn(move || platform::run_tray(tx, hwnd_for_thread))
            .map_err(|err| anyhow::anyhow!("failed to spawn tray thread: {err}"))?;

        return Ok(Tray {
            requests: rx,
            hwnd: hwnd_store,
            thread: Some(thread),
        });
    }

    #[cfg(not(target_os = "windows"))]
    {
        drop((tx, rx));
        Ok(disconnected())
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use super::{menu_request, TrayRequest, IDM_CONSOLE, IDM_EXIT, IDM_GUIDE, IDM_PAUSE, IDM_TOGGLE};
    use std::sync::mpsc::Sender;
    use std::sync::{Arc, Mutex};
    use windows::core::w;
    use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::Shell::{
        Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu,
        DispatchMessageW, GetCursorPos, GetMessageW, GetWindowLongPtrW, LoadIconW, PostQuitMessage,
        RegisterClassW, SetForegroundWindow, SetWindowLongPtrW, TrackPopupMenu, TranslateMessage,
        GWLP_USERDATA, HMENU, IDI_APPLICATION, MF_SEPARATOR, MF_STRING, MSG, TPM_NONOTIFY,
        TPM_RETURNCMD, TPM_RIGHTBUTTON, WINDOW_EX_STYLE, WM_APP, WM_DESTROY, WM_LBUTTONDBLCLK,
        WM_RBUTTONUP, WNDCLASSW, WS_POPUP,
    };

    const WM_TRAY_CALLBACK: u32 = WM_APP + 1;
    const TRAY_ICON_ID: u32 = 1;

    struct TrayState {
        tx: Sender<TrayRequest>,
    }

    unsafe extern "system" fn wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
        if state_ptr != 0 && msg == WM_TRAY_CALLBACK {
            let state = &*(state_ptr as *const TrayState);
            match lparam.0 as u32 {
                WM_LBUTTONDBLCLK => {
                    let _ = state.tx.send(TrayRequest::ToggleVisibility);
                }
                WM_RBUTTONUP => {
                    if let Some(request) = show_menu(hwnd) {
                        let _ = state.tx.send(request);
                    }
                }
                _ => {}
            }
            return LRESULT(0);
        }
        if msg == WM_DESTROY {
            let mut nid = NOTIFYICONDATAW::default();
            nid.cbSize = std::mem::size_of::<NOTIFYICONDATAW>() as u32;
            nid.hWnd = hwnd;
            nid.uID = TRAY_ICON_ID;
            let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
            PostQuitMessage(0);
        }
        DefWindowProcW(hwnd, msg, wparam, lparam)
    }

    unsafe fn show_menu(hwnd: HWND) -> Option<TrayRequest> {
        let menu = CreatePopupMenu().ok()?;
        let _ = AppendMenuW(menu, MF_STRING, IDM_TOGGLE as usize, w!("Show/Hide"));
        let _ = AppendMenuW(menu, MF_STRING, IDM_PAUSE as usize, w!("Pause/Resume"));
        let _ = AppendMenuW(menu, MF_SEPARATOR, 0, None);
        let _ = AppendMenuW(menu, MF_STRING, IDM_GUIDE as usize, w!("Quick Start Guide"));
        let _ = AppendMenuW(menu, MF_STRING, IDM_CONSOLE as usize, w!("Show/Hide Console"));
        let _ = AppendMenuW(menu, MF_SEPARATOR, 0, None);
        let _ = AppendMenuW(menu, MF_STRING, IDM_EXIT as usize, w!("Exit"));

        // Required before TrackPopupMenu so the menu dismisses properly.
        let _ = SetForegroundWindow(hwnd);
        let mut point = POINT::default();
        let _ = GetCursorPos(&mut point);
        let command = TrackPopupMenu(
            menu,
            TPM_RETURNCMD | TPM_NONOTIFY | TPM_RIGHTBUTTON,
            point.x,
            point.y,
            0,
            hwnd,
            None,
        );
        let _ = DestroyMenu(menu);
        menu_request(command.0 as u32)
    }

    pub fn run_tray(tx: Sender<TrayRequest>, hwnd_store: Arc<Mutex<Option<isize>>>) {
        unsafe {
            let class_name = w!("FocusVeilTray");
            let hinstance = GetModuleHandleW(None).unwrap_or_default();
            let wc = WNDCLASSW {
                lpfnWndProc: Some(wndproc),
                hInstance: hinstance.into(),
                lpszClassName: class_name,
                ..Default::default()
            };
            let _ = RegisterClassW(&wc);

            let hwnd = match CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                class_name,
                w!("Focus Veil"),
                WS_POPUP,
                0,
                0,
                0,
                0,
                None,
                HMENU::default(),
                hinstance,
                None,
            ) {
                Ok(hwnd) => hwnd,
                Err(err) => {
                    tracing::warn!(%err, "tray window creation failed, tray disabled");
                    return;
                }
            };

            let state = Box::new(TrayState { tx });
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);
            if let Ok(mut store) = hwnd_store.lock() {
                *store = Some(hwnd.0 as isize);
            }

            let mut nid = NOTIFYICONDATAW::default();
            nid.cbSize = std::mem::size_of::<NOTIFYICONDATAW>() as u32;
            nid.hWnd = hwnd;
            nid.uID = TRAY_ICON_ID;
            nid.uFlags = NIF_MESSAGE | NIF_ICON | NIF_TIP;
            nid.uCallbackMessage = WM_TRAY_CALLBACK;
            nid.hIcon = LoadIconW(None, IDI_APPLICATION).unwrap_or_default();
            let tip: Vec<u16> = "Focus Veil - double-click to show/hide"
                .encode_utf16()
                .collect();
            let len = tip.len().min(nid.szTip.len() - 1);
            nid.szTip[..len].copy_from_slice(&tip[..len]);
            if !Shell_NotifyIconW(NIM_ADD, &nid).as_bool() {
                tracing::warn!("tray icon registration failed, tray disabled");
            }

            let mut msg = MSG::default();
            while GetMessageW(&mut msg, HWND(std::ptr::null_mut()), 0, 0).into() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }

            let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
            if state_ptr != 0 {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                drop(Box::from_raw(state_ptr as *mut TrayState));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_ids_map_to_requests() {
        assert_eq!(menu_request(1), Some(TrayRequest::ToggleVisibility));
        assert_eq!(menu_request(2), Some(TrayRequest::TogglePause));
        assert_eq!(menu_request(3), Some(TrayRequest::ShowGuide));
        assert_eq!(menu_request(4), Some(TrayRequest::ToggleConsole));
        assert_eq!(menu_request(5), Some(TrayRequest::Quit));
        assert_eq!(menu_request(0), None);
        assert_eq!(menu_request(99), None);
    }

    #[test]
    fn drain_is_empty_without_a_tray_thread() {
        let (_tx, rx) = std::sync::mpsc::channel::<TrayRequest>();
        let tray = Tray {
            requests: rx,
            #[cfg(target_os = "windows")]
            hwnd: std::sync::Arc::new(std::sync::Mutex::new(None)),
            #[cfg(target_os = "windows")]
            thread: None,
        };
        assert!(tray.drain().is_empty());
    }

    #[test]
    fn drain_preserves_arrival_order() {
        let (tx, rx) = std::sync::mpsc::channel::<TrayRequest>();
        let tray = Tray {
            requests: rx,
            #[cfg(target_os = "windows")]
            hwnd: std::sync::Arc::new(std::sync::Mutex::new(None)),
            #[cfg(target_os = "windows")]
            thread: None,
        };
        tx.send(TrayRequest::TogglePause).unwrap();
        tx.send(TrayRequest::ShowGuide).unwrap();
        tx.send(TrayRequest::Quit).unwrap();
        assert_eq!(
            tray.drain(),
            vec![
                TrayRequest::TogglePause,
                TrayRequest::ShowGuide,
                TrayRequest::Quit
            ]
        );
        assert!(tray.drain().is_empty());
    }
}
