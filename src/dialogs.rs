//! Modal dialog seam between the editor and the host shell.
//!
//! The core only ever talks to the [`Dialogs`] trait; the Windows
//! implementation sits behind it so the state machine stays testable off
//! the platform.

/// Modal dialogs the surrounding shell must provide.
pub trait Dialogs {
    fn info(&self, title: &str, message: &str);
    fn warn(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
    /// OK/Cancel confirmation; `true` on OK.
    fn confirm(&self, title: &str, message: &str) -> bool;
    /// Color picker seeded with `initial` (`#RRGGBB`); `None` on cancel.
    fn choose_color(&self, initial: &str) -> Option<String>;
    /// Bounded integer input; `None` on cancel.
    fn input_int(&self, title: &str, prompt: &str, initial: i32, min: i32, max: i32)
        -> Option<i32>;
}

/// Native dialogs on Windows; a logging stub elsewhere so headless builds
/// and tests never block.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDialogs;

#[cfg(not(target_os = "windows"))]
impl Dialogs for NativeDialogs {
    fn info(&self, title: &str, message: &str) {
        tracing::info!(title, message, "dialog");
    }

    fn warn(&self, title: &str, message: &str) {
        tracing::warn!(title, message, "dialog");
    }

    fn error(&self, title: &str, message: &str) {
        tracing::error!(title, message, "dialog");
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        tracing::info!(title, message, "confirm dialog auto-accepted");
        true
    }

    fn choose_color(&self, _initial: &str) -> Option<String> {
        None
    }

    fn input_int(
        &self,
        _title: &str,
        _prompt: &str,
        _initial: i32,
        _min: i32,
        _max: i32,
    ) -> Option<i32> {
        None
    }
}

#[cfg(target_os = "windows")]
impl Dialogs for NativeDialogs {
    fn info(&self, title: &str, message: &str) {
        platform::message_box(title, message, platform::Severity::Info);
    }

    fn warn(&self, title: &str, message: &str) {
        platform::message_box(title, message, platform::Severity::Warning);
    }

    fn error(&self, title: &str, message: &str) {
        platform::message_box(title, message, platform::Severity::Error);
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        platform::confirm_box(title, message)
    }

    fn choose_color(&self, initial: &str) -> Option<String> {
        platform::choose_color(initial)
    }

    fn input_int(
        &self,
        title: &str,
        prompt: &str,
        initial: i32,
        min: i32,
        max: i32,
    ) -> Option<i32> {
        platform::input_int(title, prompt, initial, min, max)
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use crate::color;
    use windows::core::{w, PCWSTR};
    use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::Controls::Dialogs::{
        ChooseColorW, CC_FULLOPEN, CC_RGBINIT, CHOOSECOLORW,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
        GetWindowLongPtrW, GetWindowTextW, MessageBoxW, PostQuitMessage, RegisterClassW,
        SendMessageW, SetFocus, SetWindowLongPtrW, TranslateMessage, EM_SETSEL, GWLP_USERDATA,
        HMENU, MB_ICONERROR, MB_ICONINFORMATION, MB_ICONQUESTION, MB_ICONWARNING, MB_OK,
        MB_OKCANCEL, MB_TOPMOST, MESSAGEBOX_RESULT, MSG, WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE,
        WM_COMMAND, WM_DESTROY, WNDCLASSW, WS_BORDER, WS_CAPTION, WS_CHILD, WS_EX_TOPMOST,
        WS_SYSMENU, WS_VISIBLE,
    };

    pub enum Severity {
        Info,
        Warning,
        Error,
    }

    fn to_wide(text: &str) -> Vec<u16> {
        text.encode_utf16().chain(std::iter::once(0)).collect()
    }

    pub fn message_box(title: &str, message: &str, severity: Severity) {
        let icon = match severity {
            Severity::Info => MB_ICONINFORMATION,
            Severity::Warning => MB_ICONWARNING,
            Severity::Error => MB_ICONERROR,
        };
        let title_w = to_wide(title);
        let message_w = to_wide(message);
        unsafe {
            MessageBoxW(
                HWND::default(),
                PCWSTR::from_raw(message_w.as_ptr()),
                PCWSTR::from_raw(title_w.as_ptr()),
                MB_OK | MB_TOPMOST | icon,
            );
        }
    }

    pub fn confirm_box(title: &str, message: &str) -> bool {
        let title_w = to_wide(title);
        let message_w = to_wide(message);
        let result = unsafe {
            MessageBoxW(
                HWND::default(),
                PCWSTR::from_raw(message_w.as_ptr()),
                PCWSTR::from_raw(title_w.as_ptr()),
                MB_OKCANCEL | MB_TOPMOST | MB_ICONQUESTION,
            )
        };
        result == MESSAGEBOX_RESULT(1) // IDOK
    }

    pub fn choose_color(initial: &str) -> Option<String> {
        let (r, g, b) = color::parse_hex(initial).unwrap_or((0, 0, 0));
        let mut custom = [COLORREF(0); 16];
        let mut cc = CHOOSECOLORW {
            lStructSize: std::mem::size_of::<CHOOSECOLORW>() as u32,
            rgbResult: COLORREF((b as u32) << 16 | (g as u32) << 8 | r as u32),
            lpCustColors: custom.as_mut_ptr(),
            Flags: CC_FULLOPEN | CC_RGBINIT,
            ..Default::default()
        };
        let picked = unsafe { ChooseColorW(&mut cc) }.as_bool();
        if !picked {
            return None;
        }
        let value = cc.rgbResult.0;
        Some(color::to_hex(
            (value & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            ((value >> 16) & 0xFF) as u8,
        ))
    }

    const IDC_EDIT: isize = 100;
    const IDC_OK: isize = 1;
    const IDC_CANCEL: isize = 2;

    struct InputState {
        min: i32,
        max: i32,
        edit: HWND,
        result: Option<i32>,
    }

    unsafe extern "system" fn input_wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
        if state_ptr != 0 {
            let state = &mut *(state_ptr as *mut InputState);
            match msg {
                WM_COMMAND => {
                    match (wparam.0 & 0xFFFF) as isize {
                        IDC_OK => {
                            let mut buf = [0u16; 16];
                            let len = GetWindowTextW(state.edit, &mut buf);
                            let text = String::from_utf16_lossy(&buf[..len as usize]);
                            match text.trim().parse::<i32>() {
                                Ok(v) if v >= state.min && v <= state.max => {
                                    state.result = Some(v);
                                    let _ = DestroyWindow(hwnd);
                                }
                                // Out of bounds or unparsable: reselect for retry.
                                _ => {
                                    SendMessageW(
                                        state.edit,
                                        EM_SETSEL,
                                        WPARAM(0),
                                        LPARAM(-1),
                                    );
                                    let _ = SetFocus(state.edit);
                                }
                            }
                        }
                        IDC_CANCEL => {
                            let _ = DestroyWindow(hwnd);
                        }
                        _ => {}
                    }
                    return LRESULT(0);
                }
                WM_CLOSE => {
                    let _ = DestroyWindow(hwnd);
                    return LRESULT(0);
                }
                WM_DESTROY => {
                    PostQuitMessage(0);
                    return LRESULT(0);
                }
                _ => {}
            }
        }
        DefWindowProcW(hwnd, msg, wparam, lparam)
    }

    pub fn input_int(title: &str, prompt: &str, initial: i32, min: i32, max: i32) -> Option<i32> {
        unsafe {
            let hinstance = GetModuleHandleW(None).unwrap_or_default();
            let class_name = w!("FocusVeilInput");
            let wc = WNDCLASSW {
                lpfnWndProc: Some(input_wndproc),
                hInstance: hinstance.into(),
                lpszClassName: class_name,
                ..Default::default()
            };
            let _ = RegisterClassW(&wc);

            let title_w = to_wide(title);
            let hwnd = CreateWindowExW(
                WS_EX_TOPMOST,
                class_name,
                PCWSTR::from_raw(title_w.as_ptr()),
                WS_CAPTION | WS_SYSMENU | WS_VISIBLE,
                400,
                300,
                320,
                180,
                None,
                HMENU::default(),
                hinstance,
                None,
            )
            .ok()?;

            let prompt_w = to_wide(prompt);
            let _ = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                w!("STATIC"),
                PCWSTR::from_raw(prompt_w.as_ptr()),
                WS_CHILD | WS_VISIBLE,
                12,
                12,
                280,
                40,
                hwnd,
                HMENU::default(),
                hinstance,
                None,
            )
            .ok()?;
            let initial_w = to_wide(&initial.to_string());
            let edit = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                w!("EDIT"),
                PCWSTR::from_raw(initial_w.as_ptr()),
                WS_CHILD | WS_VISIBLE | WS_BORDER | WINDOW_STYLE(0x2000), // ES_NUMBER
                12,
                60,
                120,
                24,
                hwnd,
                HMENU(IDC_EDIT as *mut _),
                hinstance,
                None,
            )
            .ok()?;
            let _ = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                w!("BUTTON"),
                w!("OK"),
                WS_CHILD | WS_VISIBLE,
                60,
                100,
                80,
                28,
                hwnd,
                HMENU(IDC_OK as *mut _),
                hinstance,
                None,
            )
            .ok()?;
            let _ = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                w!("BUTTON"),
                w!("Cancel"),
                WS_CHILD | WS_VISIBLE,
                160,
                100,
                80,
                28,
                hwnd,
                HMENU(IDC_CANCEL as *mut _),
                hinstance,
                None,
            )
            .ok()?;

            let mut state = InputState {
                min,
                max,
                edit,
                result: None,
            };
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, &mut state as *mut _ as isize);
            SendMessageW(edit, EM_SETSEL, WPARAM(0), LPARAM(-1));
            let _ = SetFocus(edit);

            let mut msg = MSG::default();
            while GetMessageW(&mut msg, HWND(std::ptr::null_mut()), 0, 0).into() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
            state.result
        }
    }
}
