//! Win32 implementation of the veil: a layered, topmost, full-screen popup
//! with colorkey cut-outs, painted with GDI and driven by a plain wndproc.

use super::{menu_action, MenuAction, Shell};
use crate::color;
use crate::console::Console;
use crate::dialogs::Dialogs;
use crate::editor::{PointerButton, PressOutcome, TRANSPARENCY_KEY};
use crate::geometry::{CursorShape, Rect, HANDLE_RADIUS};
use crate::guide;
use crate::tray::TrayRequest;
use anyhow::{anyhow, Result};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreatePen, CreateSolidBrush, DeleteObject, Ellipse, EndPaint, FillRect,
    GetStockObject, Rectangle, SelectObject, NULL_BRUSH, PAINTSTRUCT, PS_SOLID,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyState, ReleaseCapture, SetCapture, VK_CONTROL, VK_DELETE, VK_ESCAPE, VK_SHIFT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    DispatchMessageW, GetCursorPos, GetMessageW, GetSystemMetrics, GetWindowLongPtrW, KillTimer,
    LoadCursorW, PostQuitMessage, RegisterClassW, SetCursor, SetForegroundWindow,
    SetLayeredWindowAttributes, SetTimer, SetWindowLongPtrW, SetWindowPos, ShowWindow,
    TrackPopupMenu, TranslateMessage, CS_DBLCLKS, CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, HMENU,
    HWND_TOPMOST, IDC_ARROW, IDC_CROSS, IDC_SIZEALL, IDC_SIZENESW, IDC_SIZENS, IDC_SIZENWSE,
    IDC_SIZEWE, LWA_ALPHA, LWA_COLORKEY, MF_SEPARATOR, MF_STRING, MSG, SM_CXSCREEN, SM_CYSCREEN,
    SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SW_HIDE, SW_SHOW, TPM_NONOTIFY, TPM_RETURNCMD,
    TPM_RIGHTBUTTON, WM_CLOSE, WM_DESTROY, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDBLCLK, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_PAINT, WM_RBUTTONDOWN, WM_SETCURSOR, WM_TIMER,
    WNDCLASSW, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

const TRAY_TIMER_ID: usize = 1;
const GUIDE_TIMER_ID: usize = 2;
const BORDER_COLOR: &str = "#FF0000";
const HANDLE_FILL: &str = "#8B00FF";
const HANDLE_OUTLINE: &str = "#6A00CC";

struct VeilState {
    shell: Shell,
    console: Console,
    applied_alpha: Option<u8>,
    applied_visible: Option<bool>,
    mouse_down: bool,
}

fn colorref(hex: &str) -> COLORREF {
    let (r, g, b) = color::parse_hex(hex).unwrap_or((0, 0, 0));
    COLORREF((b as u32) << 16 | (g as u32) << 8 | r as u32)
}

fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn point_from_lparam(lparam: LPARAM) -> (f32, f32) {
    let x = (lparam.0 & 0xFFFF) as u16 as i16;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16;
    (x as f32, y as f32)
}

fn wheel_notches(wparam: WPARAM) -> f32 {
    ((wparam.0 >> 16) as u16 as i16) as f32 / 120.0
}

/// Push the editor's visibility and effective alpha to the compositor,
/// skipping calls when nothing changed.
unsafe fn sync_visual(hwnd: HWND, state: &mut VeilState) {
    let visible = state.shell.editor.is_visible();
    if state.applied_visible != Some(visible) {
        state.applied_visible = Some(visible);
        if visible {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = SetWindowPos(
                hwnd,
                HWND_TOPMOST,
                0,
                0,
                0,
                0,
                SWP_NOACTIVATE | SWP_NOMOVE | SWP_NOSIZE,
            );
            let _ = SetForegroundWindow(hwnd);
            // Force the alpha to be re-applied after the window comes back.
            state.applied_alpha = None;
        } else {
            let _ = ShowWindow(hwnd, SW_HIDE);
        }
    }

    if visible {
        let alpha = color::alpha_byte(state.shell.editor.effective_opacity());
        if state.applied_alpha != Some(alpha) {
            state.applied_alpha = Some(alpha);
            let _ = SetLayeredWindowAttributes(
                hwnd,
                colorref(TRANSPARENCY_KEY),
                alpha,
                LWA_ALPHA | LWA_COLORKEY,
            );
        }
    }
}

unsafe fn invalidate(hwnd: HWND) {
    use windows::Win32::Graphics::Gdi::{RedrawWindow, RDW_INVALIDATE};
    let _ = RedrawWindow(hwnd, None, None, RDW_INVALIDATE);
}

unsafe fn paint_rect_cutout(hdc: windows::Win32::Graphics::Gdi::HDC, rect: Rect) {
    let key_brush = CreateSolidBrush(colorref(TRANSPARENCY_KEY));
    let border_pen = CreatePen(PS_SOLID, 2, colorref(BORDER_COLOR));
    let fill_rect = windows::Win32::Foundation::RECT {
        left: rect.x1 as i32,
        top: rect.y1 as i32,
        right: rect.x2 as i32,
        bottom: rect.y2 as i32,
    };
    FillRect(hdc, &fill_rect, key_brush);
    let old_pen = SelectObject(hdc, border_pen);
    let old_brush = SelectObject(hdc, GetStockObject(NULL_BRUSH));
    let _ = Rectangle(
        hdc,
        rect.x1 as i32,
        rect.y1 as i32,
        rect.x2 as i32,
        rect.y2 as i32,
    );
    SelectObject(hdc, old_brush);
    SelectObject(hdc, old_pen);
    let _ = DeleteObject(border_pen);
    let _ = DeleteObject(key_brush);
}

unsafe fn paint_handle(hdc: windows::Win32::Graphics::Gdi::HDC, center: (f32, f32)) {
    let fill = CreateSolidBrush(colorref(HANDLE_FILL));
    let outline = CreatePen(PS_SOLID, 2, colorref(HANDLE_OUTLINE));
    let old_pen = SelectObject(hdc, outline);
    let old_brush = SelectObject(hdc, fill);
    let r = HANDLE_RADIUS;
    let _ = Ellipse(
        hdc,
        (center.0 - r) as i32,
        (center.1 - r) as i32,
        (center.0 + r) as i32,
        (center.1 + r) as i32,
    );
    SelectObject(hdc, old_brush);
    SelectObject(hdc, old_pen);
    let _ = DeleteObject(outline);
    let _ = DeleteObject(fill);
}

unsafe fn paint(hwnd: HWND, state: &VeilState) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);

    let veil_brush = CreateSolidBrush(colorref(state.shell.editor.veil_color()));
    let mut client = windows::Win32::Foundation::RECT::default();
    client.right = GetSystemMetrics(SM_CXSCREEN);
    client.bottom = GetSystemMetrics(SM_CYSCREEN);
    FillRect(hdc, &client, veil_brush);
    let _ = DeleteObject(veil_brush);

    for area in state.shell.editor.areas() {
        paint_rect_cutout(hdc, area.bounds());
        paint_handle(hdc, area.handle_center());
    }
    if let Some(preview) = state.shell.editor.preview() {
        paint_rect_cutout(hdc, preview);
    }

    let _ = EndPaint(hwnd, &ps);
}

unsafe fn apply_cursor(shape: CursorShape) {
    let id = match shape {
        CursorShape::Arrow => IDC_ARROW,
        CursorShape::Cross => IDC_CROSS,
        CursorShape::Fleur => IDC_SIZEALL,
        CursorShape::SizeNwSe => IDC_SIZENWSE,
        CursorShape::SizeNeSw => IDC_SIZENESW,
        CursorShape::SizeNs => IDC_SIZENS,
        CursorShape::SizeWe => IDC_SIZEWE,
    };
    if let Ok(cursor) = LoadCursorW(None, id) {
        SetCursor(cursor);
    }
}

unsafe fn show_context_menu(hwnd: HWND, state: &mut VeilState) {
    let editor = &state.shell.editor;
    let pause_label = if editor.is_visible() {
        "Pause (Ctrl+Shift+X)".to_string()
    } else {
        "Resume".to_string()
    };
    let opacity_label = format!(
        "Set Opacity (Current: {}%)",
        (editor.veil_opacity() * 100.0).round() as i32
    );
    let peek_label = format!(
        "Set Peek Through Opacity (Current: {}%)",
        (editor.peek_through_opacity() * 100.0).round() as i32
    );
    let delete_label = format!("Delete All Focus Areas ({})", editor.areas().len());
    let console_label = if state.console.is_visible() {
        "Hide Console".to_string()
    } else {
        "Show Console".to_string()
    };

    let labels: [(u32, String); 12] = [
        (1, pause_label),
        (2, "Choose Color...".to_string()),
        (3, "Reset to Black".to_string()),
        (4, opacity_label),
        (5, peek_label),
        (6, delete_label),
        (7, "Save Configuration".to_string()),
        (8, "Load Configuration".to_string()),
        (9, "Quick Start Guide".to_string()),
        (10, "About".to_string()),
        (11, console_label),
        (12, "Exit".to_string()),
    ];
    // Separators after these ids, mirroring the menu groups.
    let separators_after = [1u32, 3, 5, 6, 8, 10, 11];

    let Ok(menu) = CreatePopupMenu() else {
        return;
    };
    let wide_labels: Vec<(u32, Vec<u16>)> = labels
        .iter()
        .map(|(id, label)| (*id, to_wide(label)))
        .collect();
    for (id, label) in &wide_labels {
        let _ = AppendMenuW(
            menu,
            MF_STRING,
            *id as usize,
            PCWSTR::from_raw(label.as_ptr()),
        );
        if separators_after.contains(id) {
            let _ = AppendMenuW(menu, MF_SEPARATOR, 0, None);
        }
    }

    let mut point = windows::Win32::Foundation::POINT::default();
    let _ = GetCursorPos(&mut point);
    let _ = SetForegroundWindow(hwnd);
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

    if let Some(action) = menu_action(command.0 as u32) {
        run_menu_action(hwnd, state, action);
    }
}

unsafe fn run_menu_action(hwnd: HWND, state: &mut VeilState, action: MenuAction) {
    match action {
        MenuAction::TogglePause => state.shell.editor.toggle_pause(),
        MenuAction::ChooseColor => {
            if let Some(picked) = state.shell.dialogs.choose_color(state.shell.editor.veil_color())
            {
                if picked.eq_ignore_ascii_case(TRANSPARENCY_KEY) {
                    state.shell.dialogs.warn(
                        "Color Conflict",
                        "The selected color conflicts with the transparency key.\nPlease choose a different color.",
                    );
                } else {
                    state.shell.editor.set_veil_color(picked);
                }
            }
        }
        MenuAction::ResetToBlack => state.shell.editor.reset_to_black(),
        MenuAction::SetOpacity => {
            let current = (state.shell.editor.veil_opacity() * 100.0).round() as i32;
            if let Some(percent) = state.shell.dialogs.input_int(
                "Set Opacity",
                "Enter opacity percentage (1-100):",
                current,
                1,
                100,
            ) {
                state.shell.editor.set_veil_opacity(percent as f32 / 100.0);
            }
        }
        MenuAction::SetPeekOpacity => {
            let current = (state.shell.editor.peek_through_opacity() * 100.0).round() as i32;
            if let Some(percent) = state.shell.dialogs.input_int(
                "Set Peek Through Opacity",
                "Enter peek through opacity percentage (1-100):",
                current,
                1,
                100,
            ) {
                state
                    .shell
                    .editor
                    .set_peek_through_opacity(percent as f32 / 100.0);
            }
        }
        MenuAction::DeleteAll => state.shell.editor.delete_all(),
        MenuAction::SaveConfig => {
            if state.shell.save_config() {
                state
                    .shell
                    .dialogs
                    .info("Saved", "Configuration saved successfully!");
            }
        }
        MenuAction::LoadConfig => {
            if state.shell.load_config() {
                state
                    .shell
                    .dialogs
                    .info("Loaded", "Configuration loaded successfully!");
            }
        }
        MenuAction::ShowGuide => guide::show(&state.shell.dialogs),
        MenuAction::About => state.shell.dialogs.info(
            "About Focus Veil",
            "Focus Veil\n\nDims the screen except for the focus areas you draw,\nso you can concentrate on part of the display.",
        ),
        MenuAction::ToggleConsole => state.console.toggle(),
        MenuAction::Exit => request_quit(hwnd, state),
    }
    sync_visual(hwnd, state);
    invalidate(hwnd);
}

unsafe fn request_quit(hwnd: HWND, state: &mut VeilState) {
    if state
        .shell
        .dialogs
        .confirm("Exit", "Are you sure you want to exit Focus Veil?")
    {
        let _ = DestroyWindow(hwnd);
    }
}

unsafe fn handle_tray_requests(hwnd: HWND, state: &mut VeilState) {
    for request in state.shell.tray.drain() {
        tracing::debug!(?request, "tray request");
        match request {
            TrayRequest::ToggleVisibility | TrayRequest::TogglePause => {
                state.shell.editor.toggle_pause()
            }
            TrayRequest::ShowGuide => guide::show(&state.shell.dialogs),
            TrayRequest::ToggleConsole => state.console.toggle(),
            TrayRequest::Quit => request_quit(hwnd, state),
        }
    }
    sync_visual(hwnd, state);
}

unsafe fn show_startup_guide(state: &mut VeilState) {
    guide::show(&state.shell.dialogs);
    let keep = state
        .shell
        .dialogs
        .confirm("Quick Start", "Show the quick start guide again on startup?");
    if keep != state.shell.editor.show_quick_start_on_startup() {
        state.shell.editor.set_show_quick_start_on_startup(keep);
        if let Err(err) = state.shell.editor.snapshot().save(&state.shell.config_path) {
            tracing::warn!(%err, "could not persist quick start preference");
        }
    }
}

unsafe extern "system" fn wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
    if state_ptr == 0 {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }
    let state = &mut *(state_ptr as *mut VeilState);

    match msg {
        WM_PAINT => {
            paint(hwnd, state);
            LRESULT(0)
        }
        WM_LBUTTONDOWN => {
            let (x, y) = point_from_lparam(lparam);
            let outcome = state.shell.editor.pointer_press(x, y, PointerButton::Left);
            if outcome != PressOutcome::Ignored {
                SetCapture(hwnd);
                state.mouse_down = true;
            }
            sync_visual(hwnd, state);
            invalidate(hwnd);
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            let (x, y) = point_from_lparam(lparam);
            if state.mouse_down {
                state.shell.editor.pointer_drag(x, y);
                invalidate(hwnd);
            } else {
                apply_cursor(state.shell.editor.pointer_move(x, y));
            }
            LRESULT(0)
        }
        WM_LBUTTONUP => {
            if state.mouse_down {
                state.mouse_down = false;
                let _ = ReleaseCapture();
            }
            state.shell.editor.pointer_release();
            sync_visual(hwnd, state);
            invalidate(hwnd);
            LRESULT(0)
        }
        WM_LBUTTONDBLCLK => {
            state.shell.editor.toggle_pause();
            sync_visual(hwnd, state);
            LRESULT(0)
        }
        WM_RBUTTONDOWN => {
            let (x, y) = point_from_lparam(lparam);
            let outcome = state.shell.editor.pointer_press(x, y, PointerButton::Right);
            match outcome {
                PressOutcome::AreaDeleted => invalidate(hwnd),
                PressOutcome::Ignored => show_context_menu(hwnd, state),
                _ => {}
            }
            LRESULT(0)
        }
        WM_MOUSEWHEEL => {
            state.shell.editor.wheel(wheel_notches(wparam));
            sync_visual(hwnd, state);
            LRESULT(0)
        }
        WM_KEYDOWN => match wparam.0 as u16 {
            vk if vk == VK_SHIFT.0 => {
                state.shell.editor.shift_down();
                sync_visual(hwnd, state);
                LRESULT(0)
            }
            vk if vk == VK_DELETE.0 => {
                state.shell.editor.delete_current();
                invalidate(hwnd);
                LRESULT(0)
            }
            vk if vk == VK_ESCAPE.0 => {
                show_context_menu(hwnd, state);
                LRESULT(0)
            }
            // Ctrl+Shift+X pauses; it never resumes.
            0x58 => {
                let ctrl = GetKeyState(VK_CONTROL.0 as i32) < 0;
                let shift = GetKeyState(VK_SHIFT.0 as i32) < 0;
                if ctrl && shift {
                    state.shell.editor.pause();
                    sync_visual(hwnd, state);
                }
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        },
        WM_KEYUP if wparam.0 as u16 == VK_SHIFT.0 => {
            state.shell.editor.shift_up();
            sync_visual(hwnd, state);
            LRESULT(0)
        }
        WM_SETCURSOR => LRESULT(1),
        WM_TIMER => {
            match wparam.0 {
                TRAY_TIMER_ID => handle_tray_requests(hwnd, state),
                GUIDE_TIMER_ID => {
                    let _ = KillTimer(hwnd, GUIDE_TIMER_ID);
                    show_startup_guide(state);
                }
                _ => {}
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            request_quit(hwnd, state);
            LRESULT(0)
        }
        WM_DESTROY => {
            let _ = KillTimer(hwnd, TRAY_TIMER_ID);
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

pub fn run_event_loop(shell: Shell) -> Result<()> {
    unsafe {
        let hinstance = GetModuleHandleW(None).unwrap_or_default();
        let class_name = w!("FocusVeilOverlay");
        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW | CS_DBLCLKS,
            lpfnWndProc: Some(wndproc),
            hInstance: hinstance.into(),
            lpszClassName: class_name,
            ..Default::default()
        };
        let _ = RegisterClassW(&wc);

        let width = GetSystemMetrics(SM_CXSCREEN);
        let height = GetSystemMetrics(SM_CYSCREEN);
        let hwnd = CreateWindowExW(
            WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
            class_name,
            w!("Focus Veil"),
            WS_POPUP,
            0,
            0,
            width,
            height,
            None,
            HMENU::default(),
            hinstance,
            None,
        )
        .map_err(|err| anyhow!("unable to create the veil window: {err}"))?;

        let show_guide = shell.editor.show_quick_start_on_startup();
        let mut state = Box::new(VeilState {
            shell,
            console: Console::hidden(),
            applied_alpha: None,
            applied_visible: None,
            mouse_down: false,
        });
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, state.as_mut() as *mut _ as isize);

        sync_visual(hwnd, &mut state);
        let _ = SetTimer(hwnd, TRAY_TIMER_ID, 100, None);
        if show_guide {
            let _ = SetTimer(hwnd, GUIDE_TIMER_ID, 1000, None);
        }
        tracing::info!(width, height, "veil window running");

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, HWND(std::ptr::null_mut()), 0, 0).into() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
        state.shell.tray.shutdown();
        tracing::info!("veil window closed");
        Ok(())
    }
}
