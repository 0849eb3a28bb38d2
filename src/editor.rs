//! The coordinating state machine behind the veil window.
//!
//! One `Editor` instance owns every focus area, the draw-new-area gesture,
//! and the opacity/visibility resolution. The host window feeds it discrete
//! input events on a single thread and re-reads [`Editor::effective_opacity`]
//! and [`Editor::visibility`] afterwards to know what to push to the
//! compositor.

use crate::config::Config;
use crate::focus_area::FocusArea;
use crate::geometry::{self, CursorShape, Rect, MIN_SIZE};

/// Fixed low alpha applied while a new focus area is being drawn.
pub const EDITING_PEEK_OPACITY: f32 = 0.30;
/// Per-notch opacity change for the mouse wheel.
pub const OPACITY_STEP: f32 = 0.01;
pub const OPACITY_MIN: f32 = 0.01;
pub const OPACITY_MAX: f32 = 1.0;

/// Color the compositor renders as true see-through inside focus areas.
pub const TRANSPARENCY_KEY: &str = "#FF00FF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// The veil window is withdrawn entirely.
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

/// What a press ended up doing, so the host shell knows whether to open the
/// context menu or capture the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Routed to an existing area (body, edge, or handle drag started).
    AreaGrabbed,
    /// A handle was right-clicked and its area deleted.
    AreaDeleted,
    /// A draw gesture started on the empty canvas.
    DrawStarted,
    /// Nothing to do here; a right press on the bare veil.
    Ignored,
}

#[derive(Debug)]
pub struct Editor {
    veil_color: String,
    veil_opacity: f32,
    peek_through_opacity: f32,
    visibility: Visibility,
    shift_peek: bool,
    draw_anchor: Option<(f32, f32)>,
    preview: Option<Rect>,
    areas: Vec<FocusArea>,
    /// Index of the area last grabbed by its handle. A lookup, not an owner;
    /// cleared whenever that area goes away or the pointer leaves it.
    current: Option<usize>,
    /// Index of the area receiving drag events between press and release.
    dragging: Option<usize>,
    show_quick_start_on_startup: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        let defaults = Config::default();
        Self {
            veil_color: defaults.veil_color,
            veil_opacity: defaults.veil_opacity,
            peek_through_opacity: defaults.peek_through_opacity,
            visibility: Visibility::Visible,
            shift_peek: false,
            draw_anchor: None,
            preview: None,
            areas: Vec::new(),
            current: None,
            dragging: None,
            show_quick_start_on_startup: defaults.show_quick_start_on_startup,
        }
    }

    // ----- accessors -------------------------------------------------------

    pub fn veil_color(&self) -> &str {
        &self.veil_color
    }

    pub fn veil_opacity(&self) -> f32 {
        self.veil_opacity
    }

    pub fn peek_through_opacity(&self) -> f32 {
        self.peek_through_opacity
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn areas(&self) -> &[FocusArea] {
        &self.areas
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Ephemeral rectangle of an in-progress draw gesture, for painting.
    pub fn preview(&self) -> Option<Rect> {
        self.preview
    }

    pub fn is_drawing(&self) -> bool {
        self.draw_anchor.is_some()
    }

    pub fn show_quick_start_on_startup(&self) -> bool {
        self.show_quick_start_on_startup
    }

    pub fn set_show_quick_start_on_startup(&mut self, show: bool) {
        self.show_quick_start_on_startup = show;
    }

    /// The one alpha value to apply to the host window right now.
    ///
    /// Editing-peek wins over shift-peek while drawing; shift-peek only
    /// lowers, never raises, the veil. Paused suppresses rendering entirely
    /// regardless of this value.
    pub fn effective_opacity(&self) -> f32 {
        if self.draw_anchor.is_some() {
            EDITING_PEEK_OPACITY
        } else if self.shift_peek {
            self.peek_through_opacity.min(self.veil_opacity)
        } else {
            self.veil_opacity
        }
    }

    // ----- pointer events --------------------------------------------------

    /// Route a press to the topmost hit area, or start a draw gesture on the
    /// empty canvas. Most-recently-created areas are checked first so
    /// overlaps resolve deterministically.
    pub fn pointer_press(&mut self, px: f32, py: f32, button: PointerButton) -> PressOutcome {
        for i in (0..self.areas.len()).rev() {
            if self.areas[i].hit_handle(px, py) {
                match button {
                    PointerButton::Right => {
                        self.delete_area(i);
                        return PressOutcome::AreaDeleted;
                    }
                    PointerButton::Left => {
                        self.areas[i].press_handle(px, py);
                        self.current = Some(i);
                        self.dragging = Some(i);
                        return PressOutcome::AreaGrabbed;
                    }
                }
            }
            if self.areas[i].contains(px, py) {
                if button == PointerButton::Left {
                    self.areas[i].press(px, py);
                    self.dragging = Some(i);
                    return PressOutcome::AreaGrabbed;
                }
                return PressOutcome::Ignored;
            }
        }

        if button == PointerButton::Left {
            // Drawing doubles as editing-peek until the gesture ends.
            self.draw_anchor = Some((px, py));
            self.preview = None;
            tracing::debug!(px, py, "draw gesture started");
            return PressOutcome::DrawStarted;
        }
        PressOutcome::Ignored
    }

    pub fn pointer_drag(&mut self, px: f32, py: f32) {
        if let Some(i) = self.dragging {
            self.areas[i].drag(px, py);
        } else if let Some(anchor) = self.draw_anchor {
            self.preview = Some(Rect::normalized(anchor, (px, py)));
        }
    }

    /// End the active gesture. A completed draw commits a new focus area iff
    /// the normalized preview meets the minimum size; editing-peek ends on
    /// every gesture end regardless of Shift state.
    pub fn pointer_release(&mut self) {
        if let Some(i) = self.dragging.take() {
            self.areas[i].release();
            return;
        }

        if self.draw_anchor.take().is_some() {
            if let Some(preview) = self.preview.take() {
                if preview.width() >= MIN_SIZE && preview.height() >= MIN_SIZE {
                    self.areas.push(FocusArea::new(preview));
                    tracing::debug!(total = self.areas.len(), "focus area created");
                } else {
                    tracing::debug!("draw gesture too small, discarded");
                }
            }
        }
    }

    /// Hover handling: resolves the cursor to show and drops the `current`
    /// back-reference once the pointer has left that area.
    pub fn pointer_move(&mut self, px: f32, py: f32) -> CursorShape {
        if let (Some(i), None) = (self.current, self.dragging) {
            if !self.areas[i].contains(px, py) && !self.areas[i].hit_handle(px, py) {
                self.current = None;
            }
        }

        if let Some(i) = self.dragging {
            return geometry::cursor_for(self.areas[i].drag_mode());
        }
        if self.draw_anchor.is_some() {
            return CursorShape::Cross;
        }

        for i in (0..self.areas.len()).rev() {
            if self.areas[i].hit_handle(px, py) {
                return CursorShape::Fleur;
            }
            if self.areas[i].contains(px, py) {
                return geometry::cursor_for(Some(self.areas[i].classify(px, py)));
            }
        }
        CursorShape::Cross
    }

    // ----- keyboard / wheel / visibility -----------------------------------

    pub fn shift_down(&mut self) {
        if self.is_visible() && !self.shift_peek {
            self.shift_peek = true;
            tracing::debug!(opacity = self.effective_opacity(), "peek through on");
        }
    }

    pub fn shift_up(&mut self) {
        if self.shift_peek {
            self.shift_peek = false;
            tracing::debug!(opacity = self.effective_opacity(), "peek through off");
        }
    }

    /// Wheel notches adjust the veil opacity; positive is "up" / more opaque.
    pub fn wheel(&mut self, notches: f32) {
        if !self.is_visible() {
            return;
        }
        let delta = if notches > 0.0 {
            OPACITY_STEP
        } else {
            -OPACITY_STEP
        };
        self.veil_opacity = (self.veil_opacity + delta).clamp(OPACITY_MIN, OPACITY_MAX);
    }

    pub fn toggle_pause(&mut self) {
        self.visibility = match self.visibility {
            Visibility::Visible => Visibility::Paused,
            Visibility::Paused => Visibility::Visible,
        };
        tracing::debug!(visibility = ?self.visibility, "pause toggled");
    }

    /// The pause shortcut only ever hides, never resumes.
    pub fn pause(&mut self) {
        self.visibility = Visibility::Paused;
    }

    // ----- area management -------------------------------------------------

    pub fn delete_current(&mut self) {
        if let Some(i) = self.current {
            self.delete_area(i);
        }
    }

    pub fn delete_area(&mut self, index: usize) {
        if index >= self.areas.len() {
            return;
        }
        self.areas.remove(index);
        self.current = adjust_index_after_removal(self.current, index);
        self.dragging = adjust_index_after_removal(self.dragging, index);
        tracing::debug!(remaining = self.areas.len(), "focus area deleted");
    }

    pub fn delete_all(&mut self) {
        self.areas.clear();
        self.current = None;
        self.dragging = None;
    }

    // ----- settings --------------------------------------------------------

    pub fn set_veil_color(&mut self, color: String) {
        self.veil_color = color;
    }

    /// Reset to an opaque black veil.
    pub fn reset_to_black(&mut self) {
        self.veil_color = "#000000".to_string();
        self.veil_opacity = OPACITY_MAX;
    }

    pub fn set_veil_opacity(&mut self, opacity: f32) {
        self.veil_opacity = opacity.clamp(OPACITY_MIN, OPACITY_MAX);
    }

    pub fn set_peek_through_opacity(&mut self, opacity: f32) {
        self.peek_through_opacity = opacity.clamp(OPACITY_MIN, OPACITY_MAX);
    }

    // ----- persistence -----------------------------------------------------

    pub fn snapshot(&self) -> Config {
        Config {
            veil_color: self.veil_color.clone(),
            veil_opacity: self.veil_opacity,
            peek_through_opacity: self.peek_through_opacity,
            show_quick_start_on_startup: self.show_quick_start_on_startup,
            focus_areas: self
                .areas
                .iter()
                .map(|a| {
                    let b = a.bounds();
                    [b.x1, b.y1, b.x2, b.y2]
                })
                .collect(),
        }
    }

    /// Replace the whole editor state with a loaded record. Rows that do not
    /// describe a finite rectangle are skipped; any in-flight gesture is
    /// abandoned.
    pub fn apply(&mut self, config: &Config) {
        self.veil_color = config.veil_color.clone();
        self.veil_opacity = config.veil_opacity.clamp(OPACITY_MIN, OPACITY_MAX);
        self.peek_through_opacity = config.peek_through_opacity.clamp(OPACITY_MIN, OPACITY_MAX);
        self.show_quick_start_on_startup = config.show_quick_start_on_startup;

        self.areas = config
            .focus_areas
            .iter()
            .filter(|row| row.iter().all(|v| v.is_finite()))
            .map(|&[x1, y1, x2, y2]| FocusArea::new(Rect::normalized((x1, y1), (x2, y2))))
            .collect();
        self.current = None;
        self.dragging = None;
        self.draw_anchor = None;
        self.preview = None;
        tracing::debug!(areas = self.areas.len(), "configuration applied");
    }
}

fn adjust_index_after_removal(slot: Option<usize>, removed: usize) -> Option<usize> {
    match slot {
        Some(i) if i == removed => None,
        Some(i) if i > removed => Some(i - 1),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with_area(x1: f32, y1: f32, x2: f32, y2: f32) -> Editor {
        let mut editor = Editor::new();
        editor.pointer_press(x1, y1, PointerButton::Left);
        editor.pointer_drag(x2, y2);
        editor.pointer_release();
        assert_eq!(editor.areas().len(), 1);
        editor
    }

    #[test]
    fn draw_gesture_commits_area_with_preview_bounds() {
        let editor = editor_with_area(100.0, 100.0, 300.0, 250.0);
        assert_eq!(
            editor.areas()[0].bounds(),
            Rect::new(100.0, 100.0, 300.0, 250.0)
        );
        assert!(editor.preview().is_none());
        assert!(!editor.is_drawing());
    }

    #[test]
    fn too_small_preview_is_discarded() {
        let mut editor = Editor::new();
        editor.pointer_press(100.0, 100.0, PointerButton::Left);
        editor.pointer_drag(105.0, 140.0); // 5 wide
        editor.pointer_release();
        assert!(editor.areas().is_empty());
    }

    #[test]
    fn drawing_applies_editing_peek_opacity() {
        let mut editor = Editor::new();
        assert_eq!(editor.effective_opacity(), 1.0);
        editor.pointer_press(50.0, 50.0, PointerButton::Left);
        assert_eq!(editor.effective_opacity(), EDITING_PEEK_OPACITY);
        editor.pointer_release();
        assert_eq!(editor.effective_opacity(), 1.0);
    }

    #[test]
    fn editing_peek_wins_over_shift_peek_and_ends_with_gesture() {
        let mut editor = Editor::new();
        editor.pointer_press(50.0, 50.0, PointerButton::Left);
        editor.shift_down();
        assert_eq!(editor.effective_opacity(), EDITING_PEEK_OPACITY);
        editor.pointer_drag(53.0, 53.0); // too small to commit
        editor.pointer_release();
        assert!(editor.areas().is_empty());
        // Shift is still held, so shift-peek takes over after the gesture.
        assert_eq!(editor.effective_opacity(), 0.55);
        editor.shift_up();
        assert_eq!(editor.effective_opacity(), 1.0);
    }

    #[test]
    fn shift_peek_only_lowers_opacity() {
        let mut editor = Editor::new();
        editor.set_veil_opacity(0.40);
        editor.shift_down();
        // peek_through (0.55) is above the veil, so nothing gets brighter.
        assert_eq!(editor.effective_opacity(), 0.40);
    }

    #[test]
    fn shift_peek_ignored_while_paused() {
        let mut editor = Editor::new();
        editor.pause();
        editor.shift_down();
        assert_eq!(editor.effective_opacity(), 1.0);
        assert_eq!(editor.visibility(), Visibility::Paused);
    }

    #[test]
    fn wheel_steps_and_clamps_opacity() {
        let mut editor = Editor::new();
        for _ in 0..5 {
            editor.wheel(-1.0);
        }
        assert!((editor.veil_opacity() - 0.95).abs() < 1e-6);
        assert!((editor.effective_opacity() - 0.95).abs() < 1e-6);

        for _ in 0..200 {
            editor.wheel(-1.0);
        }
        assert_eq!(editor.veil_opacity(), OPACITY_MIN);
        for _ in 0..200 {
            editor.wheel(1.0);
        }
        assert_eq!(editor.veil_opacity(), OPACITY_MAX);
    }

    #[test]
    fn wheel_is_inert_while_paused() {
        let mut editor = Editor::new();
        editor.toggle_pause();
        editor.wheel(-1.0);
        assert_eq!(editor.veil_opacity(), 1.0);
        editor.toggle_pause();
        assert!(editor.is_visible());
    }

    #[test]
    fn press_inside_area_drags_instead_of_drawing() {
        let mut editor = editor_with_area(100.0, 100.0, 300.0, 250.0);
        let outcome = editor.pointer_press(200.0, 175.0, PointerButton::Left);
        assert_eq!(outcome, PressOutcome::AreaGrabbed);
        editor.pointer_drag(220.0, 175.0);
        editor.pointer_release();
        assert_eq!(editor.areas().len(), 1);
        assert_eq!(
            editor.areas()[0].bounds(),
            Rect::new(120.0, 100.0, 320.0, 250.0)
        );
    }

    #[test]
    fn handle_right_click_deletes_area() {
        let mut editor = editor_with_area(100.0, 100.0, 300.0, 250.0);
        let (hx, hy) = editor.areas()[0].handle_center();
        let outcome = editor.pointer_press(hx, hy, PointerButton::Right);
        assert_eq!(outcome, PressOutcome::AreaDeleted);
        assert!(editor.areas().is_empty());
        assert_eq!(editor.current(), None);
    }

    #[test]
    fn delete_current_after_handle_grab() {
        let mut editor = editor_with_area(100.0, 100.0, 300.0, 250.0);
        let (hx, hy) = editor.areas()[0].handle_center();
        editor.pointer_press(hx, hy, PointerButton::Left);
        editor.pointer_release();
        assert_eq!(editor.current(), Some(0));

        editor.delete_current();
        assert!(editor.areas().is_empty());
        assert_eq!(editor.current(), None);
        // A second delete with nothing selected is a no-op.
        editor.delete_current();
    }

    #[test]
    fn current_cleared_when_pointer_leaves_area() {
        let mut editor = editor_with_area(100.0, 100.0, 300.0, 250.0);
        let (hx, hy) = editor.areas()[0].handle_center();
        editor.pointer_press(hx, hy, PointerButton::Left);
        editor.pointer_release();
        assert_eq!(editor.current(), Some(0));

        editor.pointer_move(200.0, 175.0);
        assert_eq!(editor.current(), Some(0));
        editor.pointer_move(500.0, 500.0);
        assert_eq!(editor.current(), None);
    }

    #[test]
    fn current_index_tracks_removals_before_it() {
        let mut editor = editor_with_area(100.0, 100.0, 300.0, 250.0);
        editor.pointer_press(400.0, 400.0, PointerButton::Left);
        editor.pointer_drag(500.0, 500.0);
        editor.pointer_release();
        assert_eq!(editor.areas().len(), 2);

        let (hx, hy) = editor.areas()[1].handle_center();
        editor.pointer_press(hx, hy, PointerButton::Left);
        editor.pointer_release();
        assert_eq!(editor.current(), Some(1));

        editor.delete_area(0);
        assert_eq!(editor.current(), Some(0));
        assert_eq!(
            editor.areas()[0].bounds(),
            Rect::new(400.0, 400.0, 500.0, 500.0)
        );
    }

    #[test]
    fn delete_all_clears_everything() {
        let mut editor = editor_with_area(100.0, 100.0, 300.0, 250.0);
        editor.delete_all();
        assert!(editor.areas().is_empty());
        assert_eq!(editor.current(), None);
    }

    #[test]
    fn snapshot_and_apply_round_trip() {
        let mut editor = editor_with_area(100.0, 100.0, 300.0, 250.0);
        editor.set_veil_color("#112233".to_string());
        editor.set_veil_opacity(0.77);
        editor.set_peek_through_opacity(0.33);
        editor.set_show_quick_start_on_startup(false);

        let snapshot = editor.snapshot();
        let mut restored = Editor::new();
        restored.apply(&snapshot);

        assert_eq!(restored.veil_color(), "#112233");
        assert_eq!(restored.veil_opacity(), 0.77);
        assert_eq!(restored.peek_through_opacity(), 0.33);
        assert!(!restored.show_quick_start_on_startup());
        assert_eq!(restored.areas().len(), 1);
        assert_eq!(
            restored.areas()[0].bounds(),
            Rect::new(100.0, 100.0, 300.0, 250.0)
        );
    }

    #[test]
    fn apply_skips_non_finite_rows_and_clamps_opacity() {
        let mut editor = Editor::new();
        editor.apply(&Config {
            veil_opacity: 7.0,
            peek_through_opacity: 0.0,
            focus_areas: vec![
                [0.0, 0.0, f32::NAN, 10.0],
                [10.0, 10.0, 60.0, 60.0],
            ],
            ..Config::default()
        });
        assert_eq!(editor.veil_opacity(), OPACITY_MAX);
        assert_eq!(editor.peek_through_opacity(), OPACITY_MIN);
        assert_eq!(editor.areas().len(), 1);
    }

    #[test]
    fn reset_to_black_restores_opaque_black() {
        let mut editor = Editor::new();
        editor.set_veil_color("#ABCDEF".to_string());
        editor.set_veil_opacity(0.2);
        editor.reset_to_black();
        assert_eq!(editor.veil_color(), "#000000");
        assert_eq!(editor.veil_opacity(), 1.0);
    }
}
