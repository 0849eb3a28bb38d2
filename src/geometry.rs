//! Pure hit-testing and resize math for focus areas.
//!
//! Everything here is side-effect free so the interaction state machines can
//! be tested without a window.

/// Smallest width/height a focus area may have after a committed resize.
pub const MIN_SIZE: f32 = 10.0;
/// Distance from an edge within which a pointer grabs that edge for resizing.
pub const RESIZE_HANDLE_WIDTH: f32 = 10.0;
/// Radius of the violet move-handle disc.
pub const HANDLE_RADIUS: f32 = 8.0;

const HANDLE_HIT_SLACK: f32 = 4.0;
const HANDLE_X_SLACK: f32 = 5.0;

/// Axis-aligned rectangle with `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build an ordered rect from two arbitrary corner points.
    pub fn normalized(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x1 && px <= self.x2 && py >= self.y1 && py <= self.y2
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
}

/// How a press on a focus area will mutate it while dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Move,
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl Mode {
    fn edits_top(self) -> bool {
        matches!(self, Mode::N | Mode::Ne | Mode::Nw)
    }

    fn edits_bottom(self) -> bool {
        matches!(self, Mode::S | Mode::Se | Mode::Sw)
    }

    fn edits_left(self) -> bool {
        matches!(self, Mode::W | Mode::Nw | Mode::Sw)
    }

    fn edits_right(self) -> bool {
        matches!(self, Mode::E | Mode::Ne | Mode::Se)
    }
}

/// Fixed golden-ratio point on the left edge where the move handle sits.
pub fn handle_center(rect: &Rect) -> (f32, f32) {
    (rect.x1, rect.y1 + 0.382 * rect.height())
}

/// True when the pointer is inside the move handle's hit band.
///
/// The band is a little wider than the drawn disc so the handle stays easy to
/// grab even though it overlaps the left resize edge.
pub fn in_handle_band(rect: &Rect, px: f32, py: f32) -> bool {
    let (hx, hy) = handle_center(rect);
    (px - hx).abs() < RESIZE_HANDLE_WIDTH + HANDLE_X_SLACK
        && py >= hy - HANDLE_RADIUS - HANDLE_HIT_SLACK
        && py <= hy + HANDLE_RADIUS + HANDLE_HIT_SLACK
}

/// Classify a pointer position on a focus area.
///
/// The move-handle band is checked before the edge bands so grabbing the
/// handle always moves, even though it sits on the left edge. A press on the
/// body that is not near any edge also moves.
pub fn classify(rect: &Rect, px: f32, py: f32) -> Mode {
    if in_handle_band(rect, px, py) {
        return Mode::Move;
    }

    let near_left = (px - rect.x1).abs() < RESIZE_HANDLE_WIDTH;
    let near_right = (px - rect.x2).abs() < RESIZE_HANDLE_WIDTH;
    let near_top = (py - rect.y1).abs() < RESIZE_HANDLE_WIDTH;
    let near_bottom = (py - rect.y2).abs() < RESIZE_HANDLE_WIDTH;

    match (near_top, near_bottom, near_left, near_right) {
        (true, _, true, _) => Mode::Nw,
        (true, _, _, true) => Mode::Ne,
        (_, true, true, _) => Mode::Sw,
        (_, true, _, true) => Mode::Se,
        (true, ..) => Mode::N,
        (_, true, ..) => Mode::S,
        (_, _, true, _) => Mode::W,
        (_, _, _, true) => Mode::E,
        _ => Mode::Move,
    }
}

/// Apply the pointer position to the edges implied by `mode`.
///
/// Returns `None` when the resulting rect would be smaller than [`MIN_SIZE`]
/// in either dimension; the caller keeps the previous bounds for that drag
/// step. `Mode::Move` edits no edges and passes the rect through unchanged.
pub fn resize(rect: &Rect, mode: Mode, px: f32, py: f32) -> Option<Rect> {
    let mut next = *rect;
    if mode.edits_top() {
        next.y1 = py;
    }
    if mode.edits_bottom() {
        next.y2 = py;
    }
    if mode.edits_left() {
        next.x1 = px;
    }
    if mode.edits_right() {
        next.x2 = px;
    }

    if next.width() < MIN_SIZE || next.height() < MIN_SIZE {
        None
    } else {
        Some(next)
    }
}

/// Cursor glyph to show for a given interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    /// Default pointer, shown when no mode applies.
    Arrow,
    /// Canvas default while hovering the bare veil.
    Cross,
    /// Four-way move arrow.
    Fleur,
    SizeNwSe,
    SizeNeSw,
    SizeNs,
    SizeWe,
}

pub fn cursor_for(mode: Option<Mode>) -> CursorShape {
    match mode {
        Some(Mode::Nw) | Some(Mode::Se) => CursorShape::SizeNwSe,
        Some(Mode::Ne) | Some(Mode::Sw) => CursorShape::SizeNeSw,
        Some(Mode::N) | Some(Mode::S) => CursorShape::SizeNs,
        Some(Mode::E) | Some(Mode::W) => CursorShape::SizeWe,
        Some(Mode::Move) => CursorShape::Fleur,
        None => CursorShape::Arrow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::new(100.0, 100.0, 300.0, 250.0)
    }

    #[test]
    fn normalized_orders_corners() {
        let r = Rect::normalized((300.0, 250.0), (100.0, 100.0));
        assert_eq!(r, rect());
        assert_eq!(r.width(), 200.0);
        assert_eq!(r.height(), 150.0);
    }

    #[test]
    fn handle_center_sits_at_golden_ratio_on_left_edge() {
        let (hx, hy) = handle_center(&rect());
        assert_eq!(hx, 100.0);
        assert!((hy - (100.0 + 0.382 * 150.0)).abs() < 1e-4);
    }

    #[test]
    fn classify_prefers_handle_over_left_edge() {
        let r = rect();
        let (hx, hy) = handle_center(&r);
        assert_eq!(classify(&r, hx, hy), Mode::Move);
        // Just outside the handle band the same edge resizes.
        assert_eq!(
            classify(&r, hx, hy + HANDLE_RADIUS + HANDLE_HIT_SLACK + 1.0),
            Mode::W
        );
    }

    #[test]
    fn classify_corners_beat_single_edges() {
        let r = rect();
        assert_eq!(classify(&r, 101.0, 101.0), Mode::Nw);
        assert_eq!(classify(&r, 299.0, 101.0), Mode::Ne);
        assert_eq!(classify(&r, 101.0, 249.0), Mode::Sw);
        assert_eq!(classify(&r, 299.0, 249.0), Mode::Se);
    }

    #[test]
    fn classify_single_edges_and_body() {
        let r = rect();
        assert_eq!(classify(&r, 200.0, 101.0), Mode::N);
        assert_eq!(classify(&r, 200.0, 249.0), Mode::S);
        assert_eq!(classify(&r, 299.0, 175.0), Mode::E);
        // The body, away from every edge, still moves.
        assert_eq!(classify(&r, 200.0, 175.0), Mode::Move);
    }

    #[test]
    fn resize_edits_only_the_implied_edges() {
        let r = rect();
        let shrunk = resize(&r, Mode::Se, 130.0, 110.0).expect("30x10 is allowed");
        assert_eq!(shrunk, Rect::new(100.0, 100.0, 130.0, 110.0));

        let north = resize(&r, Mode::N, 999.0, 120.0).expect("north ignores x");
        assert_eq!(north, Rect::new(100.0, 120.0, 300.0, 250.0));
    }

    #[test]
    fn resize_below_min_size_is_rejected() {
        let r = Rect::new(100.0, 100.0, 130.0, 110.0);
        assert_eq!(resize(&r, Mode::Se, 105.0, 108.0), None);
        assert_eq!(resize(&r, Mode::E, 105.0, 200.0), None);
        assert_eq!(resize(&r, Mode::S, 200.0, 105.0), None);
    }

    #[test]
    fn resize_at_exactly_min_size_commits() {
        let r = rect();
        let exact = resize(&r, Mode::Se, 110.0, 110.0).expect("10x10 commits");
        assert_eq!(exact.width(), MIN_SIZE);
        assert_eq!(exact.height(), MIN_SIZE);
    }

    #[test]
    fn cursor_lookup_matches_modes() {
        assert_eq!(cursor_for(Some(Mode::Nw)), CursorShape::SizeNwSe);
        assert_eq!(cursor_for(Some(Mode::Se)), CursorShape::SizeNwSe);
        assert_eq!(cursor_for(Some(Mode::Ne)), CursorShape::SizeNeSw);
        assert_eq!(cursor_for(Some(Mode::Sw)), CursorShape::SizeNeSw);
        assert_eq!(cursor_for(Some(Mode::N)), CursorShape::SizeNs);
        assert_eq!(cursor_for(Some(Mode::E)), CursorShape::SizeWe);
        assert_eq!(cursor_for(Some(Mode::Move)), CursorShape::Fleur);
        assert_eq!(cursor_for(None), CursorShape::Arrow);
    }
}
