//! A single rectangular cut-out and its drag state machine.

use crate::geometry::{self, Mode, Rect};

/// Interaction state of one focus area. A press transitions out of `Idle`,
/// so two gestures can never interleave on the same area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    Dragging { mode: Mode, anchor: (f32, f32) },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusArea {
    bounds: Rect,
    interaction: Interaction,
}

impl FocusArea {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            interaction: Interaction::Idle,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Position of the violet move handle, derived from the current bounds.
    pub fn handle_center(&self) -> (f32, f32) {
        geometry::handle_center(&self.bounds)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging { .. })
    }

    pub fn drag_mode(&self) -> Option<Mode> {
        match self.interaction {
            Interaction::Dragging { mode, .. } => Some(mode),
            Interaction::Idle => None,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        self.bounds.contains(px, py)
    }

    pub fn hit_handle(&self, px: f32, py: f32) -> bool {
        geometry::in_handle_band(&self.bounds, px, py)
    }

    pub fn classify(&self, px: f32, py: f32) -> Mode {
        geometry::classify(&self.bounds, px, py)
    }

    /// Press on the body or an edge: classify the point and start dragging.
    pub fn press(&mut self, px: f32, py: f32) {
        if matches!(self.interaction, Interaction::Idle) {
            self.interaction = Interaction::Dragging {
                mode: self.classify(px, py),
                anchor: (px, py),
            };
        }
    }

    /// Press on the move handle always starts a move drag.
    pub fn press_handle(&mut self, px: f32, py: f32) {
        if matches!(self.interaction, Interaction::Idle) {
            self.interaction = Interaction::Dragging {
                mode: Mode::Move,
                anchor: (px, py),
            };
        }
    }

    /// Advance an active drag. Move translates the bounds and re-anchors.
    /// Resize commits only when the minimum size holds; a rejected step
    /// leaves both the bounds and the anchor untouched.
    pub fn drag(&mut self, px: f32, py: f32) {
        let Interaction::Dragging { mode, anchor } = self.interaction else {
            return;
        };

        match mode {
            Mode::Move => {
                self.bounds = self.bounds.translated(px - anchor.0, py - anchor.1);
                self.interaction = Interaction::Dragging {
                    mode,
                    anchor: (px, py),
                };
            }
            resize_mode => {
                if let Some(next) = geometry::resize(&self.bounds, resize_mode, px, py) {
                    self.bounds = next;
                    self.interaction = Interaction::Dragging {
                        mode,
                        anchor: (px, py),
                    };
                }
            }
        }
    }

    pub fn release(&mut self) {
        self.interaction = Interaction::Idle;
    }
}
