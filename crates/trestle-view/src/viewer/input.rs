use super::ui::{Point2, Rect, Vec2};

#[derive(Clone, Copy, Debug, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

/// Per-frame pointer state for the 3D viewport, decoupled from the UI toolkit.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewerInput {
    pub rect: Rect,
    pub pointer_pos: Option<Point2>,
    pub pointer_delta: Vec2,
    /// Primary button went down this frame.
    pub primary_pressed: bool,
    pub secondary_down: bool,
    pub middle_down: bool,
    pub scroll_delta: f32,
    pub modifiers: Modifiers,
    pub hovered: bool,
}

impl ViewerInput {
    /// Position of a primary press inside the viewport, if one happened.
    pub fn primary_press_pos(&self) -> Option<Point2> {
        if !self.primary_pressed || !self.hovered {
            return None;
        }
        self.pointer_pos.filter(|pos| self.rect.contains(*pos))
    }
}
