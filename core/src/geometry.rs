use crate::models::NoteRecord;

/// Minimum usable note size enforced by clamping.
pub const MIN_NOTE_WIDTH: f64 = 120.0;
pub const MIN_NOTE_HEIGHT: f64 = 60.0;

/// How much of a window must remain inside the virtual screen so it can
/// still be grabbed with the mouse.
pub const VISIBLE_MARGIN: f64 = 40.0;

/// Height a collapsed note's window displays at (title bar only).
pub const COLLAPSED_HEIGHT: f64 = 30.0;

/// Upper bounds applied by normalize-all.
pub const MAX_NORMALIZED_WIDTH: f64 = 400.0;
pub const MAX_NORMALIZED_HEIGHT: f64 = 300.0;

/// Combined visible area of all connected monitors, in screen coordinates.
///
/// Supplied by the windowing layer; the core never computes this itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ScreenBounds {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Constrain a note's geometry so the window stays usable and reachable.
///
/// Enforces the minimum size, then clamps the position so at least
/// `VISIBLE_MARGIN` of the window stays inside `bounds`. The min-bound
/// checks run last, so under degenerate bounds a too-far-left position
/// wins over a too-far-right one.
pub fn clamp_to_screen(note: &mut NoteRecord, bounds: ScreenBounds) {
    if note.width < MIN_NOTE_WIDTH {
        note.width = MIN_NOTE_WIDTH;
    }
    if note.height < MIN_NOTE_HEIGHT {
        note.height = MIN_NOTE_HEIGHT;
    }

    let max_x = bounds.right - VISIBLE_MARGIN;
    let max_y = bounds.bottom - VISIBLE_MARGIN;
    let min_x = bounds.left;
    let min_y = bounds.top;

    if note.x > max_x {
        note.x = max_x;
    }
    if note.y > max_y {
        note.y = max_y;
    }
    if note.x < min_x {
        note.x = min_x;
    }
    if note.y < min_y {
        note.y = min_y;
    }
}
