// Gesture tracker - turns pointer positions into a bounded row offset
//
// Everything here works in logical pixels, independent of the input device.
// The TUI layer converts terminal cells to logical pixels before calling in
// (8 px per column, 16 px per row). A session lives for exactly one gesture:
// created on pointer-down, updated on every move, consumed on release or
// cancel.

/// Fixed reveal width: maximum horizontal travel of a row, in logical pixels.
pub const REVEAL_WIDTH: f32 = 72.0;

/// Offsets at or past half the reveal width count as swiped.
pub const SNAP_THRESHOLD: f32 = -(REVEAL_WIDTH / 2.0);

/// Movement under this distance on both axes is treated as jitter and never
/// claims the pointer.
const INTENT_DISTANCE: f32 = 8.0;

/// Horizontal movement must exceed vertical by this factor before the swipe
/// wins over vertical scrolling.
const AXIS_BIAS: f32 = 1.2;

/// A pointer position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Clamp a raw offset to the allowed travel range `[-REVEAL_WIDTH, 0]`.
pub fn clamp_offset(raw: f32) -> f32 {
    raw.clamp(-REVEAL_WIDTH, 0.0)
}

/// Whether an offset counts as swiped (delete action revealed).
pub fn is_swiped(offset: f32) -> bool {
    offset <= SNAP_THRESHOLD
}

/// Rest position a row snaps to when a gesture ends. There is no
/// intermediate rest state: open or closed, nothing between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snap {
    /// Fully revealed at `-REVEAL_WIDTH`.
    Open,
    /// Back at zero.
    Closed,
}

impl Snap {
    pub fn offset(self) -> f32 {
        match self {
            Snap::Open => -REVEAL_WIDTH,
            Snap::Closed => 0.0,
        }
    }
}

/// Rest position for a released offset.
pub fn snap_for(offset: f32) -> Snap {
    if is_swiped(offset) {
        Snap::Open
    } else {
        Snap::Closed
    }
}

/// Result of feeding one move event to a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeMove {
    /// Working offset, already clamped.
    pub offset: f32,
    /// True when the gesture claims the pointer: movement is predominantly
    /// horizontal, so the caller must suppress vertical list scrolling for
    /// this event (the preventDefault analogue).
    pub claims_pointer: bool,
}

/// One in-flight drag session for a single row.
#[derive(Debug, Clone, Copy)]
pub struct SwipeTracker {
    origin: Point,
    start_left: f32,
    last_offset: f32,
}

impl SwipeTracker {
    /// Start a session at `origin`, with the row resting at `start_left`.
    pub fn begin(origin: Point, start_left: f32) -> Self {
        Self {
            origin,
            start_left,
            last_offset: clamp_offset(start_left),
        }
    }

    /// Feed a move event, producing the new working offset.
    pub fn update(&mut self, pos: Point) -> SwipeMove {
        let dx = pos.x - self.origin.x;
        let dy = pos.y - self.origin.y;

        let past_jitter = dx.abs() > INTENT_DISTANCE || dy.abs() > INTENT_DISTANCE;
        let claims_pointer = past_jitter && dx.abs() > dy.abs() * AXIS_BIAS;

        let offset = clamp_offset(self.start_left + dx);
        self.last_offset = offset;

        SwipeMove {
            offset,
            claims_pointer,
        }
    }

    /// Consume the session on release or cancel, yielding the rest position.
    pub fn finish(self) -> Snap {
        snap_for(self.last_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(start_left: f32, dx: f32, dy: f32) -> SwipeMove {
        let mut t = SwipeTracker::begin(Point::new(100.0, 50.0), start_left);
        t.update(Point::new(100.0 + dx, 50.0 + dy))
    }

    #[test]
    fn offset_is_always_clamped() {
        for d in [-10_000.0, -500.0, -73.0, -72.0, -10.0, 0.0, 5.0, 300.0] {
            let m = drag(0.0, d, 0.0);
            assert!(m.offset >= -REVEAL_WIDTH && m.offset <= 0.0, "d={d}");
        }
    }

    #[test]
    fn start_left_is_carried_into_the_session() {
        // Row already open by -72: dragging right 40px lands at -32.
        let m = drag(-72.0, 40.0, 0.0);
        assert_eq!(m.offset, -32.0);
    }

    #[test]
    fn small_movement_never_claims_the_pointer() {
        assert!(!drag(0.0, -8.0, 0.0).claims_pointer);
        assert!(!drag(0.0, -5.0, 3.0).claims_pointer);
    }

    #[test]
    fn horizontal_movement_claims_the_pointer() {
        assert!(drag(0.0, -40.0, 10.0).claims_pointer);
        assert!(drag(0.0, 40.0, 10.0).claims_pointer);
    }

    #[test]
    fn predominantly_vertical_movement_scrolls_instead() {
        // |dx| must exceed 1.2 * |dy| to win
        assert!(!drag(0.0, -12.0, 10.0).claims_pointer);
        assert!(drag(0.0, -13.0, 10.0).claims_pointer);
    }

    #[test]
    fn snap_is_binary_at_half_reveal() {
        assert_eq!(snap_for(-35.9), Snap::Closed);
        assert_eq!(snap_for(-36.0), Snap::Open);
        assert_eq!(snap_for(-72.0), Snap::Open);
        assert_eq!(snap_for(0.0), Snap::Closed);
    }

    #[test]
    fn finish_snaps_from_the_last_offset() {
        let mut t = SwipeTracker::begin(Point::new(0.0, 0.0), 0.0);
        t.update(Point::new(-50.0, 0.0));
        assert_eq!(t.finish(), Snap::Open);

        let mut t = SwipeTracker::begin(Point::new(0.0, 0.0), 0.0);
        t.update(Point::new(-20.0, 0.0));
        assert_eq!(t.finish(), Snap::Closed);
    }
}
