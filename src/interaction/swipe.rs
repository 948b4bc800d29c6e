// Swipe-delete controller
//
// Holds the per-row swipe state for the whole board and runs the gesture
// lifecycle: begin on pointer-down, update on moves, binary snap on release.
// A fully revealed row exposes its delete action; committing the delete is
// the app's job (it goes through the API worker), this module only owns the
// visual offsets.

use std::collections::HashMap;

use super::gesture::{self, Point, Snap, SwipeMove, SwipeTracker};
use super::reorder::DragContext;
use crate::api::models::RowRef;

/// Interactive zones inside a row. Gestures that start on an action control
/// must not begin a swipe session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowZone {
    Content,
    DragHandle,
    Checkbox,
    DeleteButton,
    /// Habit increment/decrement buttons.
    HabitStep,
}

impl RowZone {
    pub fn blocks_swipe(self) -> bool {
        !matches!(self, RowZone::Content)
    }
}

#[derive(Debug, Default)]
struct RowSwipe {
    offset: f32,
    session: Option<SwipeTracker>,
}

/// Per-row swipe state for every rendered row.
#[derive(Debug, Default)]
pub struct SwipePanel {
    rows: HashMap<RowRef, RowSwipe>,
}

impl SwipePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a swipe session. Refused while a reorder drag is in progress,
    /// when the gesture starts on an action control, or for kinds that are
    /// not swipe-deletable. Starting a swipe on one row closes any other
    /// open row (single-open-row policy).
    pub fn begin(&mut self, row: RowRef, zone: RowZone, origin: Point, ctx: &DragContext) -> bool {
        if ctx.is_reordering() || zone.blocks_swipe() || !row.kind.swipeable() {
            return false;
        }

        self.close_others(&row);

        let entry = self.rows.entry(row).or_default();
        // A start while a session is live for the same row replaces it;
        // pointer devices serialize events per row, so nothing is lost.
        entry.session = Some(SwipeTracker::begin(origin, entry.offset));
        true
    }

    /// Feed a move event to the row's live session, if any.
    pub fn update(&mut self, row: &RowRef, pos: Point) -> Option<SwipeMove> {
        let entry = self.rows.get_mut(row)?;
        let session = entry.session.as_mut()?;
        let m = session.update(pos);
        entry.offset = m.offset;
        Some(m)
    }

    /// End the row's gesture and snap to a rest position. Idempotent: a row
    /// with no live session keeps its current snap.
    pub fn end(&mut self, row: &RowRef) -> Snap {
        let Some(entry) = self.rows.get_mut(row) else {
            return Snap::Closed;
        };
        let snap = match entry.session.take() {
            Some(session) => session.finish(),
            None => gesture::snap_for(entry.offset),
        };
        entry.offset = snap.offset();
        snap
    }

    /// Cancelled gestures run exactly the same cleanup as a normal end, so
    /// no row is ever left mid-swipe.
    pub fn cancel(&mut self, row: &RowRef) -> Snap {
        self.end(row)
    }

    /// Snap every row closed and drop all live sessions. Called before any
    /// reorder drag computation, and after a successful reload.
    pub fn reset_all(&mut self) {
        self.rows.clear();
    }

    /// Current offset of a row, in logical pixels.
    pub fn offset(&self, row: &RowRef) -> f32 {
        self.rows.get(row).map(|r| r.offset).unwrap_or(0.0)
    }

    /// Whether the row's delete action is revealed.
    pub fn is_open(&self, row: &RowRef) -> bool {
        gesture::is_swiped(self.offset(row))
    }

    /// Whether any session is live right now.
    pub fn is_tracking(&self) -> bool {
        self.rows.values().any(|r| r.session.is_some())
    }

    /// Snap a row fully open without a pointer gesture (keyboard path).
    pub fn open(&mut self, row: RowRef) {
        self.close_others(&row);
        let entry = self.rows.entry(row).or_default();
        entry.session = None;
        entry.offset = Snap::Open.offset();
    }

    fn close_others(&mut self, keep: &RowRef) {
        self.rows.retain(|row, _| row == keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::RowKind;
    use crate::interaction::gesture::REVEAL_WIDTH;

    fn habit(id: i64) -> RowRef {
        RowRef::new(RowKind::Habit, id)
    }

    fn swipe_left(panel: &mut SwipePanel, row: &RowRef, px: f32) {
        assert!(panel.begin(
            row.clone(),
            RowZone::Content,
            Point::new(200.0, 80.0),
            &DragContext::default(),
        ));
        let _ = panel.update(row, Point::new(200.0 - px, 80.0));
    }

    #[test]
    fn fifty_px_swipe_snaps_open() {
        let mut panel = SwipePanel::new();
        let row = habit(42);
        swipe_left(&mut panel, &row, 50.0);
        assert_eq!(panel.end(&row), Snap::Open);
        assert_eq!(panel.offset(&row), -REVEAL_WIDTH);
        assert!(panel.is_open(&row));
    }

    #[test]
    fn twenty_px_swipe_snaps_back() {
        let mut panel = SwipePanel::new();
        let row = habit(42);
        swipe_left(&mut panel, &row, 20.0);
        assert_eq!(panel.end(&row), Snap::Closed);
        assert_eq!(panel.offset(&row), 0.0);
        assert!(!panel.is_open(&row));
    }

    #[test]
    fn ending_an_already_snapped_row_changes_nothing() {
        let mut panel = SwipePanel::new();
        let row = habit(1);
        swipe_left(&mut panel, &row, 60.0);
        panel.end(&row);
        // No live session: ending again keeps the open snap.
        assert_eq!(panel.end(&row), Snap::Open);
        assert_eq!(panel.offset(&row), -REVEAL_WIDTH);
    }

    #[test]
    fn action_controls_never_start_a_session() {
        let mut panel = SwipePanel::new();
        let ctx = DragContext::default();
        for zone in [
            RowZone::DragHandle,
            RowZone::Checkbox,
            RowZone::DeleteButton,
            RowZone::HabitStep,
        ] {
            assert!(!panel.begin(habit(1), zone, Point::new(0.0, 0.0), &ctx));
        }
        assert!(!panel.is_tracking());
    }

    #[test]
    fn subgoal_rows_are_not_swipeable() {
        let mut panel = SwipePanel::new();
        let row = RowRef::new(RowKind::Subgoal, 9);
        assert!(!panel.begin(
            row,
            RowZone::Content,
            Point::new(0.0, 0.0),
            &DragContext::default(),
        ));
    }

    #[test]
    fn swipes_are_vetoed_while_reordering() {
        let mut panel = SwipePanel::new();
        let mut ctx = DragContext::default();
        ctx.begin_reorder();
        assert!(!panel.begin(habit(1), RowZone::Content, Point::new(0.0, 0.0), &ctx));
        ctx.end_reorder();
        assert!(panel.begin(habit(1), RowZone::Content, Point::new(0.0, 0.0), &ctx));
    }

    #[test]
    fn opening_one_row_closes_the_previous_one() {
        let mut panel = SwipePanel::new();
        let first = habit(1);
        let second = habit(2);
        swipe_left(&mut panel, &first, 60.0);
        panel.end(&first);
        assert!(panel.is_open(&first));

        swipe_left(&mut panel, &second, 60.0);
        assert!(!panel.is_open(&first));
        assert_eq!(panel.offset(&first), 0.0);
    }

    #[test]
    fn cancel_runs_the_same_cleanup_as_end() {
        let mut panel = SwipePanel::new();
        let row = habit(5);
        swipe_left(&mut panel, &row, 20.0);
        assert_eq!(panel.cancel(&row), Snap::Closed);
        assert!(!panel.is_tracking());
        assert_eq!(panel.offset(&row), 0.0);
    }

    #[test]
    fn reset_all_closes_everything() {
        let mut panel = SwipePanel::new();
        let row = habit(3);
        swipe_left(&mut panel, &row, 60.0);
        panel.end(&row);
        panel.reset_all();
        assert_eq!(panel.offset(&row), 0.0);
        assert!(!panel.is_open(&row));
        assert!(!panel.is_tracking());
    }
}
