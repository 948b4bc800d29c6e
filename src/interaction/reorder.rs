// Reorder controller - drag-and-drop row ordering with order persistence
//
// One controller per list container: the three top-level lists plus one per
// mission's sub-goal list. Controllers hold the container's working order
// and are torn down and rebuilt whenever a snapshot is applied, so no
// instance ever outlives the rows it was built for. The drop handler reads
// back the working order, coerces identifiers to integers, and produces a
// persist request for the API worker; the follow-up reload reconciles the
// display with whatever the server actually stored.

use super::swipe::SwipePanel;
use crate::api::models::RowId;

/// Shared gesture coordination, injected into both controllers at the call
/// sites instead of living in ambient global state. The reorder controller
/// is the only writer; swipe tracking reads it to veto new sessions while a
/// drag is in progress.
#[derive(Debug, Default)]
pub struct DragContext {
    reordering: bool,
}

impl DragContext {
    pub fn is_reordering(&self) -> bool {
        self.reordering
    }

    /// Writer side, owned by the reorder controller's start/end hooks.
    pub(crate) fn begin_reorder(&mut self) {
        self.reordering = true;
    }

    pub(crate) fn end_reorder(&mut self) {
        self.reordering = false;
    }
}

/// Which list container a controller owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReorderTarget {
    Missions,
    Goals,
    Habits,
    /// One mission's nested sub-goal list.
    Subgoals { mission_id: i64 },
}

/// Order-persist request produced when a drag ends. `ids` is the container's
/// full order with non-numeric identifiers already dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderCommit {
    pub target: ReorderTarget,
    pub ids: Vec<i64>,
}

/// Drag-and-drop controller for one list container.
///
/// Plays the role a host drag-and-drop library plays elsewhere: construction
/// is `init`, dropping the value is `destroy`, and `order()` reads the
/// current child order.
#[derive(Debug)]
pub struct ReorderController {
    target: ReorderTarget,
    order: Vec<RowId>,
    /// Order at drag start, restored on cancel.
    initial: Vec<RowId>,
    /// Index of the row currently being dragged.
    drag: Option<usize>,
}

impl ReorderController {
    pub fn new(target: ReorderTarget, order: Vec<RowId>) -> Self {
        Self {
            target,
            initial: order.clone(),
            order,
            drag: None,
        }
    }

    pub fn target(&self) -> ReorderTarget {
        self.target
    }

    /// Current working order of the container.
    pub fn order(&self) -> &[RowId] {
        &self.order
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Index of the row being dragged, while a drag is live.
    pub fn dragged_index(&self) -> Option<usize> {
        self.drag
    }

    /// Pick up the row at `index`. Reorder always wins over swipe: every
    /// revealed row is snapped closed before any drag computation happens,
    /// and the shared dragging flag vetoes new swipe sessions until the drop.
    pub fn start(&mut self, index: usize, ctx: &mut DragContext, swipes: &mut SwipePanel) -> bool {
        if index >= self.order.len() {
            return false;
        }
        swipes.reset_all();
        ctx.begin_reorder();
        self.initial = self.order.clone();
        self.drag = Some(index);
        true
    }

    /// The pointer crossed another row: move the dragged row there.
    pub fn drag_over(&mut self, index: usize) {
        let Some(from) = self.drag else {
            return;
        };
        if index >= self.order.len() || index == from {
            return;
        }
        let row = self.order.remove(from);
        self.order.insert(index, row);
        self.drag = Some(index);
    }

    /// Drop the row. Clears the shared flag, reads back the working order,
    /// and builds the persist request. An order with no numeric identifiers
    /// commits nothing.
    pub fn end(&mut self, ctx: &mut DragContext) -> Option<ReorderCommit> {
        ctx.end_reorder();
        self.drag.take()?;
        let ids: Vec<i64> = self.order.iter().filter_map(RowId::as_int).collect();
        if ids.is_empty() {
            return None;
        }
        Some(ReorderCommit {
            target: self.target,
            ids,
        })
    }

    /// A cancelled drag runs the same cleanup as a drop but commits nothing
    /// and rolls the working order back.
    pub fn cancel(&mut self, ctx: &mut DragContext) {
        ctx.end_reorder();
        if self.drag.take().is_some() {
            self.order = self.initial.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{RowKind, RowRef};
    use crate::interaction::gesture::Point;
    use crate::interaction::swipe::RowZone;

    fn ids(raw: &[&str]) -> Vec<RowId> {
        raw.iter().map(|s| RowId::new(*s)).collect()
    }

    #[test]
    fn dragging_a_below_b_commits_bac() {
        let mut ctx = DragContext::default();
        let mut swipes = SwipePanel::new();
        let mut sorter = ReorderController::new(ReorderTarget::Goals, ids(&["1", "2", "3"]));

        assert!(sorter.start(0, &mut ctx, &mut swipes));
        sorter.drag_over(1);
        let commit = sorter.end(&mut ctx).unwrap();

        assert_eq!(commit.target, ReorderTarget::Goals);
        assert_eq!(commit.ids, vec![2, 1, 3]);
        assert!(!ctx.is_reordering());
    }

    #[test]
    fn commit_is_a_permutation_with_non_numeric_ids_dropped() {
        let mut ctx = DragContext::default();
        let mut swipes = SwipePanel::new();
        let mut sorter =
            ReorderController::new(ReorderTarget::Habits, ids(&["10", "empty-state", "4"]));

        sorter.start(2, &mut ctx, &mut swipes);
        sorter.drag_over(0);
        let commit = sorter.end(&mut ctx).unwrap();
        assert_eq!(commit.ids, vec![4, 10]);
    }

    #[test]
    fn all_non_numeric_order_commits_nothing() {
        let mut ctx = DragContext::default();
        let mut swipes = SwipePanel::new();
        let mut sorter = ReorderController::new(ReorderTarget::Missions, ids(&["a", "b"]));

        sorter.start(0, &mut ctx, &mut swipes);
        sorter.drag_over(1);
        assert_eq!(sorter.end(&mut ctx), None);
        assert!(!ctx.is_reordering());
    }

    #[test]
    fn start_resets_all_swipe_state_first() {
        let mut ctx = DragContext::default();
        let mut swipes = SwipePanel::new();
        let open = RowRef::new(RowKind::Goal, 2);
        assert!(swipes.begin(
            open.clone(),
            RowZone::Content,
            Point::new(100.0, 0.0),
            &ctx
        ));
        let _ = swipes.update(&open, Point::new(40.0, 0.0));
        swipes.end(&open);
        assert!(swipes.is_open(&open));

        let mut sorter = ReorderController::new(ReorderTarget::Goals, ids(&["1", "2", "3"]));
        sorter.start(1, &mut ctx, &mut swipes);

        assert!(!swipes.is_open(&open));
        assert_eq!(swipes.offset(&open), 0.0);
        assert!(ctx.is_reordering());
        sorter.cancel(&mut ctx);
    }

    #[test]
    fn cancel_restores_order_and_clears_the_flag() {
        let mut ctx = DragContext::default();
        let mut swipes = SwipePanel::new();
        let mut sorter = ReorderController::new(ReorderTarget::Missions, ids(&["1", "2", "3"]));

        sorter.start(0, &mut ctx, &mut swipes);
        sorter.drag_over(2);
        assert_eq!(sorter.order(), ids(&["2", "3", "1"]).as_slice());

        sorter.cancel(&mut ctx);
        assert_eq!(sorter.order(), ids(&["1", "2", "3"]).as_slice());
        assert!(!ctx.is_reordering());
        assert!(!sorter.is_dragging());
    }

    #[test]
    fn subgoal_container_is_scoped_to_its_mission() {
        let mut ctx = DragContext::default();
        let mut swipes = SwipePanel::new();
        let target = ReorderTarget::Subgoals { mission_id: 12 };
        let mut sorter = ReorderController::new(target, ids(&["5", "6"]));

        sorter.start(1, &mut ctx, &mut swipes);
        sorter.drag_over(0);
        let commit = sorter.end(&mut ctx).unwrap();
        assert_eq!(commit.target, ReorderTarget::Subgoals { mission_id: 12 });
        assert_eq!(commit.ids, vec![6, 5]);
    }

    #[test]
    fn out_of_range_start_is_refused() {
        let mut ctx = DragContext::default();
        let mut swipes = SwipePanel::new();
        let mut sorter = ReorderController::new(ReorderTarget::Goals, ids(&["1"]));
        assert!(!sorter.start(3, &mut ctx, &mut swipes));
        assert!(!ctx.is_reordering());
    }
}
