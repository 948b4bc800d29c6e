// Application state
//
// Owns the board snapshot, the gesture controllers, and the hit-test layout
// the renderer fills in every frame. All mutations go out as ApiCommands;
// the worker answers with UiEvents, and the next snapshot supersedes every
// provisional local state.

use std::ops::Range;

use tokio::sync::mpsc;

use super::components::toast::Toast;
use super::input::KeyTracker;
use crate::api::models::{RowKind, RowRef, Snapshot};
use crate::interaction::{DragContext, ReorderController, ReorderTarget, RowZone, SwipePanel};
use crate::logging::LogBuffer;
use crate::theme::Theme;
use crate::worker::{ApiCommand, UiEvent};

/// Top-level list tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Missions,
    Goals,
    Habits,
}

impl Tab {
    pub fn all() -> [Tab; 3] {
        [Tab::Missions, Tab::Goals, Tab::Habits]
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Missions => "Missions",
            Tab::Goals => "Goals",
            Tab::Habits => "Habits",
        }
    }

    pub fn next(self) -> Tab {
        match self {
            Tab::Missions => Tab::Goals,
            Tab::Goals => Tab::Habits,
            Tab::Habits => Tab::Missions,
        }
    }

    pub fn prev(self) -> Tab {
        match self {
            Tab::Missions => Tab::Habits,
            Tab::Goals => Tab::Missions,
            Tab::Habits => Tab::Goals,
        }
    }
}

/// Leading marker of a row: a completion checkbox or a habit counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMarker {
    Done(bool),
    Counter { count: i64, streak: i64 },
}

/// One rendered line of the active tab, flattened: mission rows are followed
/// by their indented sub-goal rows.
#[derive(Debug, Clone)]
pub struct RowLine {
    pub row: RowRef,
    /// Container this line belongs to for reordering.
    pub target: ReorderTarget,
    /// Index within that container.
    pub index: usize,
    pub depth: u8,
    pub title: String,
    pub marker: RowMarker,
    pub meta: Option<String>,
}

/// Which interactive zone of a row a pointer event landed on. Richer than
/// `RowZone` because the renderer knows which habit button is which.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    Handle,
    Checkbox,
    HabitDec,
    HabitInc,
    Delete,
    Content,
}

impl HitZone {
    fn row_zone(self) -> RowZone {
        match self {
            HitZone::Handle => RowZone::DragHandle,
            HitZone::Checkbox => RowZone::Checkbox,
            HitZone::HabitDec | HitZone::HabitInc => RowZone::HabitStep,
            HitZone::Delete => RowZone::DeleteButton,
            HitZone::Content => RowZone::Content,
        }
    }
}

/// Hit-test record for one rendered row, filled in by the renderer.
#[derive(Debug, Clone)]
pub struct RowHit {
    pub y: u16,
    /// Index into `App::rows`.
    pub line: usize,
    /// Column spans of the row's zones, covering its full width.
    pub zones: Vec<(HitZone, Range<u16>)>,
}

/// Last frame's hit-test layout.
#[derive(Debug, Default)]
pub struct FrameLayout {
    pub rows: Vec<RowHit>,
}

/// Where an in-flight pointer gesture is routed.
#[derive(Debug, Clone)]
enum PointerRoute {
    Swipe { row: RowRef },
    Reorder { target: ReorderTarget },
}

pub struct App {
    pub snapshot: Snapshot,
    pub tab: Tab,
    /// Flattened rows of the active tab, in working order.
    pub rows: Vec<RowLine>,
    pub selected: usize,
    pub scroll_offset: usize,

    pub swipes: SwipePanel,
    pub drag_ctx: DragContext,
    sorters: Vec<ReorderController>,
    route: Option<PointerRoute>,

    pub toast: Option<Toast>,
    pub log_buffer: LogBuffer,
    pub show_logs: bool,
    pub loading: bool,
    pub should_quit: bool,
    pub theme: Theme,
    /// Status bar label for the data source ("demo" or the base URL).
    pub source_label: String,
    pub layout: FrameLayout,
    pub keys: KeyTracker,

    commands: mpsc::Sender<ApiCommand>,
}

impl App {
    pub fn new(
        commands: mpsc::Sender<ApiCommand>,
        log_buffer: LogBuffer,
        theme: Theme,
        source_label: String,
    ) -> Self {
        Self {
            snapshot: Snapshot::default(),
            tab: Tab::Missions,
            rows: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            swipes: SwipePanel::new(),
            drag_ctx: DragContext::default(),
            sorters: Vec::new(),
            route: None,
            toast: None,
            log_buffer,
            show_logs: false,
            loading: true,
            should_quit: false,
            theme,
            source_label,
            layout: FrameLayout::default(),
            keys: KeyTracker::board_defaults(),
            commands,
        }
    }

    // ----- worker plumbing ---------------------------------------------

    fn send(&self, cmd: ApiCommand) {
        if let Err(e) = self.commands.try_send(cmd) {
            tracing::warn!(error = %e, "command channel full, dropping command");
        }
    }

    pub fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            UiEvent::LoadFailed(message) => {
                self.loading = false;
                self.toast = Some(Toast::error(format!("Reload failed: {message}")));
            }
            UiEvent::DeleteFailed { kind, message } => {
                // The one mutation with no follow-up reload, so the loading
                // flag must be cleared here; the row stays revealed.
                tracing::debug!(%kind, "delete rejected, row stays revealed");
                self.loading = false;
                self.toast = Some(Toast::error(message));
            }
            UiEvent::Notice(message) => {
                self.toast = Some(Toast::info(message));
            }
        }
    }

    /// Replace the board state. Every controller is torn down and rebuilt on
    /// the new rows; all swipe offsets reset to closed.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.cancel_gestures();
        self.snapshot = snapshot;
        self.loading = false;
        self.swipes.reset_all();
        self.rebuild_sorters();
        self.rebuild_rows();
        self.clamp_selection();
    }

    pub fn request_reload(&mut self) {
        self.loading = true;
        self.send(ApiCommand::Reload);
    }

    fn request_delete(&mut self, row: RowRef) {
        self.loading = true;
        self.send(ApiCommand::Delete {
            kind: row.kind,
            id: row.id,
        });
    }

    // ----- derived state -----------------------------------------------

    fn rebuild_sorters(&mut self) {
        let mut sorters = vec![
            ReorderController::new(
                ReorderTarget::Missions,
                self.snapshot.missions.iter().map(|m| m.id.into()).collect(),
            ),
            ReorderController::new(
                ReorderTarget::Goals,
                self.snapshot.goals.iter().map(|g| g.id.into()).collect(),
            ),
            ReorderController::new(
                ReorderTarget::Habits,
                self.snapshot.habits.iter().map(|h| h.id.into()).collect(),
            ),
        ];
        for mission in &self.snapshot.missions {
            sorters.push(ReorderController::new(
                ReorderTarget::Subgoals {
                    mission_id: mission.id,
                },
                self.snapshot
                    .subgoals_of(mission.id)
                    .iter()
                    .map(|s| s.id.into())
                    .collect(),
            ));
        }
        self.sorters = sorters;
    }

    fn sorter(&self, target: ReorderTarget) -> Option<&ReorderController> {
        self.sorters.iter().find(|s| s.target() == target)
    }

    fn sorter_index(&self, target: ReorderTarget) -> Option<usize> {
        self.sorters.iter().position(|s| s.target() == target)
    }

    /// Flatten the active tab into display rows, following each container's
    /// working order so an in-flight drag is visible immediately.
    fn rebuild_rows(&mut self) {
        let mut rows = Vec::new();
        match self.tab {
            Tab::Missions => {
                let order: Vec<i64> = self.container_order(ReorderTarget::Missions);
                for (i, id) in order.iter().enumerate() {
                    let Some(m) = self.snapshot.missions.iter().find(|m| m.id == *id) else {
                        continue;
                    };
                    rows.push(RowLine {
                        row: RowRef::new(RowKind::Mission, m.id),
                        target: ReorderTarget::Missions,
                        index: i,
                        depth: 0,
                        title: m.title.clone(),
                        marker: RowMarker::Done(m.is_completed),
                        meta: m.deadline.clone(),
                    });
                    let target = ReorderTarget::Subgoals { mission_id: m.id };
                    let sub_order = self.container_order(target);
                    for (j, sid) in sub_order.iter().enumerate() {
                        let Some(s) = self
                            .snapshot
                            .subgoals_of(m.id)
                            .iter()
                            .find(|s| s.id == *sid)
                        else {
                            continue;
                        };
                        rows.push(RowLine {
                            row: RowRef::new(RowKind::Subgoal, s.id),
                            target,
                            index: j,
                            depth: 1,
                            title: s.title.clone(),
                            marker: RowMarker::Done(s.is_completed),
                            meta: None,
                        });
                    }
                }
            }
            Tab::Goals => {
                for (i, id) in self.container_order(ReorderTarget::Goals).iter().enumerate() {
                    let Some(g) = self.snapshot.goals.iter().find(|g| g.id == *id) else {
                        continue;
                    };
                    let priority = match g.priority {
                        3 => Some("high".to_string()),
                        2 => Some("med".to_string()),
                        1 => Some("low".to_string()),
                        _ => None,
                    };
                    rows.push(RowLine {
                        row: RowRef::new(RowKind::Goal, g.id),
                        target: ReorderTarget::Goals,
                        index: i,
                        depth: 0,
                        title: g.title.clone(),
                        marker: RowMarker::Done(g.is_completed),
                        meta: priority,
                    });
                }
            }
            Tab::Habits => {
                for (i, id) in self.container_order(ReorderTarget::Habits).iter().enumerate() {
                    let Some(h) = self.snapshot.habits.iter().find(|h| h.id == *id) else {
                        continue;
                    };
                    rows.push(RowLine {
                        row: RowRef::new(RowKind::Habit, h.id),
                        target: ReorderTarget::Habits,
                        index: i,
                        depth: 0,
                        title: h.title.clone(),
                        marker: RowMarker::Counter {
                            count: h.today_count,
                            streak: h.streak,
                        },
                        meta: None,
                    });
                }
            }
        }
        self.rows = rows;
    }

    fn container_order(&self, target: ReorderTarget) -> Vec<i64> {
        self.sorter(target)
            .map(|s| s.order().iter().filter_map(|id| id.as_int()).collect())
            .unwrap_or_default()
    }

    /// Line currently being dragged, if a reorder is live.
    pub fn dragged_line(&self) -> Option<usize> {
        let PointerRoute::Reorder { target } = self.route.as_ref()? else {
            return None;
        };
        let dragged = self.sorter(*target)?.dragged_index()?;
        self.rows
            .iter()
            .position(|line| line.target == *target && line.index == dragged)
    }

    // ----- tabs and selection ------------------------------------------

    pub fn set_tab(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }
        self.cancel_gestures();
        self.swipes.reset_all();
        self.tab = tab;
        self.selected = 0;
        self.scroll_offset = 0;
        self.rebuild_rows();
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }

    /// Keep the selected row inside the list viewport.
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    pub fn selected_line(&self) -> Option<&RowLine> {
        self.rows.get(self.selected)
    }

    // ----- keyboard actions ---------------------------------------------

    /// Toggle completion of the selected row (Space).
    pub fn toggle_selected(&mut self) {
        let Some(line) = self.selected_line() else {
            return;
        };
        let RowMarker::Done(done) = line.marker else {
            return;
        };
        let Some(id) = line.row.id.as_int() else {
            return;
        };
        let kind = line.row.kind;
        self.loading = true;
        self.send(ApiCommand::SetDone {
            kind,
            id,
            done: !done,
        });
    }

    /// Step the selected habit counter (+ / -).
    pub fn step_selected(&mut self, delta: i32) {
        let Some(line) = self.selected_line() else {
            return;
        };
        if !matches!(line.marker, RowMarker::Counter { .. }) {
            return;
        }
        let Some(id) = line.row.id.as_int() else {
            return;
        };
        self.loading = true;
        self.send(ApiCommand::StepHabit { id, delta });
    }

    /// First press reveals the delete action, second press commits it (d).
    pub fn delete_or_reveal_selected(&mut self) {
        let Some(line) = self.selected_line() else {
            return;
        };
        let row = line.row.clone();
        if !row.kind.swipeable() {
            return;
        }
        if self.swipes.is_open(&row) {
            self.request_delete(row);
        } else {
            self.swipes.open(row);
        }
    }

    /// Escape: cancel a live drag, otherwise snap every revealed row closed.
    pub fn escape(&mut self) {
        if self.route.is_some() {
            self.cancel_gestures();
        } else {
            self.swipes.reset_all();
        }
    }

    // ----- pointer routing -----------------------------------------------

    fn hit_at(&self, column: u16, y: u16) -> Option<(usize, HitZone)> {
        let hit = self.layout.rows.iter().find(|h| h.y == y)?;
        let zone = hit
            .zones
            .iter()
            .find(|(_, range)| range.contains(&column))
            .map(|(zone, _)| *zone)?;
        Some((hit.line, zone))
    }

    pub fn pointer_down(&mut self, column: u16, y: u16) {
        // A press that lands outside every row leaves revealed rows alone.
        let Some((line_idx, zone)) = self.hit_at(column, y) else {
            return;
        };
        let Some(line) = self.rows.get(line_idx) else {
            return;
        };
        let row = line.row.clone();
        let target = line.target;
        let index = line.index;
        self.selected = line_idx;

        match zone {
            HitZone::Handle => {
                let Some(i) = self.sorter_index(target) else {
                    return;
                };
                if self.sorters[i].start(index, &mut self.drag_ctx, &mut self.swipes) {
                    self.route = Some(PointerRoute::Reorder { target });
                }
            }
            HitZone::Delete => {
                if self.swipes.is_open(&row) {
                    self.request_delete(row);
                }
            }
            HitZone::Checkbox => self.toggle_selected(),
            HitZone::HabitInc => self.step_selected(1),
            HitZone::HabitDec => self.step_selected(-1),
            HitZone::Content => {
                let origin = super::cell_point(column, y);
                if self
                    .swipes
                    .begin(row.clone(), zone.row_zone(), origin, &self.drag_ctx)
                {
                    self.route = Some(PointerRoute::Swipe { row });
                }
            }
        }
    }

    pub fn pointer_drag(&mut self, column: u16, y: u16) {
        match self.route.clone() {
            Some(PointerRoute::Swipe { row }) => {
                // No default scroll to suppress here, so the claim result
                // of the move is not needed.
                let _ = self.swipes.update(&row, super::cell_point(column, y));
            }
            Some(PointerRoute::Reorder { target }) => {
                let Some((line_idx, _)) = self.hit_at(column, y) else {
                    return;
                };
                let Some(line) = self.rows.get(line_idx) else {
                    return;
                };
                // Dragging only reorders within the row's own container.
                if line.target != target {
                    return;
                }
                let index = line.index;
                if let Some(i) = self.sorter_index(target) {
                    self.sorters[i].drag_over(index);
                    self.rebuild_rows();
                }
            }
            None => {}
        }
    }

    pub fn pointer_up(&mut self) {
        match self.route.take() {
            Some(PointerRoute::Swipe { row }) => {
                self.swipes.end(&row);
            }
            Some(PointerRoute::Reorder { target }) => {
                if let Some(i) = self.sorter_index(target) {
                    if let Some(commit) = self.sorters[i].end(&mut self.drag_ctx) {
                        self.loading = true;
                        self.send(ApiCommand::PersistOrder(commit));
                    }
                }
                self.rebuild_rows();
            }
            None => {}
        }
    }

    /// Terminal lost focus, or the gesture was otherwise interrupted.
    pub fn cancel_gestures(&mut self) {
        match self.route.take() {
            Some(PointerRoute::Swipe { row }) => {
                self.swipes.cancel(&row);
            }
            Some(PointerRoute::Reorder { target }) => {
                if let Some(i) = self.sorter_index(target) {
                    self.sorters[i].cancel(&mut self.drag_ctx);
                }
                self.rebuild_rows();
            }
            None => {}
        }
    }

    /// Per-frame housekeeping.
    pub fn tick(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::DemoStore;

    fn app_with_board() -> (App, mpsc::Receiver<ApiCommand>) {
        let (tx, rx) = mpsc::channel(16);
        let mut app = App::new(tx, LogBuffer::new(), Theme::dark(), "demo".into());
        app.apply_snapshot(DemoStore::seeded().snapshot());
        (app, rx)
    }

    /// Layout stub: one row per line, zones spanning [0, 4) handle and
    /// [4, 80) content.
    fn lay_out_rows(app: &mut App) {
        app.layout.rows = app
            .rows
            .iter()
            .enumerate()
            .map(|(i, _)| RowHit {
                y: i as u16,
                line: i,
                zones: vec![(HitZone::Handle, 0..4), (HitZone::Content, 4..80)],
            })
            .collect();
    }

    #[test]
    fn missions_tab_interleaves_subgoal_rows() {
        let (app, _rx) = app_with_board();
        let kinds: Vec<RowKind> = app.rows.iter().map(|l| l.row.kind).collect();
        // Mission 1 has two sub-goals, mission 2 none.
        assert_eq!(
            kinds,
            vec![
                RowKind::Mission,
                RowKind::Subgoal,
                RowKind::Subgoal,
                RowKind::Mission
            ]
        );
        assert_eq!(app.rows[1].depth, 1);
        assert_eq!(
            app.rows[1].target,
            ReorderTarget::Subgoals { mission_id: 1 }
        );
    }

    #[test]
    fn tab_switch_resets_selection_and_swipes() {
        let (mut app, _rx) = app_with_board();
        app.set_tab(Tab::Habits);
        assert_eq!(app.rows.len(), 2);
        assert_eq!(app.selected, 0);
        assert!(matches!(app.rows[0].marker, RowMarker::Counter { .. }));
    }

    #[test]
    fn content_press_starts_a_swipe_and_drag_moves_it() {
        let (mut app, _rx) = app_with_board();
        app.set_tab(Tab::Habits);
        lay_out_rows(&mut app);

        app.pointer_down(40, 0);
        assert!(app.swipes.is_tracking());

        // 9 columns left = 72 logical px
        app.pointer_drag(31, 0);
        app.pointer_up();
        assert!(app.swipes.is_open(&app.rows[0].row));
    }

    #[test]
    fn handle_press_starts_a_reorder_and_commits_on_drop() {
        let (mut app, mut rx) = app_with_board();
        app.set_tab(Tab::Goals);
        lay_out_rows(&mut app);

        app.pointer_down(1, 0);
        assert!(app.drag_ctx.is_reordering());

        app.pointer_drag(1, 1);
        assert_eq!(app.rows[1].row.id.as_int(), Some(10));
        app.pointer_up();
        assert!(!app.drag_ctx.is_reordering());

        let cmd = rx.try_recv().unwrap();
        let ApiCommand::PersistOrder(commit) = cmd else {
            panic!("expected a persist command, got {cmd:?}");
        };
        assert_eq!(commit.target, ReorderTarget::Goals);
        assert_eq!(commit.ids, vec![11, 10, 12]);
    }

    #[test]
    fn cancelled_drag_restores_the_row_order() {
        let (mut app, mut rx) = app_with_board();
        app.set_tab(Tab::Goals);
        lay_out_rows(&mut app);

        app.pointer_down(1, 0);
        app.pointer_drag(1, 2);
        app.cancel_gestures();

        assert!(!app.drag_ctx.is_reordering());
        assert_eq!(app.rows[0].row.id.as_int(), Some(10));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn snapshot_application_closes_revealed_rows() {
        let (mut app, _rx) = app_with_board();
        app.set_tab(Tab::Habits);
        let row = app.rows[0].row.clone();
        app.swipes.open(row.clone());
        assert!(app.swipes.is_open(&row));

        app.apply_snapshot(DemoStore::seeded().snapshot());
        assert!(!app.swipes.is_open(&row));
    }

    #[test]
    fn delete_key_reveals_then_commits() {
        let (mut app, mut rx) = app_with_board();
        app.set_tab(Tab::Habits);

        app.delete_or_reveal_selected();
        let row = app.rows[0].row.clone();
        assert!(app.swipes.is_open(&row));
        assert!(rx.try_recv().is_err());

        app.delete_or_reveal_selected();
        let cmd = rx.try_recv().unwrap();
        assert_eq!(
            cmd,
            ApiCommand::Delete {
                kind: RowKind::Habit,
                id: row.id,
            }
        );
    }

    #[test]
    fn delete_failure_keeps_the_row_revealed_and_alerts() {
        use crate::tui::components::toast::ToastKind;

        let (mut app, mut rx) = app_with_board();
        app.set_tab(Tab::Habits);
        app.delete_or_reveal_selected();
        app.delete_or_reveal_selected();
        let row = app.rows[0].row.clone();
        assert!(app.loading);
        let _ = rx.try_recv().unwrap(); // the delete command itself

        app.apply_event(UiEvent::DeleteFailed {
            kind: RowKind::Habit,
            message: "Could not delete habit".into(),
        });

        // Row stays revealed, the user is alerted, and the loading
        // indicator does not stick.
        assert!(!app.loading);
        assert!(app.swipes.is_open(&row));
        assert_eq!(
            app.toast.as_ref().map(|t| t.kind),
            Some(ToastKind::Error)
        );
        // A failed delete never triggers a reload.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn subgoal_rows_never_reveal_a_delete_action() {
        let (mut app, mut rx) = app_with_board();
        app.selected = 1; // first sub-goal of mission 1
        assert_eq!(app.rows[1].row.kind, RowKind::Subgoal);

        app.delete_or_reveal_selected();
        assert!(!app.swipes.is_open(&app.rows[1].row));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn habit_steps_only_apply_to_counter_rows() {
        let (mut app, mut rx) = app_with_board();
        // Missions tab: selected row has a checkbox, not a counter.
        app.step_selected(1);
        assert!(rx.try_recv().is_err());

        app.set_tab(Tab::Habits);
        app.step_selected(1);
        assert_eq!(
            rx.try_recv().unwrap(),
            ApiCommand::StepHabit { id: 42, delta: 1 }
        );
    }
}
