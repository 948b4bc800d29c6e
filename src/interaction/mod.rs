// Interaction layer - gesture tracking for list rows
//
// Three pieces, from low level to high:
// - gesture: converts a pointer position stream into one bounded horizontal
//   offset per row (a drag session)
// - swipe: applies sessions to rows and snaps them open/closed, exposing the
//   delete action on fully revealed rows
// - reorder: drag-and-drop row ordering per list container, producing
//   order-persist requests for the API worker
//
// Swipe and reorder are mutually exclusive. They coordinate through a
// DragContext handed to both at call sites; the reorder controller is its
// only writer.

pub mod gesture;
pub mod reorder;
pub mod swipe;

pub use gesture::{Point, Snap, REVEAL_WIDTH};
pub use reorder::{DragContext, ReorderCommit, ReorderController, ReorderTarget};
pub use swipe::{RowZone, SwipePanel};
