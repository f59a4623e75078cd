//! Kanban board view model.
//!
//! [`group_by_lane`] partitions a task list into the three fixed lanes and
//! [`DragState`] tracks which card is mid-drag. Neither touches persisted
//! state: a completed drop yields a [`TaskMove`] that the caller persists.

use serde::Serialize;

use crate::task::TaskStatus;
use crate::types::DbId;

/// Anything that can be placed on the board.
pub trait LaneItem {
    fn item_id(&self) -> DbId;
    fn lane(&self) -> TaskStatus;
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Per-lane task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LaneCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl LaneCounts {
    pub fn get(&self, lane: TaskStatus) -> usize {
        match lane {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }

    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }
}

/// Tasks partitioned by lane, borrowing from the source list.
#[derive(Debug)]
pub struct BoardLanes<'a, T> {
    lanes: [Vec<&'a T>; 3],
}

impl<'a, T> BoardLanes<'a, T> {
    /// Items in one lane, in their original relative order.
    pub fn lane(&self, status: TaskStatus) -> &[&'a T] {
        &self.lanes[status.lane_index()]
    }

    /// Lanes in board order paired with their status.
    pub fn iter(&self) -> impl Iterator<Item = (TaskStatus, &[&'a T])> {
        TaskStatus::ALL
            .into_iter()
            .map(move |status| (status, self.lane(status)))
    }

    pub fn counts(&self) -> LaneCounts {
        LaneCounts {
            todo: self.lanes[0].len(),
            in_progress: self.lanes[1].len(),
            done: self.lanes[2].len(),
        }
    }
}

/// Partition `items` into lanes, preserving relative order within each lane.
pub fn group_by_lane<T: LaneItem>(items: &[T]) -> BoardLanes<'_, T> {
    let mut lanes: [Vec<&T>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for item in items {
        lanes[item.lane().lane_index()].push(item);
    }
    BoardLanes { lanes }
}

/// Count items per lane without keeping the grouping.
pub fn lane_counts<T: LaneItem>(items: &[T]) -> LaneCounts {
    items.iter().fold(LaneCounts::default(), |mut counts, item| {
        match item.lane() {
            TaskStatus::Todo => counts.todo += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Done => counts.done += 1,
        }
        counts
    })
}

// ---------------------------------------------------------------------------
// Drag and drop
// ---------------------------------------------------------------------------

/// A completed drop: move `task_id` into lane `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMove {
    pub task_id: DbId,
    pub to: TaskStatus,
}

/// Transient drag interaction state. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DbId),
}

impl DragState {
    /// Begin dragging a card. A second start replaces the first.
    pub fn start(&mut self, task_id: DbId) {
        *self = DragState::Dragging(task_id);
    }

    /// Hovering a lane always permits a drop.
    pub fn drag_over(&self, _lane: TaskStatus) -> bool {
        true
    }

    /// Drop onto a lane. Returns the move to persist and returns to idle,
    /// or `None` when nothing was being dragged.
    pub fn drop_on(&mut self, lane: TaskStatus) -> Option<TaskMove> {
        match std::mem::take(self) {
            DragState::Dragging(task_id) => Some(TaskMove { task_id, to: lane }),
            DragState::Idle => None,
        }
    }

    /// Drag ended outside any lane.
    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    /// A click opens the task detail only when no drag is in flight.
    pub fn click(&self, task_id: DbId) -> Option<DbId> {
        match self {
            DragState::Idle => Some(task_id),
            DragState::Dragging(_) => None,
        }
    }

    pub fn dragging(&self) -> Option<DbId> {
        match self {
            DragState::Dragging(id) => Some(*id),
            DragState::Idle => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
