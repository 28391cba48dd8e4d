//! Drag-to-reorder of grid columns.
//!
//! [`ColumnReorder`] tracks one drag gesture at a time:
//!
//! ```text
//! Idle -> Dragging -> (TargetEntered <-> TargetLeft)* -> Dropped | Cancelled -> Idle
//! ```
//!
//! The host forwards its pointer events to the `on_drag_*` hooks. A pinned
//! target only accepts a column whose width still fits into the pinned
//! region's budget. The drop indicator side is purely directional: moving
//! right of the drag origin drops after the target, moving left drops before.
//!
//! While the pointer hovers near a horizontal edge the grid auto-scrolls by
//! a fixed step on every tick of a repeating timer. The timer is owned by the
//! host through [`IntervalTimer`] and is stopped whenever the gesture ends.

use lattice_grid_core::{IntervalTimer, Signal, TimerId};

use super::column::DropPosition;
use super::pinning::PinningPlanner;
use crate::config::GridConfig;
use crate::error::Result;
use crate::event::CancelFlag;
use crate::logging::targets;

/// Horizontal scroll position of the grid body.
pub trait HorizontalScroll {
    fn scroll_left(&self) -> f32;
    fn set_scroll_left(&mut self, scroll_left: f32);
    fn max_scroll_left(&self) -> f32;
}

/// Edge of the grid that triggers auto-scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollEdge {
    Left,
    Right,
}

/// Phase of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
    /// Hovering an accepting drop target.
    TargetEntered,
}

/// The in-flight drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub source: String,
    /// Pointer X when the drag started.
    pub start_x: f32,
    pub pointer_x: f32,
    /// Accepting target under the pointer and the indicator side.
    pub target: Option<(String, DropPosition)>,
}

/// Emitted when a drag starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMovingStart {
    pub source: String,
}

/// Emitted while hovering a target and before a drop commits.
#[derive(Debug, Clone)]
pub struct ColumnMovingEvent {
    pub source: String,
    pub target: String,
    pub cancel: CancelFlag,
}

struct AutoScroll {
    edge: ScrollEdge,
    timer: TimerId,
}

/// Drag-reorder state machine for one grid.
pub struct ColumnReorder<T: IntervalTimer> {
    timer: T,
    auto_scroll_step: f32,
    auto_scroll_interval: std::time::Duration,
    edge_zone_width: f32,
    session: Option<DragSession>,
    auto_scroll: Option<AutoScroll>,

    /// Emitted when a drag starts.
    pub column_moving_start: Signal<ColumnMovingStart>,
    /// Emitted on enter and over of an accepting target. Cancel rejects the target.
    pub column_moving: Signal<ColumnMovingEvent>,
    /// Emitted before a drop is applied. Cancel vetoes the move.
    pub column_moving_end: Signal<ColumnMovingEvent>,
}

impl<T: IntervalTimer> std::fmt::Debug for ColumnReorder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnReorder")
            .field("session", &self.session)
            .field("auto_scroll", &self.auto_scroll.as_ref().map(|a| a.edge))
            .finish()
    }
}

impl<T: IntervalTimer> ColumnReorder<T> {
    /// Create an idle protocol driving `timer` for auto-scroll.
    pub fn new(timer: T, config: &GridConfig) -> Self {
        Self {
            timer,
            auto_scroll_step: config.auto_scroll_step,
            auto_scroll_interval: config.auto_scroll_interval(),
            edge_zone_width: config.edge_zone_width,
            session: None,
            auto_scroll: None,
            column_moving_start: Signal::new(),
            column_moving: Signal::new(),
            column_moving_end: Signal::new(),
        }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Returns `true` while a column is being dragged.
    pub fn is_moving(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> DragState {
        match &self.session {
            None => DragState::Idle,
            Some(session) if session.target.is_some() => DragState::TargetEntered,
            Some(_) => DragState::Dragging,
        }
    }

    /// Active drop indicator.
    pub fn indicator(&self) -> Option<(&str, DropPosition)> {
        let (target, position) = self.session.as_ref()?.target.as_ref()?;
        Some((target.as_str(), *position))
    }

    // ------------------------------------------------------------------------
    // Drag lifecycle
    // ------------------------------------------------------------------------

    /// Start dragging `source`. Disabled and unknown columns cannot be dragged.
    pub fn on_drag_start(&mut self, planner: &PinningPlanner, source: &str, pointer_x: f32) -> bool {
        match planner.column(source) {
            Some(column) if !column.is_disabled() => {}
            _ => return false,
        }
        if self.session.is_some() {
            self.on_drag_end();
        }

        self.session = Some(DragSession {
            source: source.to_string(),
            start_x: pointer_x,
            pointer_x,
            target: None,
        });
        tracing::debug!(target: targets::COLUMN_MOVING, source, pointer_x, "column drag started");
        self.column_moving_start.emit(ColumnMovingStart {
            source: source.to_string(),
        });
        true
    }

    /// Pointer entered `target`. Returns `true` if it accepts the drop.
    pub fn on_drag_enter(&mut self, planner: &PinningPlanner, target: &str, pointer_x: f32) -> bool {
        if !self.check_target(planner, target, pointer_x) {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let position = if session.start_x < pointer_x {
            DropPosition::After
        } else {
            DropPosition::Before
        };
        session.target = Some((target.to_string(), position));
        tracing::trace!(target: targets::COLUMN_MOVING, drop_target = target, ?position, "drop indicator shown");
        true
    }

    /// Pointer moved over `target`. Returns `true` if it accepts the drop.
    pub fn on_drag_over(&mut self, planner: &PinningPlanner, target: &str, pointer_x: f32) -> bool {
        self.check_target(planner, target, pointer_x)
    }

    /// Pointer left `target`.
    pub fn on_drag_leave(&mut self, target: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.target.as_ref().is_some_and(|(t, _)| t == target) {
            session.target = None;
            tracing::trace!(target: targets::COLUMN_MOVING, drop_target = target, "drop indicator cleared");
        }
    }

    /// Dropped on `target`. Applies the move unless the target does not
    /// accept the column or a slot vetoes; returns `true` if columns moved.
    pub fn on_drop(&mut self, planner: &mut PinningPlanner, target: &str, pointer_x: f32) -> bool {
        self.stop_auto_scroll();
        let Some(session) = self.session.take() else {
            return false;
        };

        if !self.accepts(planner, &session.source, target) {
            tracing::debug!(target: targets::COLUMN_MOVING, source = %session.source, drop_target = target, "drop on invalid target");
            return false;
        }

        let event = ColumnMovingEvent {
            source: session.source.clone(),
            target: target.to_string(),
            cancel: CancelFlag::new(),
        };
        self.column_moving_end.emit(event.clone());
        if event.cancel.is_cancelled() {
            tracing::debug!(target: targets::COLUMN_MOVING, source = %session.source, drop_target = target, "drop vetoed");
            return false;
        }

        let position = match &session.target {
            Some((t, position)) if t == target => *position,
            _ if session.start_x < pointer_x => DropPosition::After,
            _ => DropPosition::Before,
        };
        let moved = planner.move_column(&session.source, target, position);
        tracing::debug!(target: targets::COLUMN_MOVING, source = %session.source, drop_target = target, ?position, moved, "column dropped");
        moved
    }

    /// The gesture ended. Clears any session left over without a drop.
    pub fn on_drag_end(&mut self) {
        self.stop_auto_scroll();
        if let Some(session) = self.session.take() {
            tracing::debug!(target: targets::COLUMN_MOVING, source = %session.source, "column drag cancelled");
        }
    }

    /// Abort the gesture without moving anything.
    pub fn cancel(&mut self) {
        self.on_drag_end();
    }

    /// Whether `target` accepts the dragged `source`.
    ///
    /// The target must exist, differ from the source and be enabled. A pinned
    /// target only accepts an unpinned source if the pinned region can take
    /// its width.
    pub fn accepts(&self, planner: &PinningPlanner, source: &str, target: &str) -> bool {
        if source == target {
            return false;
        }
        let (Some(source), Some(target)) = (planner.column(source), planner.column(target)) else {
            return false;
        };
        if target.is_disabled() {
            return false;
        }
        if target.is_pinned() && !source.is_pinned() {
            return planner.pinned_width() + source.occupied_width() <= planner.max_pinned_width();
        }
        true
    }

    fn check_target(&mut self, planner: &PinningPlanner, target: &str, pointer_x: f32) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.pointer_x = pointer_x;
        let source = session.source.clone();
        if !self.accepts(planner, &source, target) {
            return false;
        }

        let event = ColumnMovingEvent {
            source,
            target: target.to_string(),
            cancel: CancelFlag::new(),
        };
        self.column_moving.emit(event.clone());
        !event.cancel.is_cancelled()
    }

    // ------------------------------------------------------------------------
    // Auto-scroll
    // ------------------------------------------------------------------------

    /// Edge currently auto-scrolling.
    pub fn auto_scroll_edge(&self) -> Option<ScrollEdge> {
        self.auto_scroll.as_ref().map(|a| a.edge)
    }

    /// Timer driving the auto-scroll.
    pub fn auto_scroll_timer(&self) -> Option<TimerId> {
        self.auto_scroll.as_ref().map(|a| a.timer)
    }

    /// Pointer entered an edge zone. Only starts scrolling during a drag.
    pub fn on_edge_enter(&mut self, edge: ScrollEdge) -> Result<bool> {
        if self.session.is_none() {
            return Ok(false);
        }
        if self.auto_scroll_edge() == Some(edge) {
            return Ok(true);
        }
        self.stop_auto_scroll();

        let timer = self.timer.start_repeating(self.auto_scroll_interval)?;
        self.auto_scroll = Some(AutoScroll { edge, timer });
        tracing::debug!(target: targets::COLUMN_MOVING, ?edge, "auto-scroll started");
        Ok(true)
    }

    /// Pointer left the edge zone.
    pub fn on_edge_leave(&mut self) {
        self.stop_auto_scroll();
    }

    /// Enter or leave edge zones from a pointer position over a grid body
    /// spanning `left..left + width`.
    pub fn update_edge(&mut self, pointer_x: f32, left: f32, width: f32) -> Result<Option<ScrollEdge>> {
        let edge = if pointer_x < left + self.edge_zone_width {
            Some(ScrollEdge::Left)
        } else if pointer_x > left + width - self.edge_zone_width {
            Some(ScrollEdge::Right)
        } else {
            None
        };
        match edge {
            Some(edge) => {
                if !self.on_edge_enter(edge)? {
                    return Ok(None);
                }
            }
            None => self.on_edge_leave(),
        }
        Ok(self.auto_scroll_edge())
    }

    /// Scroll one step towards the active edge. Returns the new offset, or
    /// `None` if no auto-scroll is running.
    pub fn auto_scroll_tick(&mut self, scroll: &mut impl HorizontalScroll) -> Option<f32> {
        let edge = self.auto_scroll_edge()?;
        let delta = match edge {
            ScrollEdge::Left => -self.auto_scroll_step,
            ScrollEdge::Right => self.auto_scroll_step,
        };
        let offset = (scroll.scroll_left() + delta).clamp(0.0, scroll.max_scroll_left().max(0.0));
        scroll.set_scroll_left(offset);
        tracing::trace!(target: targets::COLUMN_MOVING, ?edge, offset, "auto-scroll tick");
        Some(offset)
    }

    /// Dispatch a fired timer. Returns `true` if it was the auto-scroll timer.
    pub fn on_timer(&mut self, id: TimerId, scroll: &mut impl HorizontalScroll) -> bool {
        if self.auto_scroll_timer() != Some(id) {
            return false;
        }
        self.auto_scroll_tick(scroll);
        true
    }

    fn stop_auto_scroll(&mut self) {
        let Some(auto_scroll) = self.auto_scroll.take() else {
            return;
        };
        if let Err(err) = self.timer.stop(auto_scroll.timer) {
            tracing::warn!(target: targets::COLUMN_MOVING, %err, "failed to stop auto-scroll timer");
        }
        tracing::debug!(target: targets::COLUMN_MOVING, edge = ?auto_scroll.edge, "auto-scroll stopped");
    }
}

impl<T: IntervalTimer> Drop for ColumnReorder<T> {
    fn drop(&mut self) {
        self.stop_auto_scroll();
    }
}
