//! Agent actions and committed action sequences.
//!
//! Every action consumes exactly one tick.  The planner's expansion set
//! [`MOVE_ACTIONS`] deliberately excludes `Nothing`: a state that "waits in
//! place" would re-enqueue itself forever, so waiting is expressed as a pair
//! of opposite rotations instead.

use std::collections::VecDeque;
use std::fmt;

use crate::coord::Direction;

// ── Action ────────────────────────────────────────────────────────────────────

/// One tick's worth of agent motion.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    /// Advance one cell along the current heading.
    Move,
    /// Rotate 90° clockwise in place.
    RotateRight,
    /// Rotate 90° counter-clockwise in place.
    RotateLeft,
    /// Hold position and heading for one tick.
    Nothing,
}

/// The search expansion set, in the order candidates are generated.
///
/// The order matters only for tie-breaking between equal-time plans; it is
/// part of the framework's deterministic behavior, not a correctness
/// requirement.
pub const MOVE_ACTIONS: [Action; 3] = [Action::Move, Action::RotateRight, Action::RotateLeft];

impl Action {
    /// The heading after applying this action to an agent facing `dir`.
    #[inline]
    pub fn apply_heading(self, dir: Direction) -> Direction {
        match self {
            Action::RotateRight => dir.rotated_right(),
            Action::RotateLeft  => dir.rotated_left(),
            Action::Move | Action::Nothing => dir,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Move        => "move",
            Action::RotateRight => "rotate-right",
            Action::RotateLeft  => "rotate-left",
            Action::Nothing     => "nothing",
        };
        write!(f, "{s}")
    }
}

// ── ActionPlan ────────────────────────────────────────────────────────────────

/// A committed, execution-ordered sequence of actions.
///
/// Built back-to-front during plan reconstruction (`push_front`), then
/// consumed front-to-back one action per tick.  `iter()` walks the remaining
/// actions without consuming them — the drop-replay that releases a
/// cancelled plan's reservations depends on the sequence staying intact
/// until the plan is actually discarded.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ActionPlan {
    actions: VecDeque<Action>,
}

impl ActionPlan {
    /// An empty plan (the "no pending actions" state).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a plan from actions already in execution order.
    pub fn from_actions<I: IntoIterator<Item = Action>>(actions: I) -> Self {
        Self { actions: actions.into_iter().collect() }
    }

    /// Prepend `action` — used when reconstructing a path terminal-to-start.
    pub fn push_front(&mut self, action: Action) {
        self.actions.push_front(action);
    }

    /// The next action to execute, without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<Action> {
        self.actions.front().copied()
    }

    /// Consume and return the next action.
    #[inline]
    pub fn pop(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    /// Remaining actions in execution order, non-consuming.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.actions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<Action> for ActionPlan {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self::from_actions(iter)
    }
}
