//! Unit tests for agv-plan.
//!
//! Scenario tests build tiny worlds inline; the helper owns the grid,
//! reservation table, and agent store and hands out `PlanContext`s the way
//! the tick driver does.

use std::sync::Arc;

use agv_agent::{AgentStore, AgentStoreBuilder};
use agv_core::{Action, AgentId, Direction, Position, Tick};
use agv_grid::{parse_layout, CellKind, Grid, GuideField, ReservationTable};

use crate::{PlanContext, Planner, RoutedSet};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct World {
    grid: Grid,
    reservations: ReservationTable,
    agents: AgentStore,
}

impl World {
    /// Build a world from a layout string and (position, direction,
    /// priority) agent tuples.  Agents are placed on the grid immediately.
    fn new(layout: &str, agents: &[(Position, Direction, u32)]) -> Self {
        let mut grid = parse_layout(layout).unwrap();
        let mut builder = AgentStoreBuilder::new();
        for &(pos, dir, priority) in agents {
            let id = builder.add_agent(pos, dir, priority);
            grid.place(id, pos);
        }
        Self {
            grid,
            reservations: ReservationTable::new(),
            agents: builder.build(),
        }
    }

    fn ctx(&mut self, now: Tick) -> PlanContext<'_> {
        PlanContext {
            grid: &mut self.grid,
            reservations: &mut self.reservations,
            agents: &mut self.agents,
            now,
        }
    }

    /// Compute and assign a guide field toward `dst` for `agent`.
    fn guide_to(&mut self, agent: AgentId, dst: Position) {
        let field = Arc::new(GuideField::compute(&self.grid, dst, &[CellKind::Empty]));
        self.agents.set_guide(agent, field);
    }
}

fn pos(row: i32, col: i32) -> Position {
    Position::new(row, col)
}

// ── PlanNode transitions ──────────────────────────────────────────────────────

#[cfg(test)]
mod node {
    use super::*;
    use crate::PlanNode;
    use agv_core::MOVE_ACTIONS;

    #[test]
    fn next_advances_one_tick() {
        let n = PlanNode::initial(pos(1, 1), Direction::East, Tick(7));
        for action in MOVE_ACTIONS {
            assert_eq!(n.next(action).time, Tick(8));
        }
    }

    #[test]
    fn move_follows_heading() {
        let n = PlanNode::initial(pos(1, 1), Direction::East, Tick(0));
        let m = n.next(Action::Move);
        assert_eq!(m.pos, pos(1, 2));
        assert_eq!(m.dir, Direction::East);
        assert_eq!(m.action, Action::Move);
    }

    #[test]
    fn rotations_keep_position() {
        let n = PlanNode::initial(pos(1, 1), Direction::North, Tick(0));
        let r = n.next(Action::RotateRight);
        assert_eq!(r.pos, pos(1, 1));
        assert_eq!(r.dir, Direction::East);
        let l = n.next(Action::RotateLeft);
        assert_eq!(l.dir, Direction::West);
    }

    #[test]
    fn previous_inverts_next() {
        let n = PlanNode::initial(pos(2, 3), Direction::South, Tick(10));
        for action in MOVE_ACTIONS {
            let child = n.next(action);
            let parent = child.previous();
            assert_eq!(parent.pos, n.pos, "{action}");
            assert_eq!(parent.dir, n.dir, "{action}");
            assert_eq!(parent.time, n.time, "{action}");
        }
    }
}

// ── VisitedTable ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod visited {
    use super::*;
    use crate::{PlanNode, VisitedTable};

    #[test]
    fn visit_and_lookup() {
        let grid = Grid::open(3, 3);
        let mut table = VisitedTable::new(&grid, Tick(5), 16);
        let n = PlanNode::initial(pos(1, 1), Direction::East, Tick(5));

        assert!(!table.is_visited(&n));
        table.visit(&n);
        assert!(table.is_visited(&n));
        assert_eq!(table.arriving_action(&n), Some(Action::Move));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_headings_and_times_are_distinct_states() {
        let grid = Grid::open(3, 3);
        let mut table = VisitedTable::new(&grid, Tick(0), 16);
        let n = PlanNode::initial(pos(1, 1), Direction::East, Tick(0));
        table.visit(&n);

        let turned = PlanNode { dir: Direction::South, ..n };
        let later = PlanNode { time: Tick(1), ..n };
        assert!(!table.is_visited(&turned));
        assert!(!table.is_visited(&later));
    }

    #[test]
    fn states_alias_one_horizon_apart() {
        let grid = Grid::open(3, 3);
        let mut table = VisitedTable::new(&grid, Tick(0), 8);
        let n = PlanNode::initial(pos(1, 1), Direction::East, Tick(3));
        table.visit(&n);

        let alias = PlanNode { time: Tick(3 + 8), ..n };
        assert!(table.is_visited(&alias));
    }

    #[test]
    fn first_visit_wins() {
        let grid = Grid::open(3, 3);
        let mut table = VisitedTable::new(&grid, Tick(0), 8);
        let n = PlanNode { pos: pos(1, 1), dir: Direction::East, action: Action::RotateLeft, time: Tick(2) };
        table.visit(&n);

        let alias = PlanNode { action: Action::Move, time: Tick(10), ..n };
        table.visit(&alias);
        assert_eq!(table.arriving_action(&n), Some(Action::RotateLeft));
    }
}

// ── RoutedSet ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routed {
    use super::*;

    #[test]
    fn mark_and_reset() {
        let mut set = RoutedSet::new(3);
        assert!(!set.is_marked(AgentId(1)));
        set.mark(AgentId(1));
        assert!(set.is_marked(AgentId(1)));
        assert_eq!(set.marked_count(), 1);
        set.reset();
        assert!(!set.is_marked(AgentId(1)));
        assert_eq!(set.marked_count(), 0);
    }
}

// ── route_one_step ────────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use super::*;

    #[test]
    fn steps_down_the_guide_field() {
        let mut world = World::new("...\n...\n...", &[(pos(0, 0), Direction::East, 0)]);
        let a = AgentId(0);
        world.guide_to(a, pos(2, 0));

        let planner = Planner::new();
        let mut routed = RoutedSet::new(1);
        let moved = planner.route_one_step(&mut world.ctx(Tick(0)), a, &mut routed);

        assert!(moved);
        assert_eq!(world.agents.position[0], pos(1, 0));
        assert_eq!(world.grid.occupant(pos(1, 0)), Some(a));
        assert_eq!(world.grid.occupant(pos(0, 0)), None);
    }

    #[test]
    fn displaces_lower_ranked_blocker_sideways() {
        // A (rank 1) wants (2,0) straight through B (rank 2); B is shoved
        // to a free adjacent cell and A advances.
        let mut world = World::new(
            "...\n...\n...",
            &[(pos(0, 0), Direction::South, 1), (pos(1, 0), Direction::North, 2)],
        );
        let (a, b) = (AgentId(0), AgentId(1));
        world.guide_to(a, pos(2, 0));

        let planner = Planner::new();
        let mut routed = RoutedSet::new(2);
        let moved = planner.route_one_step(&mut world.ctx(Tick(0)), a, &mut routed);

        assert!(moved);
        assert_eq!(world.agents.position[a.index()], pos(1, 0));
        assert_eq!(world.agents.position[b.index()], pos(1, 1));
        assert!(routed.is_marked(a));
        assert!(routed.is_marked(b));
    }

    #[test]
    fn blocked_when_blocker_has_nowhere_to_go() {
        // Single-column corridor; the cell behind B is a rack, so B cannot
        // clear the way and A must report blocked.
        let mut world = World::new(
            ".\n.\nR",
            &[(pos(0, 0), Direction::South, 1), (pos(1, 0), Direction::North, 2)],
        );
        let a = AgentId(0);
        world.guide_to(a, pos(2, 0));

        let planner = Planner::new();
        let mut routed = RoutedSet::new(2);
        let moved = planner.route_one_step(&mut world.ctx(Tick(0)), a, &mut routed);

        assert!(!moved);
        assert_eq!(world.agents.position[0], pos(0, 0));
        assert_eq!(world.agents.position[1], pos(1, 0));
    }

    #[test]
    fn never_displaces_outranking_agent() {
        // B outranks A; A's only descending direction runs through B.
        let mut world = World::new(
            ".\n.\n.",
            &[(pos(0, 0), Direction::South, 2), (pos(1, 0), Direction::North, 1)],
        );
        let a = AgentId(0);
        world.guide_to(a, pos(2, 0));

        let planner = Planner::new();
        let mut routed = RoutedSet::new(2);
        assert!(!planner.route_one_step(&mut world.ctx(Tick(0)), a, &mut routed));
        assert_eq!(world.agents.position[1], pos(1, 0), "B must not move");
    }

    #[test]
    fn refuses_agent_already_routed_this_tick() {
        let mut world = World::new("...\n...\n...", &[(pos(0, 0), Direction::East, 0)]);
        let a = AgentId(0);
        world.guide_to(a, pos(2, 2));

        let planner = Planner::new();
        let mut routed = RoutedSet::new(1);
        assert!(planner.route_one_step(&mut world.ctx(Tick(0)), a, &mut routed));
        // Second attempt in the same tick: the mark refuses it.
        assert!(!planner.route_one_step(&mut world.ctx(Tick(0)), a, &mut routed));

        routed.reset();
        assert!(planner.route_one_step(&mut world.ctx(Tick(1)), a, &mut routed));
    }

    #[test]
    fn cyclic_contention_terminates_without_revisits() {
        // Four agents on a full 2×2 grid, each guided to its clockwise
        // neighbour's cell.  No agent can move; the displacement chain must
        // visit each agent once and give up.
        let mut world = World::new(
            "..\n..",
            &[
                (pos(0, 0), Direction::East, 0),
                (pos(0, 1), Direction::South, 1),
                (pos(1, 1), Direction::West, 2),
                (pos(1, 0), Direction::North, 3),
            ],
        );
        world.guide_to(AgentId(0), pos(0, 1));
        world.guide_to(AgentId(1), pos(1, 1));
        world.guide_to(AgentId(2), pos(1, 0));
        world.guide_to(AgentId(3), pos(0, 0));

        let planner = Planner::new();
        let mut routed = RoutedSet::new(4);
        let moved = planner.route_one_step(&mut world.ctx(Tick(0)), AgentId(0), &mut routed);

        assert!(!moved);
        assert_eq!(routed.marked_count(), 4, "every agent visited exactly once");
        for (i, expected) in [pos(0, 0), pos(0, 1), pos(1, 1), pos(1, 0)].into_iter().enumerate() {
            assert_eq!(world.agents.position[i], expected);
        }
    }

    #[test]
    fn displacement_drops_the_victims_plan() {
        // B holds a committed plan; being shoved invalidates it, so its
        // reservations must be released and its plan cleared.
        let mut world = World::new(
            "...\n...\n...",
            &[(pos(0, 0), Direction::South, 0), (pos(1, 0), Direction::East, 1)],
        );
        let (a, b) = (AgentId(0), AgentId(1));
        world.guide_to(a, pos(2, 0));

        let planner = Planner::new();
        let now = Tick(0);
        let plan = planner.plan_route(&mut world.ctx(now), b, pos(1, 2)).unwrap();
        world.agents.set_plan(b, plan);
        assert_eq!(world.reservations.len(), 3);

        let mut routed = RoutedSet::new(2);
        assert!(planner.route_one_step(&mut world.ctx(now), a, &mut routed));

        assert!(!world.agents.has_plan(b));
        assert!(world.reservations.is_empty(), "victim's reservations released");
        assert_eq!(world.agents.position[b.index()], pos(1, 1));
    }
}

// ── plan_route ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod plan {
    use super::*;

    #[test]
    fn straight_corridor_two_moves() {
        let mut world = World::new("...", &[(pos(0, 0), Direction::East, 0)]);
        let a = AgentId(0);
        let now = Tick(5);

        let planner = Planner::new();
        let plan = planner.plan_route(&mut world.ctx(now), a, pos(0, 2)).unwrap();

        let actions: Vec<Action> = plan.iter().collect();
        assert_eq!(actions, vec![Action::Move, Action::Move]);

        // Every state on the path is reserved, initial and terminal included.
        assert_eq!(world.reservations.len(), 3);
        assert_eq!(world.reservations.holder(pos(0, 0), Tick(5)), Some(a));
        assert_eq!(world.reservations.holder(pos(0, 1), Tick(6)), Some(a));
        assert_eq!(world.reservations.holder(pos(0, 2), Tick(7)), Some(a));
    }

    #[test]
    fn turns_cost_a_tick_each() {
        // Facing away from the goal: one rotation, then two moves.
        let mut world = World::new("...", &[(pos(0, 0), Direction::North, 0)]);
        let planner = Planner::new();
        let plan = planner.plan_route(&mut world.ctx(Tick(0)), AgentId(0), pos(0, 2)).unwrap();

        let actions: Vec<Action> = plan.iter().collect();
        assert_eq!(actions, vec![Action::RotateRight, Action::Move, Action::Move]);
        assert_eq!(world.reservations.len(), 4);
    }

    #[test]
    fn already_at_destination_is_an_empty_plan() {
        let mut world = World::new("...", &[(pos(0, 1), Direction::East, 0)]);
        let planner = Planner::new();
        let plan = planner.plan_route(&mut world.ctx(Tick(0)), AgentId(0), pos(0, 1)).unwrap();
        assert!(plan.is_empty());
        assert!(world.reservations.is_empty());
    }

    #[test]
    fn waits_out_an_outranking_reservation() {
        // An outranking agent holds (0,1) at t+1; the planner must burn two
        // ticks rotating in place and slip through afterwards.
        let mut world = World::new(
            "...",
            &[(pos(0, 0), Direction::East, 5), (pos(0, 2), Direction::West, 0)],
        );
        let (a, boss) = (AgentId(0), AgentId(1));
        let now = Tick(5);
        world.reservations.reserve(pos(0, 1), Tick(6), boss);

        let planner = Planner::new();
        let plan = planner.plan_route(&mut world.ctx(now), a, pos(0, 2)).unwrap();

        let actions: Vec<Action> = plan.iter().collect();
        assert_eq!(
            actions,
            vec![Action::RotateRight, Action::RotateLeft, Action::Move, Action::Move]
        );
        // The boss's reservation is untouched.
        assert_eq!(world.reservations.holder(pos(0, 1), Tick(6)), Some(boss));
        // a holds (0,0) for t5..=t7, (0,1) at t8, (0,2) at t9.
        assert_eq!(world.reservations.holder(pos(0, 0), Tick(7)), Some(a));
        assert_eq!(world.reservations.holder(pos(0, 1), Tick(8)), Some(a));
        assert_eq!(world.reservations.holder(pos(0, 2), Tick(9)), Some(a));
    }

    #[test]
    fn preempts_lower_ranked_plan_on_collision() {
        // The rival (lower rank) commits a plan through (0,1); the boss's
        // shortest path needs that slot, so the rival loses everything.
        let mut world = World::new(
            "...\n...",
            &[(pos(0, 0), Direction::East, 0), (pos(1, 1), Direction::North, 9)],
        );
        let (boss, rival) = (AgentId(0), AgentId(1));
        let now = Tick(5);

        let planner = Planner::new();
        let rival_plan = planner.plan_route(&mut world.ctx(now), rival, pos(0, 1)).unwrap();
        world.agents.set_plan(rival, rival_plan);
        assert_eq!(world.reservations.holder(pos(0, 1), Tick(6)), Some(rival));

        let plan = planner.plan_route(&mut world.ctx(now), boss, pos(0, 2)).unwrap();
        assert_eq!(plan.iter().collect::<Vec<_>>(), vec![Action::Move, Action::Move]);

        // The rival's plan is gone and none of its reservations linger.
        assert!(!world.agents.has_plan(rival));
        assert_eq!(world.reservations.holder(pos(0, 1), Tick(6)), Some(boss));
        assert_eq!(world.reservations.holder(pos(1, 1), Tick(5)), None);
        assert_eq!(world.reservations.len(), 3);
    }

    #[test]
    fn never_preempts_an_outranking_plan() {
        // Symmetric to the above: the rival outranks, so the planner routes
        // *around* its reservation instead of through it.
        let mut world = World::new(
            "...",
            &[(pos(0, 0), Direction::East, 9), (pos(0, 2), Direction::West, 0)],
        );
        let (a, boss) = (AgentId(0), AgentId(1));
        world.reservations.reserve(pos(0, 1), Tick(1), boss);

        let planner = Planner::new();
        let plan = planner.plan_route(&mut world.ctx(Tick(0)), a, pos(0, 2)).unwrap();

        // Whatever shape the detour takes, the boss's slot survives.
        assert!(!plan.is_empty());
        assert_eq!(world.reservations.holder(pos(0, 1), Tick(1)), Some(boss));
    }

    #[test]
    fn facility_is_a_valid_destination_but_not_a_waypoint() {
        // Terminal rack: fine.
        let mut world = World::new(".R", &[(pos(0, 0), Direction::East, 0)]);
        let planner = Planner::new();
        let plan = planner.plan_route(&mut world.ctx(Tick(0)), AgentId(0), pos(0, 1)).unwrap();
        assert_eq!(plan.iter().collect::<Vec<_>>(), vec![Action::Move]);

        // Rack astride the only geometric path: no route.
        let mut world = World::new(".R.", &[(pos(0, 0), Direction::East, 0)]);
        let planner = Planner::with_horizon(16);
        assert!(planner.plan_route(&mut world.ctx(Tick(0)), AgentId(0), pos(0, 2)).is_none());
    }

    #[test]
    fn walled_off_destination_reports_no_path() {
        let mut world = World::new(".#.", &[(pos(0, 0), Direction::East, 0)]);
        let planner = Planner::with_horizon(16);
        assert!(planner.plan_route(&mut world.ctx(Tick(0)), AgentId(0), pos(0, 2)).is_none());
        assert!(world.reservations.is_empty());
    }

    #[test]
    fn commit_then_drop_is_a_no_op_on_the_table() {
        let mut world = World::new("....", &[(pos(0, 0), Direction::East, 0)]);
        let a = AgentId(0);
        let now = Tick(3);

        let planner = Planner::new();
        let plan = planner.plan_route(&mut world.ctx(now), a, pos(0, 3)).unwrap();
        assert_eq!(world.reservations.len(), 4);

        planner.drop_plan(&mut world.ctx(now), a, plan);
        assert!(world.reservations.is_empty());
    }

    #[test]
    fn replanning_releases_the_previous_commitment() {
        let mut world = World::new("...\n...", &[(pos(0, 0), Direction::East, 0)]);
        let a = AgentId(0);
        let now = Tick(0);

        let planner = Planner::new();
        let first = planner.plan_route(&mut world.ctx(now), a, pos(0, 2)).unwrap();
        world.agents.set_plan(a, first);
        let slots_before = world.reservations.len();

        let second = planner.plan_route(&mut world.ctx(now), a, pos(1, 0)).unwrap();
        world.agents.set_plan(a, second);

        // Old row-0 corridor slots are gone; only the new path is reserved.
        assert_eq!(world.reservations.holder(pos(0, 2), Tick(2)), None);
        assert!(world.reservations.len() <= slots_before + 1);
        for (p, t, holder) in world.reservations.iter() {
            assert_eq!(holder, a, "stale reservation at {p} {t}");
        }
    }
}

// ── step ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod step {
    use super::*;

    #[test]
    fn executes_a_plan_to_completion() {
        let mut world = World::new("...", &[(pos(0, 0), Direction::East, 0)]);
        let a = AgentId(0);
        let planner = Planner::new();

        let plan = planner.plan_route(&mut world.ctx(Tick(0)), a, pos(0, 2)).unwrap();
        world.agents.set_plan(a, plan);

        assert!(planner.step(&mut world.ctx(Tick(0)), a));
        assert_eq!(world.agents.position[0], pos(0, 1));
        // The consumed slot is released as the agent passes through.
        assert_eq!(world.reservations.holder(pos(0, 0), Tick(0)), None);

        assert!(planner.step(&mut world.ctx(Tick(1)), a));
        assert_eq!(world.agents.position[0], pos(0, 2));
        assert!(!world.agents.has_plan(a));

        // Only the arrival slot remains; the tick driver reclaims it when
        // the agent idles on it.
        assert_eq!(world.reservations.len(), 1);
        assert_eq!(world.reservations.holder(pos(0, 2), Tick(2)), Some(a));
    }

    #[test]
    fn rotation_steps_never_collide() {
        let mut world = World::new("..", &[(pos(0, 0), Direction::North, 0)]);
        let a = AgentId(0);
        let planner = Planner::new();

        let plan = planner.plan_route(&mut world.ctx(Tick(0)), a, pos(0, 1)).unwrap();
        world.agents.set_plan(a, plan);

        assert!(planner.step(&mut world.ctx(Tick(0)), a)); // RotateRight
        assert_eq!(world.agents.direction[0], Direction::East);
        assert_eq!(world.agents.position[0], pos(0, 0));
    }

    #[test]
    fn blocked_move_drops_the_plan_and_reports_false() {
        // An idle agent (no plan, no reservations) squats on the path; the
        // search cannot see it, so execution must catch it.
        let mut world = World::new(
            "...",
            &[(pos(0, 0), Direction::East, 0), (pos(0, 1), Direction::West, 1)],
        );
        let a = AgentId(0);
        let planner = Planner::new();

        let plan = planner.plan_route(&mut world.ctx(Tick(0)), a, pos(0, 2)).unwrap();
        world.agents.set_plan(a, plan);
        assert!(!world.reservations.is_empty());

        let moved = planner.step(&mut world.ctx(Tick(0)), a);

        assert!(!moved);
        assert_eq!(world.agents.position[0], pos(0, 0), "agent stays put");
        assert!(!world.agents.has_plan(a), "plan dropped on blockage");
        assert!(
            world.reservations.is_empty(),
            "every reserved slot released, pending action included"
        );
    }
}
