//! Fluent builder for constructing a [`Sim`].

use agv_agent::{AgentSpec, AgentStoreBuilder};
use agv_core::{AgentId, Direction};
use agv_grid::{CellKind, Grid};

use crate::error::{SimError, SimResult};
use crate::sim::{Sim, SimConfig};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - a [`Grid`] (typically from [`agv_grid::parse_layout`])
/// - a [`SimConfig`]
///
/// # Agents
///
/// Add agents via [`roster`](Self::roster) (e.g. from
/// [`agv_agent::load_roster_csv`]) or one at a time with
/// [`add_agent`](Self::add_agent).  `build` validates every starting state
/// and places agents on the grid.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(grid, SimConfig::default())
///     .roster(load_roster_csv(path)?)
///     .build()?;
/// ```
pub struct SimBuilder {
    config: SimConfig,
    grid: Grid,
    specs: Vec<AgentSpec>,
}

impl SimBuilder {
    /// Create a builder for the given floor and configuration.
    pub fn new(grid: Grid, config: SimConfig) -> Self {
        Self { config, grid, specs: Vec::new() }
    }

    /// Append a pre-loaded roster (ids continue from agents already added).
    pub fn roster(mut self, specs: Vec<AgentSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Append a single agent.
    pub fn add_agent(
        mut self,
        position: agv_core::Position,
        direction: Direction,
        priority: u32,
    ) -> Self {
        self.specs.push(AgentSpec { position, direction, priority });
        self
    }

    /// Validate starting states, place agents on the grid, and return a
    /// ready-to-run [`Sim`].
    ///
    /// # Errors
    ///
    /// - [`SimError::OutOfBounds`] — a start position is off the grid.
    /// - [`SimError::Obstructed`] — a start position is an obstacle cell.
    /// - [`SimError::PositionTaken`] — two agents share a start cell.
    /// - [`SimError::StillHeading`] — an agent faces `Still`.
    pub fn build(mut self) -> SimResult<Sim> {
        let mut builder = AgentStoreBuilder::new();

        for spec in &self.specs {
            let agent = AgentId(builder.agent_count() as u32);

            if !self.grid.in_bounds(spec.position) {
                return Err(SimError::OutOfBounds { agent, pos: spec.position });
            }
            if self.grid.kind(spec.position) == CellKind::Obstacle {
                return Err(SimError::Obstructed { agent, pos: spec.position });
            }
            if self.grid.occupant(spec.position).is_some() {
                return Err(SimError::PositionTaken { pos: spec.position });
            }
            if spec.direction == Direction::Still {
                return Err(SimError::StillHeading { agent });
            }

            builder.add_agent(spec.position, spec.direction, spec.priority);
            self.grid.place(agent, spec.position);
        }

        Ok(Sim::new(self.config, self.grid, builder.build()))
    }
}
