use agv_core::{AgentId, Position};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("agent {agent} starts out of bounds at {pos}")]
    OutOfBounds { agent: AgentId, pos: Position },

    #[error("agent {agent} starts on an impassable cell at {pos}")]
    Obstructed { agent: AgentId, pos: Position },

    #[error("two agents share the starting cell {pos}")]
    PositionTaken { pos: Position },

    #[error("agent {agent} has no concrete heading")]
    StillHeading { agent: AgentId },
}

pub type SimResult<T> = Result<T, SimError>;
