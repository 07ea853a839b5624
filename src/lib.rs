//! Multi-tier supply chain simulation (the beer distribution game).
//!
//! A [`Chain`] owns retailer → ... → manufacturer agents that order
//! upstream, ship downstream and pay holding and shortage costs every tick.
//! One agent can be steered from outside through [`Chain::step`]; the rest
//! follow fixed heuristics.

pub mod error;
pub mod io;
pub mod model;
pub mod session;
pub mod simulation;
pub mod strategy;

pub use error::{ConfigError, PolicyError, SimulationError};
pub use model::agent::{Agent, AgentRole, AgentState};
pub use session::EpisodeSession;
pub use simulation::config::{ChainConfig, DemandKind};
pub use simulation::engine::{Chain, ChainState, HistoryRecord};
pub use strategy::traits::{OrderContext, OrderInput, OrderPolicy, PolicyKind};
