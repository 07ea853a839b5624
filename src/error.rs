// src/error.rs

use thiserror::Error;

/// Raised when a reset receives a configuration that cannot describe a chain.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("agent_types must name at least one agent")]
    NoAgents,
    #[error("{field} has {found} entries but the chain has {expected} agents")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{field} for agent {agent} is invalid (low {low} > high {high})")]
    InvalidLeadTime {
        field: &'static str,
        agent: usize,
        low: u64,
        high: u64,
    },
    #[error("{field} for agent {agent} exceeds {max} ticks (got {value})")]
    LeadTimeTooLong {
        field: &'static str,
        agent: usize,
        value: u64,
        max: u64,
    },
    #[error("{field} for agent {agent} must be non-negative (got {value})")]
    NegativeInitial {
        field: &'static str,
        agent: usize,
        value: i64,
    },
    #[error("{field} must be non-negative (got {value})")]
    NegativeDemand { field: &'static str, value: i64 },
    #[error("{field} is out of bounds (|{value}| > {max})")]
    OutOfBounds {
        field: &'static str,
        value: i64,
        max: i64,
    },
    #[error("normal demand mu must be finite (got {0})")]
    InvalidDemandMu(f64),
    #[error("uniform demand range invalid (low {low} > high {high})")]
    InvalidDemandRange { low: i64, high: i64 },
    #[error("normal demand sigma must be finite and non-negative (got {0})")]
    InvalidDemandSigma(f64),
    #[error("{field} for agent {agent} must be non-negative (got {value})")]
    NegativeCost {
        field: &'static str,
        agent: usize,
        value: f64,
    },
    #[error("action_high must be non-negative (got {0})")]
    NegativeActionHigh(i64),
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Raised by an order policy when it cannot produce an order.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("an external action is required for this agent")]
    MissingAction,
    #[error("order cannot be negative (got {0})")]
    NegativeOrder(i64),
    #[error("could not read an order from {0:?}")]
    InvalidInput(String),
    #[error("order input closed")]
    InputClosed,
    #[error("order input failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("agent {agent} could not place an order: {source}")]
    Policy {
        agent: usize,
        #[source]
        source: PolicyError,
    },
    #[error("invalid action payload: {0}")]
    Action(String),
}
