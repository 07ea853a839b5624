// src/strategy/traits.rs

use crate::error::PolicyError;
use crate::model::agent::{Agent, AgentState};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Which order policy an agent runs. Parsed from the `agent_types` override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Orders whatever the outside controller passes to `step`.
    #[serde(alias = "bonsai")]
    External,
    /// Proportional feedback toward the agent's baseline.
    Strm,
    /// Order-up-to heuristic over a short lookback window.
    #[serde(rename = "basestock")]
    BaseStock,
    /// Uniform noise.
    Random,
    /// Reads each order from an [`OrderInput`].
    #[serde(rename = "manual", alias = "interactive")]
    Interactive,
}

/// What a policy may look at when deciding.
#[derive(Debug, Clone, Copy)]
pub struct OrderContext<'a> {
    pub time: u64,
    /// Action supplied to this step by the outside controller.
    pub action: Option<i64>,
    pub agent: &'a Agent,
    /// `customer_orders_to_be_filled` of the upstream agent, 0 for the manufacturer.
    pub supplier_backlog: i64,
    pub max_action: i64,
}

/// Defines the decision-making logic for a supply chain agent.
///
/// Policies are stateless: everything they need is in the context, so
/// deciding never mutates the chain.
pub trait OrderPolicy: Debug + Send + Sync {
    fn kind(&self) -> PolicyKind;

    /// Calculates how much to order from the upstream supplier.
    ///
    /// The result is never negative. The chain clamps it to `max_action`.
    fn get_order(
        &self,
        context: &OrderContext<'_>,
        rng: &mut StdRng,
        input: &mut dyn OrderInput,
    ) -> Result<i64, PolicyError>;
}

/// Source of manually entered orders. Blocks until one is available.
pub trait OrderInput: Send {
    fn read_order(&mut self, state: &AgentState) -> Result<i64, PolicyError>;
}
