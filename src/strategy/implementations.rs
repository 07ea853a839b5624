// src/strategy/implementations.rs

use crate::error::PolicyError;
use crate::simulation::config::ChainConfig;
use crate::strategy::traits::{OrderContext, OrderInput, OrderPolicy, PolicyKind};
use rand::rngs::StdRng;
use rand::Rng;

/// Ticks the base-stock policy looks back over, inclusive of now.
pub const BASESTOCK_LOOKBACK: u64 = 4;

/// Rounds half to even and floors the result at zero.
fn non_negative_round(raw: f64) -> i64 {
    (raw.round_ties_even() as i64).max(0)
}

impl PolicyKind {
    /// Instantiates the policy for the agent at `agent_num`.
    pub fn build(self, agent_num: usize, config: &ChainConfig) -> Box<dyn OrderPolicy> {
        match self {
            PolicyKind::External => Box::new(ExternalPolicy),
            PolicyKind::Strm => Box::new(StrmPolicy::new(
                config.strm_alpha[agent_num],
                config.strm_beta[agent_num],
            )),
            PolicyKind::BaseStock => Box::new(BaseStockPolicy::default()),
            PolicyKind::Random => Box::new(RandomPolicy::default()),
            PolicyKind::Interactive => Box::new(InteractivePolicy),
        }
    }
}

// =========================================================================
// 1. External Policy
// =========================================================================

/// Passes through the action given to the step. The only place an outside
/// controller can steer the chain.
#[derive(Debug, Clone)]
pub struct ExternalPolicy;

impl OrderPolicy for ExternalPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::External
    }

    fn get_order(
        &self,
        context: &OrderContext<'_>,
        _rng: &mut StdRng,
        _input: &mut dyn OrderInput,
    ) -> Result<i64, PolicyError> {
        match context.action {
            None => Err(PolicyError::MissingAction),
            Some(action) if action < 0 => Err(PolicyError::NegativeOrder(action)),
            Some(action) => Ok(action),
        }
    }
}

// =========================================================================
// 2. STRM Policy (Proportional Feedback)
// =========================================================================

/// Sterman's anchoring-and-adjustment rule.
///
/// Order = IncomingShipment + alpha * (Inventory - a_b) + beta * (Backlog - b_b)
///
/// With negative gains, surplus inventory lowers the order and a growing
/// backlog raises it less than one-for-one.
#[derive(Debug, Clone)]
pub struct StrmPolicy {
    alpha: f64,
    beta: f64,
}

impl StrmPolicy {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }
}

impl OrderPolicy for StrmPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Strm
    }

    fn get_order(
        &self,
        context: &OrderContext<'_>,
        _rng: &mut StdRng,
        _input: &mut dyn OrderInput,
    ) -> Result<i64, PolicyError> {
        let agent = context.agent;
        let incoming = agent.arriving_shipments.get(context.time) as f64;
        let inventory_gap = agent.inventory_level as f64 - agent.baseline.inventory;
        let backlog_gap = agent.customer_orders_to_be_filled as f64 - agent.baseline.backlog;

        Ok(non_negative_round(
            incoming + self.alpha * inventory_gap + self.beta * backlog_gap,
        ))
    }
}

// =========================================================================
// 3. Base Stock Policy (Order-Up-To)
// =========================================================================

/// Order-up-to heuristic over a short lookback window.
///
/// Order = Target + k * mean(RecentOrdersReceived) + Backlog
///         - SupplierBacklog - sum(RecentOrdersPlaced)
///
/// An empty window counts as a mean of 0.
#[derive(Debug, Clone)]
pub struct BaseStockPolicy {
    target_stock: i64,
    demand_multiplier: f64,
}

impl BaseStockPolicy {
    pub fn new(target_stock: i64, demand_multiplier: f64) -> Self {
        Self {
            target_stock,
            demand_multiplier,
        }
    }
}

impl Default for BaseStockPolicy {
    fn default() -> Self {
        Self::new(4, 4.0)
    }
}

impl OrderPolicy for BaseStockPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::BaseStock
    }

    fn get_order(
        &self,
        context: &OrderContext<'_>,
        _rng: &mut StdRng,
        _input: &mut dyn OrderInput,
    ) -> Result<i64, PolicyError> {
        let agent = context.agent;

        let (count, total) = agent
            .recent_orders_received(context.time, BASESTOCK_LOOKBACK)
            .fold((0usize, 0i64), |(n, sum), q| (n + 1, sum + q));
        let mean_received = if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        };
        let recently_placed: i64 = agent
            .recent_orders_placed(context.time, BASESTOCK_LOOKBACK)
            .sum();

        let raw = self.target_stock as f64
            + self.demand_multiplier * mean_received
            + agent.customer_orders_to_be_filled as f64
            - context.supplier_backlog as f64
            - recently_placed as f64;

        Ok(non_negative_round(raw))
    }
}

// =========================================================================
// 4. Random Policy
// =========================================================================

/// Orders a random amount within a specific range, ignoring state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    min: i64,
    max: i64,
}

impl RandomPolicy {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new(0, 3)
    }
}

impl OrderPolicy for RandomPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Random
    }

    fn get_order(
        &self,
        _context: &OrderContext<'_>,
        rng: &mut StdRng,
        _input: &mut dyn OrderInput,
    ) -> Result<i64, PolicyError> {
        Ok(rng.gen_range(self.min..=self.max))
    }
}

// =========================================================================
// 5. Interactive Policy
// =========================================================================

/// Asks a person for every order. Blocks the whole step while waiting.
#[derive(Debug, Clone)]
pub struct InteractivePolicy;

impl OrderPolicy for InteractivePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Interactive
    }

    fn get_order(
        &self,
        context: &OrderContext<'_>,
        _rng: &mut StdRng,
        input: &mut dyn OrderInput,
    ) -> Result<i64, PolicyError> {
        let order = input.read_order(&context.agent.state(context.time))?;
        if order < 0 {
            return Err(PolicyError::NegativeOrder(order));
        }
        Ok(order)
    }
}
