// src/simulation/engine.rs

use crate::error::{ConfigError, SimulationError};
use crate::io::demand::DemandModel;
use crate::model::agent::{Agent, AgentState};
use crate::simulation::config::ChainConfig;
use crate::strategy::implementations::BASESTOCK_LOOKBACK;
use crate::strategy::input::LineInput;
use crate::strategy::traits::{OrderContext, OrderInput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One row of the per-step log, one per agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub time: u64,
    pub agent_num: usize,
    pub role: String,
    pub demand: i64,
    pub inventory: i64,
    pub backlog: i64,
    pub supply_line: i64,
    pub order_placed: i64,
    pub order_received: i64,
    pub shipment_received: i64,
    pub shipment_sent: i64,
    pub cost: f64,
    pub total_cost: f64,
}

/// Externally observable snapshot of the whole chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    pub inventory_levels: Vec<i64>,
    pub customer_orders_to_be_filled: Vec<i64>,
    pub supplier_orders_to_be_delivered: Vec<i64>,
    pub current_costs: Vec<f64>,
    pub total_costs: Vec<f64>,
    pub cumulative_costs: f64,
    pub total_delivered: i64,
    pub outstanding_demand: i64,
    pub time: u64,
}

/// One supply chain, retailer first.
pub struct Chain {
    config: ChainConfig,
    demand: DemandModel,
    max_action: i64,

    // The Actors
    pub agents: Vec<Agent>,

    pub time: u64,
    /// Units that reached end customers.
    pub total_delivered: i64,
    /// End-customer demand not yet delivered.
    pub outstanding_demand: i64,
    /// Every unit of end-customer demand generated so far.
    pub total_demand: i64,
    pub last_demand: i64,

    rng: StdRng,
    input: Box<dyn OrderInput>,

    pub history: Vec<HistoryRecord>,
}

fn build_agents(config: &ChainConfig) -> Vec<Agent> {
    config
        .agent_types
        .iter()
        .enumerate()
        .map(|(n, kind)| Agent::new(n, config, kind.build(n, config)))
        .collect()
}

impl Chain {
    /// A chain with the default configuration.
    pub fn new(seed: u64) -> Self {
        let config = ChainConfig::default();
        let demand = DemandModel::from_config(&config);
        Self {
            max_action: config.max_action(),
            agents: build_agents(&config),
            config,
            demand,
            time: 0,
            total_delivered: 0,
            outstanding_demand: 0,
            total_demand: 0,
            last_demand: 0,
            rng: StdRng::seed_from_u64(seed),
            input: Box::new(LineInput::stdin()),
            history: Vec::new(),
        }
    }

    pub fn with_config(config: ChainConfig, seed: u64) -> Result<Self, ConfigError> {
        let mut chain = Self::new(seed);
        chain.reset(config)?;
        Ok(chain)
    }

    /// Replaces where interactive agents read their orders from.
    pub fn with_input(mut self, input: Box<dyn OrderInput>) -> Self {
        self.input = input;
        self
    }

    pub fn set_input(&mut self, input: Box<dyn OrderInput>) {
        self.input = input;
    }

    /// Starts a fresh run. Nothing from the previous run survives.
    ///
    /// The config is validated first; on error the chain is untouched.
    pub fn reset(&mut self, config: ChainConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let demand = DemandModel::from_config(&config);

        if let Some(seed) = config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.demand = demand;
        self.max_action = config.max_action();
        self.agents = build_agents(&config);
        self.time = 0;
        self.total_delivered = 0;
        self.outstanding_demand = 0;
        self.total_demand = 0;
        self.last_demand = 0;
        self.history.clear();

        info!(
            agents = self.agents.len(),
            demand = ?config.demand_distribution,
            max_action = self.max_action,
            "chain reset"
        );
        self.config = config;
        Ok(())
    }

    /// Resets from a mapping of named overrides.
    pub fn reset_with_overrides(&mut self, overrides: &serde_json::Value) -> Result<(), ConfigError> {
        self.reset(ChainConfig::from_overrides(overrides)?)
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn max_action(&self) -> i64 {
        self.max_action
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Index of the agent `idx` orders from.
    pub fn supplier_of(&self, idx: usize) -> Option<usize> {
        (idx + 1 < self.agents.len()).then_some(idx + 1)
    }

    /// Index of the agent `idx` ships to.
    pub fn customer_of(&self, idx: usize) -> Option<usize> {
        idx.checked_sub(1)
    }

    /// Samples this tick's end-customer demand.
    pub fn new_demand(&mut self) -> i64 {
        self.demand.sample(self.time, &mut self.rng)
    }

    /// Moves the simulation forward one time unit.
    ///
    /// Every phase finishes for all agents before the next one starts.
    /// If any policy fails, the chain and its generator are left exactly
    /// as they were.
    pub fn step(&mut self, action: Option<i64>) -> Result<(), SimulationError> {
        let checkpoint = self.rng.clone();
        let demand = self.new_demand();
        let orders = match self.decide_orders(action) {
            Ok(orders) => orders,
            Err(err) => {
                self.rng = checkpoint;
                warn!(time = self.time, error = %err, "step aborted");
                return Err(err);
            }
        };

        let time = self.time;
        debug!(time, demand, "updating orders");
        self.agents[0].plan_order(time, demand, &mut self.rng);
        self.outstanding_demand += demand;
        self.total_demand += demand;
        self.last_demand = demand;
        for (idx, &order) in orders.iter().enumerate() {
            self.place_order(idx, order);
        }

        self.time += 1;
        let now = self.time;
        debug!(time = now, "receiving incoming shipments");
        for agent in &mut self.agents {
            agent.receive_items(now);
        }
        debug!(time = now, "receiving incoming orders");
        for agent in &mut self.agents {
            agent.receive_order(now);
        }
        debug!(time = now, "delivering shipments");
        for idx in 0..self.agents.len() {
            self.deliver_items(idx);
        }
        debug!(time = now, "updating costs");
        for agent in &mut self.agents {
            agent.update_costs();
        }

        let cutoff = now.saturating_sub(BASESTOCK_LOOKBACK);
        for agent in &mut self.agents {
            agent.prune_ledgers(cutoff);
        }
        self.record_history();
        Ok(())
    }

    /// Asks every policy for its order without touching any agent.
    fn decide_orders(&mut self, action: Option<i64>) -> Result<Vec<i64>, SimulationError> {
        let mut orders = Vec::with_capacity(self.agents.len());
        for (idx, agent) in self.agents.iter().enumerate() {
            let context = OrderContext {
                time: self.time,
                action,
                agent,
                supplier_backlog: self
                    .agents
                    .get(idx + 1)
                    .map_or(0, |supplier| supplier.customer_orders_to_be_filled),
                max_action: self.max_action,
            };
            let order = agent
                .policy
                .get_order(&context, &mut self.rng, self.input.as_mut())
                .map_err(|source| SimulationError::Policy { agent: idx, source })?;
            orders.push(order.min(self.max_action));
        }
        Ok(orders)
    }

    /// Books `order` for agent `idx` and sends it upstream. The manufacturer
    /// has no supplier and ships to itself.
    fn place_order(&mut self, idx: usize, order: i64) {
        let time = self.time;
        self.agents[idx].commit_order(time, order);
        match self.supplier_of(idx) {
            Some(supplier) => {
                self.agents[supplier].plan_order(time, order, &mut self.rng);
            }
            None => {
                self.agents[idx].plan_shipment(time, order, &mut self.rng);
            }
        }
    }

    /// Ships what agent `idx` can. The retailer ships to end customers.
    fn deliver_items(&mut self, idx: usize) {
        let time = self.time;
        let shipped = self.agents[idx].deliver_items();
        match self.customer_of(idx) {
            Some(customer) => {
                self.agents[customer].plan_shipment(time, shipped, &mut self.rng);
            }
            None => {
                self.total_delivered += shipped;
                self.outstanding_demand -= shipped;
            }
        }
    }

    fn record_history(&mut self) {
        for agent in &self.agents {
            self.history.push(HistoryRecord {
                time: self.time,
                agent_num: agent.agent_num,
                role: format!("{:?}", agent.role),
                demand: self.last_demand,
                inventory: agent.inventory_level,
                backlog: agent.customer_orders_to_be_filled,
                supply_line: agent.supplier_orders_to_be_delivered,
                order_placed: agent.last_order_placed,
                order_received: agent.last_order_received,
                shipment_received: agent.last_shipment_received,
                shipment_sent: agent.last_shipment_sent,
                cost: agent.current_costs,
                total_cost: agent.total_costs,
            });
        }
    }

    pub fn state(&self) -> ChainState {
        let agents = &self.agents;
        ChainState {
            inventory_levels: agents.iter().map(|a| a.inventory_level).collect(),
            customer_orders_to_be_filled: agents
                .iter()
                .map(|a| a.customer_orders_to_be_filled)
                .collect(),
            supplier_orders_to_be_delivered: agents
                .iter()
                .map(|a| a.supplier_orders_to_be_delivered)
                .collect(),
            current_costs: agents.iter().map(|a| a.current_costs).collect(),
            total_costs: agents.iter().map(|a| a.total_costs).collect(),
            cumulative_costs: self.total_supply_chain_cost(),
            total_delivered: self.total_delivered,
            outstanding_demand: self.outstanding_demand,
            time: self.time,
        }
    }

    pub fn agent_state(&self, idx: usize) -> Option<AgentState> {
        self.agents.get(idx).map(|agent| agent.state(self.time))
    }

    /// Cost the whole chain has accrued so far.
    pub fn total_supply_chain_cost(&self) -> f64 {
        self.agents.iter().map(|a| a.total_costs).sum()
    }

    /// Accrued cost per stage.
    pub fn cost_breakdown(&self) -> Vec<(String, f64)> {
        self.agents
            .iter()
            .map(|a| (format!("{:?}", a.role), a.total_costs))
            .collect()
    }
}
