use crate::model::ledger::TimeLedger;
use crate::simulation::config::ChainConfig;
use crate::strategy::traits::OrderPolicy;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// How far ahead [`Agent::state`] reports upcoming arrivals.
pub const ARRIVAL_HORIZON: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgentRole {
    Retailer,
    Wholesaler,
    Distributor,
    Manufacturer,
}

impl AgentRole {
    /// Role label for position `agent_num` in a chain of `num_agents`.
    pub fn for_position(agent_num: usize, num_agents: usize) -> Self {
        match agent_num {
            0 => AgentRole::Retailer,
            n if n + 1 == num_agents => AgentRole::Manufacturer,
            1 => AgentRole::Wholesaler,
            _ => AgentRole::Distributor,
        }
    }
}

/// Closed range of extra delay ticks, sampled per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeadTime {
    pub low: u64,
    pub high: u64,
}

impl LeadTime {
    pub fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    pub fn sample(&self, rng: &mut StdRng) -> u64 {
        rng.gen_range(self.low..=self.high)
    }

    pub fn mean(&self) -> f64 {
        (self.low as f64 + self.high as f64) / 2.0
    }
}

/// Set-points the proportional feedback policy steers toward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    /// Target inventory (`a_b`).
    pub inventory: f64,
    /// Target backlog (`b_b`).
    pub backlog: f64,
}

impl Baseline {
    pub fn new(demand_mean: f64, mean_leadtime: f64) -> Self {
        Self {
            inventory: demand_mean,
            backlog: demand_mean * mean_leadtime,
        }
    }
}

/// Read-only view of one agent, as handed to observers and manual players.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentState {
    pub agent_num: usize,
    pub role: AgentRole,
    pub inventory_level: i64,
    pub customer_orders_to_be_filled: i64,
    pub supplier_orders_to_be_delivered: i64,
    /// Shipments landing in the next few ticks, keyed by offset from now.
    pub arriving_shipments: BTreeMap<u64, i64>,
    /// Orders landing in the next few ticks, keyed by offset from now.
    pub arriving_orders: BTreeMap<u64, i64>,
    pub current_costs: f64,
    pub total_costs: f64,
}

/// The state of a single node in the supply chain.
#[derive(Debug)]
pub struct Agent {
    // Identity
    pub agent_num: usize,
    pub role: AgentRole,

    // State Variables
    pub inventory_level: i64,
    pub customer_orders_to_be_filled: i64,
    pub supplier_orders_to_be_delivered: i64,

    // In-transit, keyed by absolute arrival time
    pub arriving_shipments: TimeLedger,
    pub arriving_orders: TimeLedger,
    /// What this agent ordered, keyed by the tick it ordered at.
    pub previous_orders: TimeLedger,

    pub current_costs: f64,
    pub total_costs: f64,

    // Fixed for the run
    pub holding_cost: f64,
    pub shortage_cost: f64,
    pub leadtime_orders: LeadTime,
    pub leadtime_receiving: LeadTime,
    pub baseline: Baseline,

    // Tracking for Analysis/Logging
    pub last_order_placed: i64,
    pub last_order_received: i64,
    pub last_shipment_received: i64,
    pub last_shipment_sent: i64,

    pub policy: Box<dyn OrderPolicy>,
}

impl Agent {
    /// Builds the agent at `agent_num` from an already validated config.
    pub fn new(agent_num: usize, config: &ChainConfig, policy: Box<dyn OrderPolicy>) -> Self {
        let leadtime_orders = LeadTime::new(
            config.leadtime_orders_low[agent_num],
            config.leadtime_orders_high[agent_num],
        );
        let leadtime_receiving = LeadTime::new(
            config.leadtime_receiving_low[agent_num],
            config.leadtime_receiving_high[agent_num],
        );

        // Pre-fill the pipelines so the chain does not start empty.
        let mut arriving_shipments = TimeLedger::new();
        for t in 1..leadtime_receiving.low {
            arriving_shipments.set(t, config.arriving_shipments_initial[agent_num]);
        }
        let mut arriving_orders = TimeLedger::new();
        if agent_num > 0 {
            for t in 1..leadtime_orders.low {
                arriving_orders.set(t, config.arriving_orders_initial[agent_num]);
            }
        }

        let baseline = Baseline::new(
            config.demand_mean(),
            leadtime_receiving.mean() + leadtime_orders.mean(),
        );

        Self {
            agent_num,
            role: AgentRole::for_position(agent_num, config.num_agents()),
            inventory_level: config.inventory_initial[agent_num],
            customer_orders_to_be_filled: 0,
            supplier_orders_to_be_delivered: 0,
            arriving_shipments,
            arriving_orders,
            previous_orders: TimeLedger::new(),
            current_costs: 0.0,
            total_costs: 0.0,
            holding_cost: config.costs_holding[agent_num],
            shortage_cost: config.costs_shortage[agent_num],
            leadtime_orders,
            leadtime_receiving,
            baseline,
            last_order_placed: 0,
            last_order_received: 0,
            last_shipment_received: 0,
            last_shipment_sent: 0,
            policy,
        }
    }

    /// Books an order this agent decided on at `time`.
    ///
    /// The chain routes it upstream, or back to this agent for the manufacturer.
    pub fn commit_order(&mut self, time: u64, order: i64) {
        self.previous_orders.set(time, order);
        self.supplier_orders_to_be_delivered += order;
        self.last_order_placed = order;
    }

    /// Step 1: Receive goods from the upstream supplier.
    /// Returns the quantity that landed.
    pub fn receive_items(&mut self, time: u64) -> i64 {
        let shipment = self.arriving_shipments.get(time);
        self.inventory_level += shipment;
        self.supplier_orders_to_be_delivered -= shipment;
        self.last_shipment_received = shipment;
        shipment
    }

    /// Step 2: Add orders from downstream to the backlog.
    pub fn receive_order(&mut self, time: u64) -> i64 {
        let order = self.arriving_orders.get(time);
        self.customer_orders_to_be_filled += order;
        self.last_order_received = order;
        order
    }

    /// Step 3: Ship as much of the backlog as inventory allows.
    ///
    /// Returns the quantity shipped downstream.
    pub fn deliver_items(&mut self) -> i64 {
        let shipped = self.inventory_level.min(self.customer_orders_to_be_filled);
        self.inventory_level -= shipped;
        self.customer_orders_to_be_filled -= shipped;
        self.last_shipment_sent = shipped;
        shipped
    }

    /// Step 4: Charge holding and shortage costs for this tick.
    pub fn update_costs(&mut self) {
        self.current_costs = self.shortage_cost * self.customer_orders_to_be_filled.max(0) as f64
            + self.holding_cost * self.inventory_level.max(0) as f64;
        self.total_costs += self.current_costs;
    }

    /// Schedules an inbound shipment at least one tick after `time`.
    /// Returns the arrival time.
    pub fn plan_shipment(&mut self, time: u64, amount: i64, rng: &mut StdRng) -> u64 {
        let arrival = time.saturating_add(self.leadtime_receiving.sample(rng)).saturating_add(1);
        self.arriving_shipments.add(arrival, amount);
        arrival
    }

    /// Schedules an inbound order at least one tick after `time`.
    /// Returns the arrival time.
    pub fn plan_order(&mut self, time: u64, amount: i64, rng: &mut StdRng) -> u64 {
        let arrival = time.saturating_add(self.leadtime_orders.sample(rng)).saturating_add(1);
        self.arriving_orders.add(arrival, amount);
        arrival
    }

    /// Orders that landed in `[time - window, time]`.
    pub fn recent_orders_received(&self, time: u64, window: u64) -> impl Iterator<Item = i64> + '_ {
        self.arriving_orders
            .window(time.saturating_sub(window), time)
            .map(|(_, q)| q)
    }

    /// Own orders placed in `[time - window, time]`.
    pub fn recent_orders_placed(&self, time: u64, window: u64) -> impl Iterator<Item = i64> + '_ {
        self.previous_orders
            .window(time.saturating_sub(window), time)
            .map(|(_, q)| q)
    }

    /// Drops arrival entries that no policy will look at again.
    pub fn prune_ledgers(&mut self, cutoff: u64) {
        self.arriving_shipments.prune_before(cutoff);
        self.arriving_orders.prune_before(cutoff);
    }

    pub fn state(&self, time: u64) -> AgentState {
        debug!(
            agent = self.agent_num,
            inventory = self.inventory_level,
            backlog = self.customer_orders_to_be_filled,
            supply_line = self.supplier_orders_to_be_delivered,
            current_costs = self.current_costs,
            total_costs = self.total_costs,
            "agent state"
        );
        AgentState {
            agent_num: self.agent_num,
            role: self.role,
            inventory_level: self.inventory_level,
            customer_orders_to_be_filled: self.customer_orders_to_be_filled,
            supplier_orders_to_be_delivered: self.supplier_orders_to_be_delivered,
            arriving_shipments: self.arriving_shipments.upcoming(time, ARRIVAL_HORIZON),
            arriving_orders: self.arriving_orders.upcoming(time, ARRIVAL_HORIZON),
            current_costs: self.current_costs,
            total_costs: self.total_costs,
        }
    }
}
