// src/simulation/config.rs

use crate::error::ConfigError;
use crate::strategy::traits::PolicyKind;
use serde::{Deserialize, Serialize};

/// Lower bound of `max_action` when demand is uniform.
const UNIFORM_ACTION_FLOOR: i64 = 48;
/// Lower bound of `max_action` for every other demand distribution.
const WIDE_ACTION_FLOOR: i64 = 112;

/// Longest lead time a reset accepts, in ticks.
pub const MAX_LEAD_TIME: u64 = 10_000;
/// Largest magnitude accepted for demand parameters, initial stock and `action_high`.
pub const MAX_QUANTITY: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandKind {
    Uniform,
    Normal,
    Pattern,
}

/// Everything a reset may override. Field names double as override keys.
///
/// Deserialization fills missing keys from [`ChainConfig::default`] and
/// ignores keys it does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub demand_distribution: DemandKind,
    pub demand_low: i64,
    pub demand_high: i64,
    pub demand_mu: f64,
    pub demand_sigma: f64,
    pub demand_pattern_initial_value: i64,
    pub demand_pattern_stepped_value: i64,
    pub demand_pattern_step_time: u64,

    pub action_high: i64,

    pub agent_types: Vec<PolicyKind>,
    pub costs_shortage: Vec<f64>,
    pub costs_holding: Vec<f64>,
    pub strm_alpha: Vec<f64>,
    pub strm_beta: Vec<f64>,
    pub leadtime_receiving_low: Vec<u64>,
    pub leadtime_receiving_high: Vec<u64>,
    pub leadtime_orders_low: Vec<u64>,
    pub leadtime_orders_high: Vec<u64>,
    pub inventory_initial: Vec<i64>,
    pub arriving_orders_initial: Vec<i64>,
    pub arriving_shipments_initial: Vec<i64>,

    /// Reseeds the chain's generator on reset when present.
    pub seed: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            demand_distribution: DemandKind::Uniform,
            demand_low: 0,
            demand_high: 3,
            demand_mu: 10.0,
            demand_sigma: 2.0,
            demand_pattern_initial_value: 4,
            demand_pattern_stepped_value: 8,
            demand_pattern_step_time: 7,
            action_high: 2,
            agent_types: vec![
                PolicyKind::External,
                PolicyKind::BaseStock,
                PolicyKind::BaseStock,
                PolicyKind::BaseStock,
            ],
            costs_shortage: vec![2.0, 0.0, 0.0, 0.0],
            costs_holding: vec![2.0, 2.0, 2.0, 2.0],
            strm_alpha: vec![-0.5; 4],
            strm_beta: vec![-0.2; 4],
            leadtime_receiving_low: vec![2, 2, 2, 4],
            leadtime_receiving_high: vec![2, 2, 2, 4],
            leadtime_orders_low: vec![2, 2, 2, 0],
            leadtime_orders_high: vec![2, 2, 2, 0],
            inventory_initial: vec![0; 4],
            arriving_orders_initial: vec![0; 4],
            arriving_shipments_initial: vec![0; 4],
            seed: None,
        }
    }
}

impl ChainConfig {
    /// Parses a mapping of named overrides on top of the defaults.
    pub fn from_overrides(overrides: &serde_json::Value) -> Result<Self, ConfigError> {
        let config: ChainConfig = serde_json::from_value(overrides.clone())?;
        config.validate()?;
        Ok(config)
    }

    pub fn num_agents(&self) -> usize {
        self.agent_types.len()
    }

    /// Upper bound applied to every committed order.
    pub fn max_action(&self) -> i64 {
        let floor = match self.demand_distribution {
            DemandKind::Uniform => UNIFORM_ACTION_FLOOR,
            DemandKind::Normal | DemandKind::Pattern => WIDE_ACTION_FLOOR,
        };
        (3 * self.action_high + 1).max(floor)
    }

    /// Mean demand per tick under the configured distribution.
    pub fn demand_mean(&self) -> f64 {
        match self.demand_distribution {
            DemandKind::Uniform => (self.demand_low + self.demand_high) as f64 / 2.0,
            DemandKind::Normal => self.demand_mu,
            DemandKind::Pattern => {
                (self.demand_pattern_initial_value + self.demand_pattern_stepped_value) as f64
                    / 2.0
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.num_agents();
        if n == 0 {
            return Err(ConfigError::NoAgents);
        }

        check_len("costs_shortage", n, self.costs_shortage.len())?;
        check_len("costs_holding", n, self.costs_holding.len())?;
        check_len("strm_alpha", n, self.strm_alpha.len())?;
        check_len("strm_beta", n, self.strm_beta.len())?;
        check_len("leadtime_receiving_low", n, self.leadtime_receiving_low.len())?;
        check_len("leadtime_receiving_high", n, self.leadtime_receiving_high.len())?;
        check_len("leadtime_orders_low", n, self.leadtime_orders_low.len())?;
        check_len("leadtime_orders_high", n, self.leadtime_orders_high.len())?;
        check_len("inventory_initial", n, self.inventory_initial.len())?;
        check_len("arriving_orders_initial", n, self.arriving_orders_initial.len())?;
        check_len("arriving_shipments_initial", n, self.arriving_shipments_initial.len())?;

        for agent in 0..n {
            check_range(
                "leadtime_receiving",
                agent,
                self.leadtime_receiving_low[agent],
                self.leadtime_receiving_high[agent],
            )?;
            check_range(
                "leadtime_orders",
                agent,
                self.leadtime_orders_low[agent],
                self.leadtime_orders_high[agent],
            )?;
            check_lead_time("leadtime_receiving_high", agent, self.leadtime_receiving_high[agent])?;
            check_lead_time("leadtime_orders_high", agent, self.leadtime_orders_high[agent])?;
            check_cost("costs_shortage", agent, self.costs_shortage[agent])?;
            check_cost("costs_holding", agent, self.costs_holding[agent])?;
            check_initial("inventory_initial", agent, self.inventory_initial[agent])?;
            check_initial("arriving_orders_initial", agent, self.arriving_orders_initial[agent])?;
            check_initial(
                "arriving_shipments_initial",
                agent,
                self.arriving_shipments_initial[agent],
            )?;
        }

        match self.demand_distribution {
            DemandKind::Uniform => {
                check_demand("demand_low", self.demand_low)?;
                check_demand("demand_high", self.demand_high)?;
                if self.demand_low > self.demand_high {
                    return Err(ConfigError::InvalidDemandRange {
                        low: self.demand_low,
                        high: self.demand_high,
                    });
                }
            }
            DemandKind::Normal => {
                if !(self.demand_mu.is_finite() && self.demand_mu.abs() <= MAX_QUANTITY as f64) {
                    return Err(ConfigError::InvalidDemandMu(self.demand_mu));
                }
                if !(self.demand_sigma.is_finite()
                    && (0.0..=MAX_QUANTITY as f64).contains(&self.demand_sigma))
                {
                    return Err(ConfigError::InvalidDemandSigma(self.demand_sigma));
                }
            }
            DemandKind::Pattern => {
                check_demand("demand_pattern_initial_value", self.demand_pattern_initial_value)?;
                check_demand("demand_pattern_stepped_value", self.demand_pattern_stepped_value)?;
            }
        }

        if self.action_high < 0 {
            return Err(ConfigError::NegativeActionHigh(self.action_high));
        }
        check_bound("action_high", self.action_high)?;
        Ok(())
    }
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), ConfigError> {
    if expected == found {
        Ok(())
    } else {
        Err(ConfigError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}

fn check_range(field: &'static str, agent: usize, low: u64, high: u64) -> Result<(), ConfigError> {
    if low <= high {
        Ok(())
    } else {
        Err(ConfigError::InvalidLeadTime {
            field,
            agent,
            low,
            high,
        })
    }
}

fn check_cost(field: &'static str, agent: usize, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeCost { field, agent, value })
    }
}

fn check_lead_time(field: &'static str, agent: usize, value: u64) -> Result<(), ConfigError> {
    if value <= MAX_LEAD_TIME {
        Ok(())
    } else {
        Err(ConfigError::LeadTimeTooLong {
            field,
            agent,
            value,
            max: MAX_LEAD_TIME,
        })
    }
}

fn check_bound(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value.unsigned_abs() <= MAX_QUANTITY as u64 {
        Ok(())
    } else {
        Err(ConfigError::OutOfBounds {
            field,
            value,
            max: MAX_QUANTITY,
        })
    }
}

fn check_initial(field: &'static str, agent: usize, value: i64) -> Result<(), ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeInitial { field, agent, value });
    }
    check_bound(field, value)
}

fn check_demand(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeDemand { field, value });
    }
    check_bound(field, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_validate() {
        let config = ChainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_agents(), 4);
    }

    #[test]
    fn max_action_uses_the_distribution_floor() {
        let mut config = ChainConfig::default();
        assert_eq!(config.max_action(), 48);

        config.demand_distribution = DemandKind::Normal;
        assert_eq!(config.max_action(), 112);

        config.action_high = 50;
        assert_eq!(config.max_action(), 151);
    }

    #[test]
    fn overrides_fill_missing_keys_and_ignore_unknown_ones() {
        let config = ChainConfig::from_overrides(&json!({
            "demand_distribution": "normal",
            "demand_mu": 12.5,
            "not_a_setting": [1, 2, 3],
        }))
        .unwrap();

        assert_eq!(config.demand_distribution, DemandKind::Normal);
        assert_eq!(config.demand_mu, 12.5);
        assert_eq!(config.demand_sigma, 2.0);
        assert_eq!(config.agent_types, ChainConfig::default().agent_types);
    }

    #[test]
    fn policy_aliases_are_accepted() {
        let config = ChainConfig::from_overrides(&json!({
            "agent_types": ["bonsai", "strm", "random", "manual"],
        }))
        .unwrap();
        assert_eq!(
            config.agent_types,
            vec![
                PolicyKind::External,
                PolicyKind::Strm,
                PolicyKind::Random,
                PolicyKind::Interactive,
            ]
        );
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = ChainConfig::from_overrides(&json!({ "costs_holding": [1, 1] })).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LengthMismatch {
                field: "costs_holding",
                expected: 4,
                found: 2
            }
        ));
    }

    #[test]
    fn shorter_chains_need_every_array_resized() {
        let err = ChainConfig::from_overrides(&json!({ "agent_types": ["external", "basestock"] }))
            .unwrap_err();
        assert!(matches!(err, ConfigError::LengthMismatch { expected: 2, .. }));
    }

    #[test]
    fn inverted_lead_time_is_rejected() {
        let err = ChainConfig::from_overrides(&json!({
            "leadtime_orders_low": [3, 2, 2, 0],
            "leadtime_orders_high": [1, 2, 2, 0],
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidLeadTime {
                field: "leadtime_orders",
                agent: 0,
                ..
            }
        ));
    }

    #[test]
    fn wrong_types_are_malformed() {
        let err = ChainConfig::from_overrides(&json!({ "demand_low": "zero" })).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn bad_demand_parameters_are_rejected() {
        let err = ChainConfig::from_overrides(&json!({ "demand_low": 5, "demand_high": 1 }))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDemandRange { low: 5, high: 1 }));

        let err = ChainConfig::from_overrides(&json!({
            "demand_distribution": "normal",
            "demand_sigma": -1.0,
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDemandSigma(_)));
    }

    #[test]
    fn demand_mean_follows_the_distribution() {
        let mut config = ChainConfig::default();
        assert_eq!(config.demand_mean(), 1.5);
        config.demand_distribution = DemandKind::Pattern;
        assert_eq!(config.demand_mean(), 6.0);
        config.demand_distribution = DemandKind::Normal;
        assert_eq!(config.demand_mean(), 10.0);
    }

    #[test]
    fn oversized_values_are_rejected() {
        let err = ChainConfig::from_overrides(&json!({ "action_high": i64::MAX })).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfBounds { field: "action_high", .. }));

        let err = ChainConfig::from_overrides(&json!({
            "leadtime_receiving_low": [2, 2, 2, u64::MAX],
            "leadtime_receiving_high": [2, 2, 2, u64::MAX],
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LeadTimeTooLong {
                field: "leadtime_receiving_high",
                agent: 3,
                ..
            }
        ));

        let err = ChainConfig::from_overrides(&json!({
            "leadtime_orders_low": [0, 0, 0, 0],
            "leadtime_orders_high": [0, MAX_LEAD_TIME + 1, 0, 0],
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::LeadTimeTooLong { agent: 1, .. }));

        let err = ChainConfig::from_overrides(&json!({ "demand_high": i64::MAX })).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfBounds { field: "demand_high", .. }));

        let err = ChainConfig::from_overrides(&json!({
            "demand_distribution": "normal",
            "demand_mu": 1e300,
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDemandMu(_)));
    }

    #[test]
    fn limits_themselves_are_accepted() {
        let config = ChainConfig::from_overrides(&json!({
            "action_high": MAX_QUANTITY,
            "leadtime_orders_low": [0, 0, 0, 0],
            "leadtime_orders_high": [MAX_LEAD_TIME, 2, 2, 0],
        }))
        .unwrap();
        assert_eq!(config.max_action(), 3 * MAX_QUANTITY + 1);
    }

    #[test]
    fn negative_initial_values_are_rejected() {
        let err = ChainConfig::from_overrides(&json!({ "inventory_initial": [-3, 0, 0, 0] }))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NegativeInitial {
                field: "inventory_initial",
                agent: 0,
                value: -3
            }
        ));

        let err = ChainConfig::from_overrides(&json!({ "arriving_shipments_initial": [0, 0, -1, 0] }))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NegativeInitial { agent: 2, .. }));

        let err = ChainConfig::from_overrides(&json!({ "arriving_orders_initial": [0, -2, 0, 0] }))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NegativeInitial { agent: 1, .. }));
    }

    #[test]
    fn negative_demand_bounds_are_rejected() {
        let err = ChainConfig::from_overrides(&json!({ "demand_low": -5 })).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NegativeDemand {
                field: "demand_low",
                value: -5
            }
        ));

        let err = ChainConfig::from_overrides(&json!({
            "demand_distribution": "pattern",
            "demand_pattern_stepped_value": -8,
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NegativeDemand {
                field: "demand_pattern_stepped_value",
                ..
            }
        ));

        // Unused fields are not checked.
        assert!(ChainConfig::from_overrides(&json!({
            "demand_distribution": "normal",
            "demand_low": -5,
        }))
        .is_ok());
    }
}
