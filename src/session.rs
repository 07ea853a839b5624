//! Episode contract between the chain and an outside orchestrator.
//!
//! The orchestrator starts episodes with a flat mapping of overrides,
//! steps them with an action payload and reads back the chain snapshot.
//! Transport, registration and retries live on the other side.

use crate::error::SimulationError;
use crate::simulation::config::ChainConfig;
use crate::simulation::engine::{Chain, ChainState};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Key in the action payload carrying the order quantity.
pub const ACTION_KEY: &str = "order";

pub struct EpisodeSession {
    simulator: Chain,
    env_name: String,
}

impl EpisodeSession {
    pub fn new(env_name: impl Into<String>, seed: u64) -> Self {
        Self {
            simulator: Chain::new(seed),
            env_name: env_name.into(),
        }
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn simulator(&self) -> &Chain {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut Chain {
        &mut self.simulator
    }

    /// Starts an episode.
    ///
    /// `agent_type1`, `agent_type2`, ... replace single positions of
    /// `agent_types`, 1-based.
    pub fn episode_start(&mut self, config: Value) -> Result<(), SimulationError> {
        let mut overrides = match config {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(SimulationError::Action(format!(
                    "episode config must be a mapping, got {other}"
                )))
            }
        };
        fold_agent_types(&mut overrides);

        let overrides = Value::Object(overrides);
        info!(env = %self.env_name, config = %overrides, "starting episode");
        self.simulator.reset(ChainConfig::from_overrides(&overrides)?)?;
        Ok(())
    }

    /// Applies one action payload, e.g. `{"order": 3}`.
    pub fn episode_step(&mut self, action: &Value) -> Result<(), SimulationError> {
        debug!(%action, "episode step");
        let order = action
            .get(ACTION_KEY)
            .and_then(integral_order)
            .ok_or_else(|| {
                SimulationError::Action(format!("missing integer {ACTION_KEY:?} in {action}"))
            })?;
        self.simulator.step(Some(order))
    }

    pub fn get_state(&self) -> ChainState {
        let state = self.simulator.state();
        debug!(?state, "current state");
        state
    }

    /// Only an unexpected simulator state would halt an episode. There is none.
    pub fn halted(&self) -> bool {
        false
    }
}

/// Whole numbers only; `2` and `2.0` pass, `2.7` does not.
fn integral_order(value: &Value) -> Option<i64> {
    if let Some(order) = value.as_i64() {
        return Some(order);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

/// Moves `agent_typeN` keys into the `agent_types` list.
///
/// A present `agent_types` that is not a list is left alone for the
/// config parser to reject.
fn fold_agent_types(overrides: &mut Map<String, Value>) {
    let mut types = match overrides.get("agent_types") {
        Some(Value::Array(types)) => types.clone(),
        Some(_) => return,
        None => serde_json::to_value(ChainConfig::default().agent_types)
            .ok()
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default(),
    };

    for (idx, slot) in types.iter_mut().enumerate() {
        if let Some(kind) = overrides.remove(&format!("agent_type{}", idx + 1)) {
            *slot = kind;
        }
    }
    overrides.insert("agent_types".to_string(), Value::Array(types));
}
