//! Invariants that must hold for any seed, policy mix and action stream.

use beer_game_sim::{Chain, ChainConfig, DemandKind, PolicyKind};
use proptest::prelude::*;

fn policy() -> impl Strategy<Value = PolicyKind> {
    prop_oneof![
        Just(PolicyKind::External),
        Just(PolicyKind::Strm),
        Just(PolicyKind::BaseStock),
        Just(PolicyKind::Random),
    ]
}

fn lead_time() -> impl Strategy<Value = (u64, u64)> {
    (0u64..4, 0u64..3).prop_map(|(low, extra)| (low, low + extra))
}

prop_compose! {
    fn chain_config()(
        agent_types in prop::collection::vec(policy(), 4),
        receiving in prop::collection::vec(lead_time(), 4),
        ordering in prop::collection::vec(lead_time(), 4),
        pattern in any::<bool>(),
        demand_high in 0i64..12,
        seed in any::<u64>(),
    ) -> ChainConfig {
        ChainConfig {
            demand_distribution: if pattern { DemandKind::Pattern } else { DemandKind::Uniform },
            demand_high,
            agent_types,
            leadtime_receiving_low: receiving.iter().map(|r| r.0).collect(),
            leadtime_receiving_high: receiving.iter().map(|r| r.1).collect(),
            leadtime_orders_low: ordering.iter().map(|r| r.0).collect(),
            leadtime_orders_high: ordering.iter().map(|r| r.1).collect(),
            seed: Some(seed),
            ..ChainConfig::default()
        }
    }
}

proptest! {
    #[test]
    fn chain_invariants_hold(
        config in chain_config(),
        actions in prop::collection::vec(0i64..200, 1..60),
    ) {
        let mut chain = Chain::with_config(config, 0).unwrap();
        let max_action = chain.max_action();
        let mut previous_totals = vec![0.0; chain.num_agents()];

        for action in actions {
            let time = chain.time;
            chain.step(Some(action)).unwrap();

            prop_assert!(chain.outstanding_demand >= 0);
            prop_assert!(chain.total_delivered >= 0);
            prop_assert!(chain.total_delivered <= chain.total_demand);
            for (agent, previous) in chain.agents.iter().zip(previous_totals.iter_mut()) {
                prop_assert!(agent.inventory_level >= 0);
                prop_assert!(agent.customer_orders_to_be_filled >= 0);
                prop_assert!(agent.supplier_orders_to_be_delivered >= 0);
                prop_assert!(agent.current_costs >= 0.0);
                prop_assert!(agent.total_costs >= *previous);
                *previous = agent.total_costs;

                let order = agent.previous_orders.get(time);
                prop_assert!((0..=max_action).contains(&order));
            }
        }
    }

    #[test]
    fn external_orders_matching_demand_drain_completely(
        receiving in prop::collection::vec(lead_time(), 4),
        ordering in prop::collection::vec(lead_time(), 4),
        demand in 0i64..6,
        steps in 1u64..30,
        seed in any::<u64>(),
    ) {
        let config = ChainConfig {
            demand_distribution: DemandKind::Pattern,
            demand_pattern_initial_value: demand,
            demand_pattern_stepped_value: 0,
            demand_pattern_step_time: steps,
            agent_types: vec![PolicyKind::External; 4],
            leadtime_receiving_low: receiving.iter().map(|r| r.0).collect(),
            leadtime_receiving_high: receiving.iter().map(|r| r.1).collect(),
            leadtime_orders_low: ordering.iter().map(|r| r.0).collect(),
            leadtime_orders_high: ordering.iter().map(|r| r.1).collect(),
            seed: Some(seed),
            ..ChainConfig::default()
        };
        let mut chain = Chain::with_config(config, 0).unwrap();
        for _ in 0..steps {
            chain.step(Some(demand)).unwrap();
        }
        // Longest round trip: four order hops, a self-shipment and four shipment hops.
        for _ in 0..60 {
            chain.step(Some(0)).unwrap();
        }

        let ordered = demand * steps as i64;
        prop_assert_eq!(chain.total_demand, ordered);
        prop_assert_eq!(chain.total_delivered, ordered);
        prop_assert_eq!(chain.outstanding_demand, 0);
        for agent in &chain.agents {
            prop_assert_eq!(agent.inventory_level, 0);
            prop_assert_eq!(agent.customer_orders_to_be_filled, 0);
            prop_assert_eq!(agent.supplier_orders_to_be_delivered, 0);
        }
    }

    #[test]
    fn snapshots_do_not_move_the_chain(seed in any::<u64>(), steps in 0usize..20) {
        let mut chain = Chain::new(seed);
        for _ in 0..steps {
            chain.step(Some(1)).unwrap();
        }
        let first = chain.state();
        let _ = chain.agent_state(0);
        prop_assert_eq!(chain.state(), first);
    }
}
