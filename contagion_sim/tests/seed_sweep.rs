//! Scenario invariants must hold for every seed, not just the default one.

use contagion_core::ExecutionMode;
use contagion_sim::{ScenarioId, ScenarioRunner};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_invariant_scenarios_pass(seed in any::<u64>()) {
        for scenario in [
            ScenarioId::NoTransmission,
            ScenarioId::StrictQuarantine,
            ScenarioId::NoQuarantine,
            ScenarioId::MultiSeed,
        ] {
            let result = ScenarioRunner::new(seed).with_ticks(40).run(scenario).unwrap();
            prop_assert!(result.passed, "{} seed={}: {:?}", scenario, seed, result.failure_reason);
        }
    }

    #[test]
    fn prop_execution_mode_irrelevant(seed in any::<u64>()) {
        let sequential = ScenarioRunner::new(seed).with_ticks(30).run(ScenarioId::Baseline).unwrap();
        let parallel = ScenarioRunner::new(seed)
            .with_ticks(30)
            .with_execution(ExecutionMode::Parallel)
            .run(ScenarioId::Baseline)
            .unwrap();

        prop_assert_eq!(sequential.curve, parallel.curve);
    }
}

#[test]
fn test_full_transmission_reaches_everyone() {
    for seed in [1, 2, 3] {
        let result = ScenarioRunner::new(seed).run(ScenarioId::FullTransmission).unwrap();
        assert!(result.passed, "seed={}: {:?}", seed, result.failure_reason);
        assert_eq!(result.attack_rate(), 1.0);
    }
}
