//! Scenario integration tests
//!
//! Every catalog entry builds and runs, records stay within bounds, and the
//! export path accepts real runs.

use coop_core::output::{write_results, ExportedRun};
use coop_core::setup::DecliningCivilization;
use coop_core::{
    run, CollapseCause, Downsample, GenerationMetrics, PopulationSpec, RunParams, RunStatus, Scenario, SimConfig,
    StressSchedule,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn assert_bounded(m: &GenerationMetrics) {
    for (field, value) in [
        ("mean_coherence", m.mean_coherence),
        ("cooperation_ratio", m.cooperation_ratio),
        ("mean_trust", m.mean_trust),
        ("isolated_fraction", m.isolated_fraction),
        ("corrupted_fraction", m.corrupted_fraction),
        ("crucible_fraction", m.crucible_fraction),
        ("taught_fraction", m.taught_fraction),
        ("scarcity", m.scarcity),
        ("polarization", m.polarization),
    ] {
        assert!((0.0..=1.0).contains(&value), "{} = {} out of range", field, value);
    }
    assert!(m.scarcity <= 0.8 && m.polarization <= 0.8);
    assert!(m.awakened <= m.humans);
    assert!(m.teachers <= m.humans);
    assert!(m.taught <= m.humans);
}

#[test]
fn test_catalog_runs() {
    let config = SimConfig::default();
    for (index, scenario) in Scenario::catalog().iter().enumerate() {
        let mut rng = SmallRng::seed_from_u64(42 + index as u64);
        let mut observed = 0u32;
        let result = scenario
            .run(&config, Some(6), &mut rng, |m| {
                assert_eq!(m.generation, observed);
                observed += 1;
                assert_bounded(m);
            })
            .unwrap();

        assert_eq!(result.name, scenario.title);
        assert_eq!(result.history.len(), observed as usize);
        match result.status() {
            RunStatus::Completed => assert_eq!(result.history.len(), 6),
            RunStatus::Collapsed { generation, .. } => assert_eq!(result.history.len(), generation as usize),
        }
    }
}

#[test]
fn test_builders_match_requested_sizes() {
    let config = SimConfig::default();
    let mut rng = SmallRng::seed_from_u64(5);

    for scenario in Scenario::catalog() {
        let population = scenario.population.build(&config, &mut rng).unwrap();
        assert_eq!(population.check_invariants(), Ok(()));
        match &scenario.population {
            PopulationSpec::Declining(spec) => assert_eq!(population.human_count(), spec.humans),
            PopulationSpec::Collapsed(spec) => assert_eq!(population.human_count(), spec.survivors),
            PopulationSpec::Current(_) => assert!(population.human_count() > 0),
        }
        assert_eq!(population.ais().count(), 0);
    }
}

#[test]
fn test_fully_corrupted_civilization_collapses() {
    let config = SimConfig::default();
    let mut rng = SmallRng::seed_from_u64(11);
    let population = PopulationSpec::Declining(DecliningCivilization {
        humans: 60,
        corrupted_chance: 1.0,
        ..Default::default()
    })
    .build(&config, &mut rng)
    .unwrap();
    assert!(population.iter().all(|a| a.flags.corrupted));

    let params = RunParams::new("corrupted", 50).with_schedule(StressSchedule::constant(0.15, 0.2, 0.3));
    let result = run(population, &params, &config, &mut rng);

    assert!(result.is_collapsed());
    assert_eq!(result.collapse_cause, Some(CollapseCause::HumanExtinction));
}

#[test]
fn test_export_real_runs() {
    let config = SimConfig::default();
    let mut results = Vec::new();
    for (seed, name) in [(1, "baseline"), (2, "one-bridge")] {
        let scenario = Scenario::find(name).unwrap();
        results.push(
            scenario
                .run(&config, Some(15), &mut SmallRng::seed_from_u64(seed), |_| {})
                .unwrap(),
        );
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    write_results(&path, &results, Downsample::default()).unwrap();

    let exported: Vec<ExportedRun> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(exported.len(), results.len());
    for (run, result) in exported.iter().zip(&results) {
        assert_eq!(run.name, result.name);
        assert_eq!(run.survived, !result.is_collapsed());
        assert_eq!(run.generations_recorded, result.history.len());
        assert_eq!(run.final_metrics, result.final_metrics);
    }
}
