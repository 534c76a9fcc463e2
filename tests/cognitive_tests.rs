//! Cognitive-dynamics integration tests

use approx::assert_relative_eq;
use vizsim::prelude::*;

fn model(drift: DriftMode, interaction: f64, seed: u64) -> CognitiveModel {
    CognitiveModel::new(CognitiveSettings {
        num_agents: 36,
        dimensions: 4,
        concepts: 3,
        self_drift: drift,
        drift_strength: 0.2,
        interaction_strength: interaction,
        seed: Some(seed),
    })
    .unwrap()
}

#[test]
fn test_unit_norm_after_every_step() {
    for drift in [DriftMode::None, DriftMode::Echo, DriftMode::Guidance] {
        let mut m = model(drift, 0.5, 1);
        for _ in 0..100 {
            m.step();
            for agent in m.agents() {
                assert_relative_eq!(agent.map.norm(), 1.0, epsilon = 1e-10);
            }
        }
    }
}

#[test]
fn test_uncoupled_maps_are_frozen() {
    let mut m = model(DriftMode::None, 0.0, 2);
    let initial: Vec<_> = m.agents().iter().map(|a| a.map.clone()).collect();
    let initial_metrics = m.metrics();

    m.advance(500);

    for (agent, before) in m.agents().iter().zip(&initial) {
        assert_relative_eq!(agent.map, *before, epsilon = 1e-12);
    }
    let metrics = m.metrics();
    assert_relative_eq!(
        metrics.mutual_intelligibility,
        initial_metrics.mutual_intelligibility,
        epsilon = 1e-10
    );
    assert_relative_eq!(metrics.time, 5.0, epsilon = 1e-9);
}

#[test]
fn test_coupled_metrics_stay_in_range() {
    let mut m = model(DriftMode::Echo, 1.0, 3);
    m.advance(2000);
    let after = m.metrics();

    assert!((0.0..=1.0 + 1e-9).contains(&after.mutual_intelligibility));
    assert!(after.average_rank >= 1.0 - 1e-9);
    assert!(after.average_rank <= 3.0 + 1e-9);
    assert!((0.0..=1.0).contains(&after.domain_walls));
    assert!(after.nematic_order <= 1.0 + 1e-9);
}

#[test]
fn test_metrics_serialize_camel_case() {
    let m = model(DriftMode::Echo, 0.05, 4);
    let json = serde_json::to_value(m.metrics()).unwrap();
    assert!(json.get("mutualIntelligibility").is_some());
    assert!(json.get("domainWalls").is_some());
}
