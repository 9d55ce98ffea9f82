#![warn(clippy::pedantic)]

use std::f64::consts::FRAC_PI_4;

use approx::assert_relative_eq;
use pilex::{
    analyze, AnalysisConfig, AnalysisError, AnalysisInput, ConfigurationError, HeadCondition,
    LoadCase, PileProperties, PileSystem, SoilCurve, SoilLayer, SoilProfile, TipCondition,
};

fn pile() -> PileProperties {
    PileProperties::new(10.0, 0.6, 5.0e4)
}

fn head_load() -> LoadCase {
    LoadCase::new(100.0, 0.0, 0.0)
}

fn soft_clay() -> SoilCurve {
    SoilCurve::SoftClay {
        undrained_shear_strength: 20.0,
        effective_unit_weight: 8.0,
        strain_at_half_strength: 0.02,
        j: 0.5,
        initial_modulus_gradient: 30_000.0,
    }
}

/// Head deflection of a semi-infinite beam on Winkler springs (Hetényi).
fn winkler_head_deflection(rigidity: f64, modulus: f64, load: &LoadCase) -> f64 {
    let lambda = (modulus / (4.0 * rigidity)).powf(0.25);
    2.0 * lambda * (load.lateral_load + lambda * load.moment) / modulus
}

fn dense_sand() -> SoilCurve {
    SoilCurve::Sand {
        friction_angle: 35.0,
        effective_unit_weight: 10.0,
        subgrade_modulus: 20_000.0,
        cyclic: false,
    }
}

#[test]
fn weightless_soil_converges_in_one_iteration_to_the_direct_solve() {
    let config = AnalysisConfig::default()
        .with_nodes(30)
        .with_supports(HeadCondition::Free, TipCondition::Fixed);
    let profile = SoilProfile::uniform(10.0, SoilCurve::Linear { modulus: 0.0 });
    let record = analyze(&pile(), &profile, &head_load(), &config).expect("valid input");
    assert!(record.success && record.converged);
    assert_eq!(record.iterations, 1);

    let direct = PileSystem::build(&pile(), &head_load(), &config)
        .expect("valid system")
        .solve_elastic()
        .expect("cantilever is not singular");
    for (node, deflection) in record.deflections.iter().enumerate() {
        assert_relative_eq!(*deflection, direct[node], max_relative = 1.0e-12);
    }

    let bare = analyze(&pile(), &SoilProfile::empty(), &head_load(), &config)
        .expect("valid input");
    assert_eq!(record, bare);
}

#[test]
fn long_pile_on_linear_springs_matches_the_semi_infinite_beam() {
    let long_pile = PileProperties::new(30.0, 0.6, 5.0e4);
    let profile = SoilProfile::uniform(30.0, SoilCurve::Linear { modulus: 2_000.0 });
    for load in [LoadCase::new(100.0, 0.0, 0.0), LoadCase::new(0.0, 100.0, 0.0)] {
        let exact = winkler_head_deflection(5.0e4, 2_000.0, &load);
        let mut previous_error = f64::INFINITY;
        for node_count in [61, 121, 241, 481] {
            let record = analyze(
                &long_pile,
                &profile,
                &load,
                &AnalysisConfig::default().with_nodes(node_count),
            )
            .expect("valid input");
            assert!(record.success && record.converged);
            // The bare pile is a mechanism, so the first solve starts from rest.
            assert_eq!(record.iterations, 2);
            let error = (record.deflection_at_load - exact).abs() / exact;
            // Second-order convergence: halving h cuts the error about fourfold.
            assert!(error * 3.5 < previous_error, "{node_count} nodes: {error}");
            previous_error = error;
        }
        assert!(previous_error < 5.0e-4);
    }

    // Largest moment of the semi-infinite beam: (H/λ)·e^(-π/4)·sin(π/4).
    let record = analyze(
        &long_pile,
        &profile,
        &LoadCase::new(100.0, 0.0, 0.0),
        &AnalysisConfig::default().with_nodes(481),
    )
    .expect("valid input");
    let lambda = (2_000.0_f64 / (4.0 * 5.0e4)).powf(0.25);
    let peak = 100.0 / lambda * (-FRAC_PI_4).exp() * FRAC_PI_4.sin();
    assert_relative_eq!(record.max_moment, peak, max_relative = 1.0e-3);
}

#[test]
fn soft_clay_supports_a_free_pile() {
    let record = analyze(
        &pile(),
        &SoilProfile::uniform(10.0, soft_clay()),
        &head_load(),
        &AnalysisConfig::default().with_nodes(41),
    )
    .expect("valid input");
    assert!(record.success && record.converged);
    assert!(record.iterations > 1 && record.iterations < 50);
    assert!(record.deflection_at_load > 0.0);
    // Deflection decays with depth and the soil pushes back against it.
    assert!(record.deflections[10] < record.deflection_at_load);
    assert!(record.deflections[40].abs() < 0.01 * record.deflection_at_load);
    assert!(record.soil_reactions[10] < 0.0);
}

#[test]
fn soft_clay_response_settles_under_mesh_refinement() {
    let profile = SoilProfile::uniform(10.0, soft_clay());
    let moments: Vec<f64> = [41, 81, 161]
        .into_iter()
        .map(|nodes| {
            let record = analyze(
                &pile(),
                &profile,
                &head_load(),
                &AnalysisConfig::default().with_nodes(nodes),
            )
            .expect("valid input");
            assert!(record.converged, "{nodes} nodes did not converge");
            record.max_moment
        })
        .collect();
    let coarse_change = (moments[0] - moments[1]).abs();
    let fine_change = (moments[1] - moments[2]).abs();
    assert!(fine_change < coarse_change);
    assert!(fine_change / moments[2] < 0.02);
}

#[test]
fn stiffer_soil_reduces_head_deflection() {
    let config = AnalysisConfig::default()
        .with_nodes(41)
        .with_supports(HeadCondition::Free, TipCondition::Fixed);
    let bare = analyze(&pile(), &SoilProfile::empty(), &head_load(), &config)
        .expect("valid input");
    let clay = analyze(&pile(), &SoilProfile::uniform(10.0, soft_clay()), &head_load(), &config)
        .expect("valid input");
    let sand = analyze(&pile(), &SoilProfile::uniform(10.0, dense_sand()), &head_load(), &config)
        .expect("valid input");
    assert!(clay.deflection_at_load < bare.deflection_at_load);
    assert!(sand.deflection_at_load < clay.deflection_at_load);
}

#[test]
fn reversing_the_load_mirrors_the_response() {
    let config = AnalysisConfig::default().with_nodes(41);
    let profile = SoilProfile::uniform(10.0, dense_sand());
    let push = analyze(&pile(), &profile, &head_load(), &config).expect("valid input");
    let pull = analyze(&pile(), &profile, &head_load().scaled(-1.0), &config)
        .expect("valid input");
    assert_eq!(push.iterations, pull.iterations);
    for (a, b) in push.deflections.iter().zip(&pull.deflections) {
        assert_relative_eq!(*a, -b, epsilon = 1.0e-15, max_relative = 1.0e-12);
    }
    assert_relative_eq!(push.max_moment, pull.max_moment, max_relative = 1.0e-12);
}

#[test]
fn layered_profile_uses_each_layer_below_its_top() {
    let profile = SoilProfile::empty()
        .with_layer(SoilLayer::new(
            0.0,
            3.0,
            SoilCurve::Hyperbolic {
                initial_modulus: 2_000.0,
                ultimate_resistance: 50.0,
            },
        ))
        .with_layer(SoilLayer::new(3.0, 10.0, soft_clay()));
    let record = analyze(
        &pile(),
        &profile,
        &head_load(),
        &AnalysisConfig::default().with_nodes(41),
    )
    .expect("valid input");
    assert!(record.success && record.converged);
    // Hyperbolic soil near the head never exceeds its ultimate resistance.
    for (depth, reaction) in record.depths.iter().zip(&record.soil_reactions) {
        if *depth < 3.0 {
            assert!(reaction.abs() < 50.0);
        }
    }
}

#[test]
fn iteration_budget_exhaustion_is_not_an_error() {
    let config = AnalysisConfig::default()
        .with_nodes(41)
        .with_iterations(3, 1.0e-9);
    let record = analyze(&pile(), &SoilProfile::uniform(10.0, soft_clay()), &head_load(), &config)
        .expect("valid input");
    assert!(record.success);
    assert!(!record.converged);
    assert_eq!(record.iterations, 3);
    assert_eq!(record.deflections.len(), 41);
    assert!(record.error.is_none());
}

#[test]
fn invalid_inputs_are_rejected_before_solving() {
    let too_coarse = analyze(
        &pile(),
        &SoilProfile::empty(),
        &head_load(),
        &AnalysisConfig::default().with_nodes(4),
    );
    assert_eq!(
        too_coarse,
        Err(AnalysisError::InvalidConfiguration(
            ConfigurationError::TooFewNodes(4)
        ))
    );

    let gap = SoilProfile::empty()
        .with_layer(SoilLayer::new(0.0, 4.0, soft_clay()))
        .with_layer(SoilLayer::new(4.5, 10.0, soft_clay()));
    assert!(matches!(
        analyze(&pile(), &gap, &head_load(), &AnalysisConfig::default()),
        Err(AnalysisError::InvalidConfiguration(
            ConfigurationError::LayerGap { index: 1, .. }
        ))
    ));

    let no_rigidity = PileProperties::new(10.0, 0.6, 0.0);
    assert!(matches!(
        analyze(&no_rigidity, &SoilProfile::empty(), &head_load(), &AnalysisConfig::default()),
        Err(AnalysisError::InvalidConfiguration(
            ConfigurationError::NonPositiveRigidity(_)
        ))
    ));
}

#[test]
fn unrestrained_pile_without_soil_fails_gracefully() {
    let record = analyze(
        &pile(),
        &SoilProfile::empty(),
        &head_load(),
        &AnalysisConfig::default(),
    )
    .expect("valid input");
    assert!(!record.success);
    assert!(!record.converged);
    assert!(record.deflections.is_empty());
    assert!(record
        .error
        .as_deref()
        .is_some_and(|message| message.contains("rigid body")));
}

#[test]
fn input_document_drives_an_analysis() {
    let input: AnalysisInput = serde_json::from_str(
        r#"{
            "pile": { "length": 10.0, "diameter": 0.6, "EI": 50000.0 },
            "soil": {
                "layers": [
                    { "top": 0.0, "bottom": 10.0,
                      "curve": { "type": "soft-clay", "undrainedShearStrength": 20.0,
                                 "effectiveUnitWeight": 8.0, "strainAtHalfStrength": 0.02,
                                 "initialModulusGradient": 30000.0 } }
                ]
            },
            "load": { "lateralLoad": 100.0, "moment": 50.0 },
            "config": { "numNodes": 41, "boundaryCondition": "pinned-head", "tipCondition": "free-tip" }
        }"#,
    )
    .expect("input document parses");
    assert!(input.validate().is_ok());
    assert_eq!(input.config.boundary_condition, HeadCondition::Pinned);
    assert_eq!(input.config.max_iterations, 50);

    let record = analyze(&input.pile, &input.soil, &input.load, &input.config)
        .expect("valid input");
    assert!(record.success && record.converged);
    assert!(record.deflection_at_load.abs() < 1.0e-12);
    assert!(record.max_deflection > 0.0);

    let unknown = serde_json::from_str::<AnalysisInput>(
        r#"{
            "pile": { "length": 10.0, "diameter": 0.6, "EI": 50000.0 },
            "load": { "lateralLoad": 100.0 },
            "config": { "boundaryCondition": "rocking-head" }
        }"#,
    );
    assert!(unknown.is_err());
}
