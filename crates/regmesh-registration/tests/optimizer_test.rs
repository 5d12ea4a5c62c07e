use proptest::prelude::*;
use regmesh_registration::optimizer::{AmoebaConfig, FnCostFunction, Optimizer, StopCondition};
use regmesh_registration::ProgressTracker;
use burn::config::Config;
use tempfile::tempdir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_converged_stop_meets_a_tolerance(
        cx in -20.0f64..20.0,
        cy in -20.0f64..20.0,
        xtol in 1e-6f64..1e-1,
        ftol in 1e-10f64..1e-2,
        max_iterations in 1usize..80,
    ) {
        let config = AmoebaConfig::new()
            .with_parameters_convergence_tolerance(xtol)
            .with_function_convergence_tolerance(ftol)
            .with_maximum_number_of_iterations(max_iterations)
            .with_automatic_initial_simplex(false)
            .with_initial_simplex_delta(Some(vec![2.0, 2.0]));
        let optimizer = config.init();
        let mut cost = FnCostFunction::new(2, move |p: &[f64]| {
            Ok((p[0] - cx).powi(2) + 3.0 * (p[1] - cy).powi(2))
        });

        let mut iterations = optimizer.iterate(&mut cost, &[0.0, 0.0]).unwrap();
        let mut last = None;
        for event in iterations.by_ref() {
            last = Some(event.unwrap());
        }
        let stop = iterations.stop_condition();
        let outcome = iterations.finish().unwrap();
        prop_assert_eq!(Some(outcome.stop_condition), stop);

        let last = last.unwrap();
        match outcome.stop_condition {
            StopCondition::ConvergedByParameters => prop_assert!(last.parameter_range <= xtol),
            StopCondition::ConvergedByValue => prop_assert!(last.value_range <= ftol),
            StopCondition::MaximumIterations => {
                prop_assert_eq!(outcome.iterations, max_iterations);
                prop_assert!(last.parameter_range > xtol && last.value_range > ftol);
            }
        }
    }
}

#[test]
fn test_config_roundtrips_through_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("amoeba.json");

    let config = AmoebaConfig::new()
        .with_maximize(true)
        .with_parameters_convergence_tolerance(0.1)
        .with_function_convergence_tolerance(0.001)
        .with_maximum_number_of_iterations(200)
        .with_automatic_initial_simplex(false)
        .with_initial_simplex_delta(Some(vec![5.0, 5.0]));
    config.save(&path).unwrap();

    let loaded = AmoebaConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_optimize_tracks_every_iteration() {
    let history = std::sync::Arc::new(regmesh_registration::HistoryCallback::new());
    let mut tracker = ProgressTracker::new();
    tracker.add_callback(history.clone());

    let mut optimizer = AmoebaConfig::new()
        .with_function_convergence_tolerance(1e-12)
        .with_parameters_convergence_tolerance(1e-6)
        .init();
    let mut cost = FnCostFunction::new(3, |p: &[f64]| Ok(p.iter().map(|v| (v - 1.0).powi(2)).sum()));
    tracker.start();
    let outcome = optimizer.optimize(&mut cost, &[4.0, -2.0, 0.5], &tracker).unwrap();

    let events = history.get_history();
    assert_eq!(events.len(), outcome.iterations);
    assert_eq!(events.last().unwrap().parameters, outcome.parameters);
    assert!(outcome.parameters.iter().all(|p| (p - 1.0).abs() < 1e-3));
}
