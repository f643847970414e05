use glam::{DVec2, DVec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use swarmdrive_shared::{
    walls_from_polyline, Map, RunOutcome, TrainStatus, TrainingExample, WHEEL_ANGLE_LIMIT,
};
use swarmdrive_sim::rbfn::denormalize_steering;
use swarmdrive_sim::{
    drive, train, CancelToken, FixedController, NullSink, PsoConfig, Rbfn, RbfnController,
    RbfnParameters, RunConfig,
};

/// Straight corridor heading east with the goal at the far end.
fn corridor_map() -> Map {
    Map {
        start_pos: DVec2::ZERO,
        start_angle: 0.0,
        end_lt: DVec2::new(45.0, 5.0),
        end_rb: DVec2::new(55.0, -5.0),
        walls: [
            walls_from_polyline(&[DVec2::new(-5.0, 5.0), DVec2::new(55.0, 5.0)]),
            walls_from_polyline(&[DVec2::new(-5.0, -5.0), DVec2::new(55.0, -5.0)]),
        ]
        .concat(),
    }
}

/// Dataset sampled from a known network so training has a reachable target.
fn synthetic_examples(count: usize, seed: u64) -> Vec<TrainingExample> {
    let generator = RbfnParameters::new(
        vec![DVec3::new(10.0, 7.0, 14.0), DVec3::new(20.0, 18.0, 6.0)],
        vec![5.0, 8.0],
        vec![0.5, 0.25, -0.2],
    )
    .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let inputs = [
                rng.gen_range(3.0..25.0),
                rng.gen_range(3.0..25.0),
                rng.gen_range(3.0..25.0),
            ];
            let target = denormalize_steering(generator.forward(DVec3::from(inputs)));
            TrainingExample { inputs, target }
        })
        .collect()
}

#[test]
fn test_training_completes_and_improves() {
    let examples = synthetic_examples(40, 21);
    let config = PsoConfig {
        iterations: 80,
        population: 30,
        nneuron: 3,
        seed: 5,
        ..PsoConfig::default()
    };

    let outcome = train(&config, &examples, &mut NullSink, &CancelToken::new()).unwrap();

    assert_eq!(outcome.status, TrainStatus::Completed);
    assert_eq!(outcome.iterations_run, 80);
    assert!(outcome.best_fitness.is_finite());
    assert!(outcome.best_fitness < 0.25, "no progress made at all");
    assert_eq!(outcome.parameters.nneuron(), 3);
}

#[test]
fn test_trained_controller_drives_to_a_terminal_state() {
    let examples = synthetic_examples(30, 22);
    let config = PsoConfig {
        iterations: 50,
        population: 25,
        nneuron: 2,
        seed: 11,
        ..PsoConfig::default()
    };
    let outcome = train(&config, &examples, &mut NullSink, &CancelToken::new()).unwrap();

    let map = corridor_map();
    let run_config = RunConfig {
        max_ticks: 200,
        ..RunConfig::default()
    };

    let net = Rbfn::new(outcome.parameters).unwrap();
    let mut controller = RbfnController::new(net);
    let record = drive(
        &run_config,
        &map,
        &mut controller,
        &mut NullSink,
        &CancelToken::new(),
    );

    // Whatever the network learned, the run must land in exactly one
    // distinct terminal state with a coherent trajectory.
    assert!(matches!(
        record.outcome,
        RunOutcome::Arrived | RunOutcome::Collided | RunOutcome::Aborted
    ));
    assert!(record.ticks <= 200);
    assert_eq!(record.trajectory.len() as u32, record.ticks);
    for sample in &record.trajectory {
        assert!(sample.readings.all_finite());
        assert!(sample.wheel_angle.is_finite());
    }
}

#[test]
fn test_end_to_end_is_deterministic_for_a_seed() {
    let examples = synthetic_examples(30, 23);
    let config = PsoConfig {
        iterations: 40,
        population: 20,
        nneuron: 2,
        seed: 17,
        ..PsoConfig::default()
    };

    let run = |examples: &[TrainingExample]| {
        let outcome = train(&config, examples, &mut NullSink, &CancelToken::new()).unwrap();
        let net = Rbfn::new(outcome.parameters).unwrap();
        let mut controller = RbfnController::new(net);
        drive(
            &RunConfig {
                max_ticks: 150,
                ..RunConfig::default()
            },
            &corridor_map(),
            &mut controller,
            &mut NullSink,
            &CancelToken::new(),
        )
    };

    let a = run(&examples);
    let b = run(&examples);
    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.ticks, b.ticks);
}

#[test]
fn test_straight_controller_arrives_and_serializes() {
    let map = corridor_map();
    let mut controller = FixedController::straight();
    let record = drive(
        &RunConfig::default(),
        &map,
        &mut controller,
        &mut NullSink,
        &CancelToken::new(),
    );
    assert_eq!(record.outcome, RunOutcome::Arrived);

    let json = serde_json::to_string(&record).expect("record should serialize");
    let back: swarmdrive_shared::RunRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.outcome, record.outcome);
    assert_eq!(back.trajectory.len(), record.trajectory.len());
}

#[test]
fn test_trajectory_records_raw_commands() {
    // A network with a huge bias commands far beyond the wheel range; the
    // vehicle clamps it mechanically while the trajectory keeps the raw
    // commanded value.
    let params = RbfnParameters::new(
        vec![DVec3::new(10.0, 10.0, 10.0)],
        vec![5.0],
        vec![4.0, 0.0],
    )
    .unwrap();
    let net = Rbfn::new(params).unwrap();
    let mut controller = RbfnController::new(net);

    let map = corridor_map();
    let record = drive(
        &RunConfig {
            max_ticks: 5,
            ..RunConfig::default()
        },
        &map,
        &mut controller,
        &mut NullSink,
        &CancelToken::new(),
    );

    for sample in &record.trajectory {
        // Raw command: denormalized 4.0 bias, way past the limit.
        assert!(sample.wheel_angle > WHEEL_ANGLE_LIMIT);
    }
}
