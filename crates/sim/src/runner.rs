//! Drives the vehicle around a map with a steering controller, one fixed
//! time-slice per tick, until it arrives, collides, errors or is stopped.

use std::time::{Duration, Instant};

use log::info;
use serde::{Deserialize, Serialize};
use swarmdrive_shared::{
    CarPose, Map, RunOutcome, RunRecord, SensorReadings, TrajectorySample, DEFAULT_MAX_TICKS,
    TICK_RATE,
};

use crate::cancel::CancelToken;
use crate::car::Car;
use crate::controller::Controller;
use crate::events::EventSink;

/// Simulation run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks per second when pacing in real time.
    pub fps: u32,
    /// Sleep out each tick to the configured rate. Batch runs leave this
    /// off and run flat out.
    pub realtime: bool,
    /// Tick budget; exhausting it aborts the run.
    pub max_ticks: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fps: TICK_RATE,
            realtime: false,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

/// Events emitted while a run is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    Tick {
        pose: CarPose,
        readings: SensorReadings,
    },
    Collided,
    Finished {
        outcome: RunOutcome,
        trajectory: Vec<TrajectorySample>,
    },
}

/// Run the controller against the map until a terminal state.
///
/// Exactly one [`RunEvent::Finished`] is emitted per run. The cancellation
/// token is polled at the top of each tick; cancelling never interrupts a
/// tick already in flight.
pub fn drive<S: EventSink<RunEvent>>(
    config: &RunConfig,
    map: &Map,
    controller: &mut dyn Controller,
    sink: &mut S,
    cancel: &CancelToken,
) -> RunRecord {
    let mut car = Car::from_map(map);
    let mut trajectory: Vec<TrajectorySample> = Vec::new();
    let mut ticks = 0u32;

    let tick_interval = Duration::from_secs_f64(1.0 / config.fps.max(1) as f64);
    let mut next_tick = Instant::now() + tick_interval;

    let outcome = loop {
        if cancel.is_cancelled() {
            break RunOutcome::Aborted;
        }
        if ticks >= config.max_ticks {
            break RunOutcome::Aborted;
        }

        if config.realtime {
            let now = Instant::now();
            if next_tick > now {
                std::thread::sleep(next_tick - now);
            }
            next_tick += tick_interval;
        }

        let readings = car.sense(map);
        sink.emit(RunEvent::Tick {
            pose: *car.pose(),
            readings,
        });

        if map.goal_contains(car.pose().position) {
            break RunOutcome::Arrived;
        }
        if car.is_collided() {
            sink.emit(RunEvent::Collided);
            break RunOutcome::Collided;
        }
        if !readings.all_finite() {
            break RunOutcome::SensorError;
        }

        let command = controller.steer(&readings);
        trajectory.push(TrajectorySample {
            position: car.pose().position,
            readings,
            wheel_angle: command,
        });

        car.step(map, command);
        ticks += 1;
    };

    info!(
        "run finished: {:?} after {} ticks ({})",
        outcome,
        ticks,
        controller.name()
    );
    sink.emit(RunEvent::Finished {
        outcome,
        trajectory: trajectory.clone(),
    });

    RunRecord {
        outcome,
        trajectory,
        ticks,
    }
}
