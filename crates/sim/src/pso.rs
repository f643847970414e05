//! Particle swarm optimization of the network parameters against a labeled
//! dataset. The swarm moves through the flat parameter encoding; fitness is
//! mean squared error over the full dataset in normalized steering units.

use glam::DVec3;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use swarmdrive_shared::{
    IterationStats, TrainStatus, TrainingExample, DEFAULT_COGNITIVE, DEFAULT_INERTIA,
    DEFAULT_ITERATIONS, DEFAULT_NNEURON, DEFAULT_POPULATION, DEFAULT_SD_MAX, DEFAULT_SOCIAL,
    SPREAD_FLOOR,
};

use crate::cancel::CancelToken;
use crate::errors::ConfigError;
use crate::events::EventSink;
use crate::rbfn::{normalize_steering, RbfnParameters};

/// Training hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsoConfig {
    pub iterations: usize,
    pub population: usize,
    pub nneuron: usize,
    /// Upper bound for spread initialization and clamping.
    pub sd_max: f64,
    pub inertia: f64,
    pub cognitive: f64,
    pub social: f64,
    /// Evaluate particle fitness across the rayon pool.
    pub parallel: bool,
    pub seed: u64,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            population: DEFAULT_POPULATION,
            nneuron: DEFAULT_NNEURON,
            sd_max: DEFAULT_SD_MAX,
            inertia: DEFAULT_INERTIA,
            cognitive: DEFAULT_COGNITIVE,
            social: DEFAULT_SOCIAL,
            parallel: true,
            seed: 0,
        }
    }
}

impl PsoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.population == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.nneuron == 0 {
            return Err(ConfigError::ZeroNeurons);
        }
        if !(self.sd_max > SPREAD_FLOOR) || !self.sd_max.is_finite() {
            return Err(ConfigError::InvalidSdMax(self.sd_max));
        }
        Ok(())
    }
}

/// Events emitted while training runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainEvent {
    Iteration(IterationStats),
    Finished {
        status: TrainStatus,
        parameters: RbfnParameters,
        best_fitness: f64,
    },
}

/// Result of one training session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOutcome {
    pub status: TrainStatus,
    pub parameters: RbfnParameters,
    pub best_fitness: f64,
    pub iterations_run: usize,
}

struct Particle {
    position: Vec<f64>,
    velocity: Vec<f64>,
    best_position: Vec<f64>,
    best_fitness: f64,
}

struct Swarm {
    particles: Vec<Particle>,
    best_position: Vec<f64>,
    best_fitness: f64,
    /// Per-dimension clamp range; unbounded dimensions carry infinities.
    bounds: Vec<(f64, f64)>,
}

impl Swarm {
    fn new(
        config: &PsoConfig,
        mean_range: (f64, f64),
        rng: &mut ChaCha8Rng,
    ) -> Result<Self, ConfigError> {
        let n = config.nneuron;
        let dim = RbfnParameters::encoded_len(n);

        let mut particles = Vec::with_capacity(config.population);
        for _ in 0..config.population {
            let position =
                RbfnParameters::random(n, mean_range, config.sd_max, rng)?.encode();
            particles.push(Particle {
                velocity: vec![0.0; dim],
                best_position: position.clone(),
                best_fitness: f64::INFINITY,
                position,
            });
        }

        // Weights roam freely; centers stay inside the observed input
        // range; spreads stay inside [SPREAD_FLOOR, sd_max] so decoding
        // always yields valid parameters.
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY); dim];
        for b in bounds.iter_mut().take(4 * n + 1).skip(n + 1) {
            *b = mean_range;
        }
        for b in bounds.iter_mut().skip(4 * n + 1) {
            *b = (SPREAD_FLOOR, config.sd_max);
        }

        let best_position = particles[0].position.clone();
        Ok(Self {
            particles,
            best_position,
            best_fitness: f64::INFINITY,
            bounds,
        })
    }

    /// One velocity/position sweep. Components pushed past a bound are
    /// clamped there with their velocity zeroed.
    fn advance(&mut self, config: &PsoConfig, rng: &mut ChaCha8Rng) {
        for particle in &mut self.particles {
            for d in 0..particle.position.len() {
                let r1: f64 = rng.gen();
                let r2: f64 = rng.gen();
                particle.velocity[d] = config.inertia * particle.velocity[d]
                    + config.cognitive * r1 * (particle.best_position[d] - particle.position[d])
                    + config.social * r2 * (self.best_position[d] - particle.position[d]);
                particle.position[d] += particle.velocity[d];

                let (lo, hi) = self.bounds[d];
                if particle.position[d] < lo {
                    particle.position[d] = lo;
                    particle.velocity[d] = 0.0;
                } else if particle.position[d] > hi {
                    particle.position[d] = hi;
                    particle.velocity[d] = 0.0;
                }
            }
        }
    }
}

/// Mean squared error of a decoded particle over the dataset.
fn fitness(position: &[f64], nneuron: usize, samples: &[(DVec3, f64)]) -> f64 {
    let params = RbfnParameters::decode(position, nneuron);
    let sum: f64 = samples
        .iter()
        .map(|&(x, target)| {
            let err = params.forward(x) - target;
            err * err
        })
        .sum();
    sum / samples.len() as f64
}

/// Observed min/max across every input component of the dataset.
fn input_range(examples: &[TrainingExample]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for example in examples {
        for &v in &example.inputs {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo, hi)
}

/// Fit network parameters to `examples` with a particle swarm.
///
/// Emits one [`TrainEvent::Iteration`] per iteration and exactly one
/// [`TrainEvent::Finished`]. The cancellation token is polled at iteration
/// boundaries only; stopping early reports [`TrainStatus::Stopped`] with
/// the best parameters found so far.
pub fn train<S: EventSink<TrainEvent>>(
    config: &PsoConfig,
    examples: &[TrainingExample],
    sink: &mut S,
    cancel: &CancelToken,
) -> Result<TrainOutcome, ConfigError> {
    config.validate()?;
    if examples.is_empty() {
        return Err(ConfigError::EmptyDataset);
    }

    let mean_range = input_range(examples);
    let samples: Vec<(DVec3, f64)> = examples
        .iter()
        .map(|e| (DVec3::from(e.inputs), normalize_steering(e.target)))
        .collect();

    info!(
        "training: {} particles, {} iterations, {} neurons, {} examples, inputs in [{:.3}, {:.3}]",
        config.population,
        config.iterations,
        config.nneuron,
        samples.len(),
        mean_range.0,
        mean_range.1,
    );

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut swarm = Swarm::new(config, mean_range, &mut rng)?;

    let mut status = TrainStatus::Completed;
    let mut iterations_run = 0;

    for iteration in 0..config.iterations {
        if cancel.is_cancelled() {
            status = TrainStatus::Stopped;
            info!("training stopped at iteration {iteration}");
            break;
        }

        let fitnesses: Vec<f64> = if config.parallel {
            swarm
                .particles
                .par_iter()
                .map(|p| fitness(&p.position, config.nneuron, &samples))
                .collect()
        } else {
            swarm
                .particles
                .iter()
                .map(|p| fitness(&p.position, config.nneuron, &samples))
                .collect()
        };

        let mut min_fitness = f64::INFINITY;
        let mut sum_fitness = 0.0;
        for (particle, &value) in swarm.particles.iter_mut().zip(&fitnesses) {
            if value < particle.best_fitness {
                particle.best_fitness = value;
                particle.best_position.copy_from_slice(&particle.position);
            }
            if value < swarm.best_fitness {
                swarm.best_fitness = value;
                swarm.best_position.copy_from_slice(&particle.position);
            }
            min_fitness = min_fitness.min(value);
            sum_fitness += value;
        }

        let stats = IterationStats {
            iteration,
            best_fitness: swarm.best_fitness,
            avg_fitness: sum_fitness / fitnesses.len() as f64,
            min_fitness,
        };
        debug!(
            "iteration {}: best {:.7}, avg {:.7}, min {:.7}",
            stats.iteration, stats.best_fitness, stats.avg_fitness, stats.min_fitness
        );
        sink.emit(TrainEvent::Iteration(stats));

        swarm.advance(config, &mut rng);
        iterations_run = iteration + 1;
    }

    let parameters = RbfnParameters::decode(&swarm.best_position, config.nneuron);
    info!(
        "training {:?} after {} iterations, best fitness {:.7}",
        status, iterations_run, swarm.best_fitness
    );
    sink.emit(TrainEvent::Finished {
        status,
        parameters: parameters.clone(),
        best_fitness: swarm.best_fitness,
    });

    Ok(TrainOutcome {
        status,
        parameters,
        best_fitness: swarm.best_fitness,
        iterations_run,
    })
}
