//! Core simulation and training logic: track geometry, vehicle kinematics,
//! the RBFN steering model, the PSO trainer and the simulation runner.

pub mod cancel;
pub mod car;
pub mod controller;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod pso;
pub mod rbfn;
pub mod runner;

pub use cancel::CancelToken;
pub use car::Car;
pub use controller::{Controller, FixedController, RbfnController};
pub use errors::ConfigError;
pub use events::{EventSink, NullSink};
pub use pso::{train, PsoConfig, TrainEvent, TrainOutcome};
pub use rbfn::{Rbfn, RbfnParameters};
pub use runner::{drive, RunConfig, RunEvent};
