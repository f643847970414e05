use swarmdrive_shared::SensorReadings;

use crate::rbfn::Rbfn;

/// Turns radar readings into a steering command in degrees.
pub trait Controller: Send {
    fn name(&self) -> &str;
    fn steer(&mut self, readings: &SensorReadings) -> f64;
}

/// Always commands the same wheel angle. Useful for smoke runs and tests.
pub struct FixedController {
    wheel_angle: f64,
}

impl FixedController {
    pub fn new(wheel_angle: f64) -> Self {
        Self { wheel_angle }
    }

    pub fn straight() -> Self {
        Self::new(0.0)
    }
}

impl Controller for FixedController {
    fn name(&self) -> &str {
        "fixed"
    }

    fn steer(&mut self, _readings: &SensorReadings) -> f64 {
        self.wheel_angle
    }
}

/// Steers with a trained network.
pub struct RbfnController {
    net: Rbfn,
}

impl RbfnController {
    pub fn new(net: Rbfn) -> Self {
        Self { net }
    }
}

impl Controller for RbfnController {
    fn name(&self) -> &str {
        "rbfn"
    }

    fn steer(&mut self, readings: &SensorReadings) -> f64 {
        self.net.steer(readings)
    }
}
