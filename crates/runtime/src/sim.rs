//! Simulated cart-pole used as the training environment of the binary.
//!
//! The cart is driven by a velocity controller: its velocity follows the
//! commanded value with a first-order lag. The pole is a point mass on a
//! massless rod hinged on the cart, so the cart's acceleration is what
//! balances it:
//!
//! ```text
//! a      = gain * (command - v)
//! theta'' = (g * sin(theta) - a * cos(theta)) / length
//! ```
//!
//! `theta` is measured from upright and is positive towards +x.

use std::time::Duration;

use rl::{EnvError, Environment};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct SimConfig {
    pub tick_period: Duration,
    /// Integration substeps per tick.
    pub substeps: u32,
    pub gravity: f64,
    pub pole_length: f64,
    /// Inverse time constant of the cart velocity controller, 1/s.
    pub velocity_gain: f64,
    /// Largest initial pole tilt after a reset, radians.
    pub initial_tilt: f64,
    /// Cart speed below which a reset counts as settled.
    pub settle_speed: f64,
    /// Ticks a reset may take before giving up.
    pub settle_ticks: u32,
    /// Sleep for the tick period so the run proceeds in wall-clock time.
    pub realtime: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(20),
            substeps: 10,
            gravity: 9.81,
            pole_length: 0.5,
            velocity_gain: 20.0,
            initial_tilt: 0.02,
            settle_speed: 1e-3,
            settle_ticks: 50,
            realtime: false,
        }
    }
}

pub struct SimCartPole {
    config: SimConfig,
    rng: fastrand::Rng,
    command: f64,
    position: f64,
    velocity: f64,
    angle: f64,
    angular_velocity: f64,
}

impl SimCartPole {
    #[must_use]
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            config,
            rng: fastrand::Rng::with_seed(seed),
            command: 0.0,
            position: 0.0,
            velocity: 0.0,
            angle: 0.0,
            angular_velocity: 0.0,
        }
    }

    fn state(&self) -> Vec<f64> {
        vec![self.position, self.velocity, self.angle, self.angular_velocity]
    }

    fn pose(&mut self, tilt: f64) {
        self.position = 0.0;
        self.angle = tilt;
        self.angular_velocity = 0.0;
    }

    fn integrate(&mut self, dt: f64) {
        let accel = self.config.velocity_gain * (self.command - self.velocity);
        let alpha = (self.config.gravity * self.angle.sin() - accel * self.angle.cos())
            / self.config.pole_length;
        self.velocity += accel * dt;
        self.position += self.velocity * dt;
        self.angular_velocity += alpha * dt;
        self.angle += self.angular_velocity * dt;
    }

    fn advance(&mut self) {
        let dt = self.config.tick_period.as_secs_f64() / f64::from(self.config.substeps);
        for _ in 0..self.config.substeps {
            self.integrate(dt);
        }
        if self.config.realtime {
            std::thread::sleep(self.config.tick_period);
        }
    }
}

impl Environment for SimCartPole {
    /// Commands zero velocity and holds the pole in place until the cart has
    /// stopped, then releases it with a small random tilt.
    fn reset(&mut self) -> Result<Vec<f64>, EnvError> {
        self.command = 0.0;
        let tilt = (self.rng.f64() * 2.0 - 1.0) * self.config.initial_tilt;
        for tick in 0..=self.config.settle_ticks {
            self.pose(tilt);
            if self.velocity.abs() < self.config.settle_speed {
                debug!("Simulation settled after {} ticks, tilt {:.4}", tick, tilt);
                return Ok(self.state());
            }
            self.advance();
        }
        Err(EnvError::ResetTimeout {
            waited: self.config.tick_period * self.config.settle_ticks,
        })
    }

    fn observe(&mut self) -> Result<Vec<f64>, EnvError> {
        Ok(self.state())
    }

    fn act(&mut self, velocity: f64) {
        self.command = velocity;
    }

    fn tick_period(&self) -> Duration {
        self.config.tick_period
    }

    fn wait_tick(&mut self) {
        self.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_releases_near_upright_at_rest() {
        let mut sim = SimCartPole::new(SimConfig::default(), 3);
        let obs = sim.reset().unwrap();
        assert_eq!(obs.len(), 4);
        assert_eq!(obs[0], 0.0);
        assert!(obs[1].abs() < 1e-3);
        assert!(obs[2].abs() <= 0.02);
        assert_eq!(obs[3], 0.0);
    }

    #[test]
    fn unattended_pole_falls() {
        let mut sim = SimCartPole::new(SimConfig::default(), 5);
        sim.reset().unwrap();
        sim.angle = 0.01;
        let mut worst = 0.0_f64;
        for _ in 0..200 {
            sim.wait_tick();
            worst = worst.max(sim.angle.abs());
        }
        assert!(worst > std::f64::consts::PI / 12.0);
    }

    #[test]
    fn cart_tracks_commanded_velocity() {
        let mut sim = SimCartPole::new(SimConfig::default(), 1);
        sim.reset().unwrap();
        sim.act(1.0);
        for _ in 0..25 {
            sim.wait_tick();
        }
        let obs = sim.observe().unwrap();
        assert!((obs[1] - 1.0).abs() < 1e-3);
        assert!(obs[0] > 0.0);
    }

    #[test]
    fn moving_cart_settles_during_reset() {
        let mut sim = SimCartPole::new(SimConfig::default(), 1);
        sim.velocity = 1.0;
        let obs = sim.reset().unwrap();
        assert!(obs[1].abs() < 1e-3);
        assert_eq!(obs[0], 0.0);
    }

    #[test]
    fn sluggish_controller_times_out() {
        let config = SimConfig {
            velocity_gain: 0.1,
            ..SimConfig::default()
        };
        let mut sim = SimCartPole::new(config, 1);
        sim.velocity = 1.0;
        assert!(matches!(sim.reset(), Err(EnvError::ResetTimeout { .. })));
    }
}
