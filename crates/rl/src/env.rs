use std::time::Duration;

use crate::error::EnvError;

/// Contract between the learning agent and the cart-pole it controls.
///
/// Implementations may drive a simulator or real hardware. Observations are
/// returned as raw vectors of `(cart position, cart velocity, pole angle, pole
/// angular velocity)`; the agent validates their shape before using them, so a
/// transport that delivers a truncated message surfaces as
/// [`EnvError::Dimension`] instead of a silently padded state.
pub trait Environment {
    /// Re-pose the system to its start state and return the first observation
    /// once it has settled.
    ///
    /// # Errors
    ///
    /// [`EnvError::ResetTimeout`] when the system does not settle in time, or
    /// any transport failure.
    fn reset(&mut self) -> Result<Vec<f64>, EnvError>;

    /// Most recent observation.
    ///
    /// # Errors
    ///
    /// Transport failures.
    fn observe(&mut self) -> Result<Vec<f64>, EnvError>;

    /// Apply a cart velocity command. Fire-and-forget.
    fn act(&mut self, velocity: f64);

    /// Interval between issuing a command and re-observing.
    fn tick_period(&self) -> Duration;

    /// Let one control tick elapse.
    ///
    /// The default sleeps for [`Environment::tick_period`]. Simulators override
    /// this to advance simulated time instead.
    fn wait_tick(&mut self) {
        std::thread::sleep(self.tick_period());
    }
}

impl<E: Environment + ?Sized> Environment for &mut E {
    fn reset(&mut self) -> Result<Vec<f64>, EnvError> {
        (**self).reset()
    }

    fn observe(&mut self) -> Result<Vec<f64>, EnvError> {
        (**self).observe()
    }

    fn act(&mut self, velocity: f64) {
        (**self).act(velocity);
    }

    fn tick_period(&self) -> Duration {
        (**self).tick_period()
    }

    fn wait_tick(&mut self) {
        (**self).wait_tick();
    }
}
