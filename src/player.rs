//! Timer-driven stepping.

use std::{ops::ControlFlow, thread, time::Duration};

use tracing::debug;

use crate::{
    driver::{Simulation, StepRecord},
    error::ConfigError,
};

/// Plays a simulation forward at a fixed rate, one `advance` per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    speed: u32,
}

impl Player {
    /// `speed` is in steps per second.
    pub fn new(speed: u32) -> Result<Self, ConfigError> {
        if speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        Ok(Self { speed })
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.speed))
    }

    /// Steps `simulation` until it completes or `on_step` breaks.
    /// Returns the number of steps played.
    pub fn play<F>(&self, simulation: &mut Simulation, mut on_step: F) -> usize
    where
        F: FnMut(&Simulation, &StepRecord) -> ControlFlow<()>,
    {
        let interval = self.interval();
        let mut played = 0;
        while let Some(record) = simulation.advance() {
            played += 1;
            if on_step(simulation, &record).is_break() {
                debug!(step = record.step, "playback stopped");
                break;
            }
            if simulation.is_completed() {
                break;
            }
            thread::sleep(interval);
        }
        played
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PageReplacementAlgorithm, SimulationConfig};

    fn simulation() -> Simulation {
        let config =
            SimulationConfig::from_pages(4, 2, &[0, 1, 2, 3, 0], PageReplacementAlgorithm::Lru)
                .unwrap();
        Simulation::new(config)
    }

    #[test]
    fn interval_from_speed() {
        assert_eq!(Player::new(0), Err(ConfigError::ZeroSpeed));
        assert_eq!(Player::new(4).unwrap().interval(), Duration::from_millis(250));
        assert_eq!(Player::new(2000).unwrap().interval(), Duration::ZERO);
    }

    #[test]
    fn plays_to_completion() {
        let mut sim = simulation();
        let played = Player::new(1000)
            .unwrap()
            .play(&mut sim, |_, _| ControlFlow::Continue(()));
        assert_eq!(played, 5);
        assert!(sim.is_completed());
    }

    #[test]
    fn break_cancels_playback() {
        let mut sim = simulation();
        let played = Player::new(1000).unwrap().play(&mut sim, |sim, _| {
            if sim.current_step() == Some(1) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(played, 2);
        assert_eq!(sim.current_step(), Some(1));
    }
}
