//! Time-stepped coordination over pre-timestamped node events.

use crate::decode::EventRecord;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("time quantum must be positive")]
    ZeroQuantum,
    #[error("cannot advance backwards: target={target} < current={current}")]
    Backwards { target: u64, current: u64 },
}

/// Events delivered for one coordinator step, covering `[start_us, end_us)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: u64,
    pub start_us: u64,
    pub end_us: u64,
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepSchedule {
    pub steps: Vec<StepReport>,
    /// Events stamped at or after the end of the run.
    pub unassigned: Vec<EventRecord>,
}

impl StepSchedule {
    pub fn delivered(&self) -> usize {
        self.steps.iter().map(|s| s.events.len()).sum()
    }
}

/// Conservative lockstep clock of the coordinator.
#[derive(Debug, Clone)]
pub struct TimeStepper {
    quantum_us: u64,
    current_time_us: u64,
}

impl TimeStepper {
    pub fn new(quantum_us: u64) -> Result<Self, StepError> {
        if quantum_us == 0 {
            return Err(StepError::ZeroQuantum);
        }
        Ok(Self {
            quantum_us,
            current_time_us: 0,
        })
    }

    pub fn current_time_us(&self) -> u64 {
        self.current_time_us
    }

    pub fn quantum_us(&self) -> u64 {
        self.quantum_us
    }

    /// Next step boundary, capped at `duration_us`.
    pub fn next_target(&self, duration_us: u64) -> u64 {
        (self.current_time_us + self.quantum_us).min(duration_us)
    }

    /// Moves the clock to `target_us`, returning the window just covered.
    pub fn advance(&mut self, target_us: u64) -> Result<(u64, u64), StepError> {
        if target_us < self.current_time_us {
            return Err(StepError::Backwards {
                target: target_us,
                current: self.current_time_us,
            });
        }
        let start = self.current_time_us;
        self.current_time_us = target_us;
        Ok((start, target_us))
    }

    /// Steps from the current time to `duration_us`, handing each event to
    /// the step whose window contains its timestamp.
    pub fn bucket(&mut self, events: &[EventRecord], duration_us: u64) -> Result<StepSchedule, StepError> {
        let mut schedule = StepSchedule::default();
        let mut step = 0;
        while self.current_time_us < duration_us {
            let target = self.next_target(duration_us);
            let (start_us, end_us) = self.advance(target)?;
            let in_window = events
                .iter()
                .filter(|e| e.time_us >= start_us && e.time_us < end_us)
                .cloned()
                .collect();
            schedule.steps.push(StepReport {
                step,
                start_us,
                end_us,
                events: in_window,
            });
            step += 1;
        }
        schedule.unassigned = events
            .iter()
            .filter(|e| e.time_us >= self.current_time_us)
            .cloned()
            .collect();
        Ok(schedule)
    }
}
