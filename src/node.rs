//! Sensor node context and execution modes.
//!
//! [`SensorNode`] owns everything a run mutates: the sample synthesizer (and
//! with it the generator state), the virtual clock and the emission sink.
//! [`ExecutionMode`] picks one of two disciplines at startup:
//!
//! - **Emulation**: emit [`EMULATION_BURST_SIZE`] samples immediately, stamped
//!   `0, 1s, 2s, ...`, then idle forever. A stepped coordinator buckets the
//!   pre-timestamped events into its own time steps after the fact.
//! - **Production**: emit one sample stamped with the virtual clock, sleep one
//!   interval, advance the clock, repeat forever.

use crate::config::{EMULATION_BURST_SIZE, SAMPLE_INTERVAL_US};
use crate::event::Event;
use crate::generator::ValueGenerator;
use crate::hardware::EmissionSink;
use crate::sample::SampleSynthesizer;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Emulation,
    Production,
}

impl ExecutionMode {
    /// Mode compiled into this binary (`emulation` cargo feature).
    pub const fn configured() -> Self {
        if cfg!(feature = "emulation") {
            ExecutionMode::Emulation
        } else {
            ExecutionMode::Production
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExecutionMode::Emulation => "emulation",
            ExecutionMode::Production => "production",
        }
    }
}

/// Where the node loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Boot,
    BurstEmit,
    Idle,
    Sample,
    Sleep,
}

/// Simulated time in microseconds, advanced only by the production loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now_us: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self { now_us: 0 }
    }

    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    pub fn advance(&mut self, step_us: u64) {
        self.now_us += step_us;
    }
}

#[derive(Debug)]
pub struct SensorNode {
    synthesizer: SampleSynthesizer,
    sink: EmissionSink,
    clock: VirtualClock,
    state: NodeState,
    dropped_events: u64,
}

impl SensorNode {
    pub fn new(sink: EmissionSink) -> Self {
        Self::with_generator(ValueGenerator::new(), sink)
    }

    pub fn with_generator(mut generator: ValueGenerator, sink: EmissionSink) -> Self {
        generator.init();
        Self {
            synthesizer: SampleSynthesizer::new(generator),
            sink,
            clock: VirtualClock::new(),
            state: NodeState::Boot,
            dropped_events: 0,
        }
    }

    /// Runs the node in the given mode. Never returns.
    pub async fn run(&mut self, mode: ExecutionMode) {
        match mode {
            ExecutionMode::Emulation => {
                tracing::info!("*** EMULATION MODE: Deterministic sampling ***");
                self.emit_burst().await;
                std::future::pending::<()>().await;
            }
            ExecutionMode::Production => loop {
                self.production_step().await;
            },
        }
    }

    /// Emulation burst: every sample emitted back to back with a precomputed
    /// timestamp. Returns how many events reached the sink.
    pub async fn emit_burst(&mut self) -> u64 {
        self.state = NodeState::BurstEmit;
        let mut emitted = 0;
        for sample_idx in 0..EMULATION_BURST_SIZE {
            if self.sample_and_emit(sample_idx * SAMPLE_INTERVAL_US).await {
                emitted += 1;
            }
        }
        tracing::info!(
            "*** EMULATION MODE: {} samples emitted, entering idle ***",
            EMULATION_BURST_SIZE
        );
        self.state = NodeState::Idle;
        emitted
    }

    /// One production iteration: sample, emit at the clock, sleep, advance.
    pub async fn production_step(&mut self) {
        self.state = NodeState::Sample;
        self.sample_and_emit(self.clock.now_us()).await;

        self.state = NodeState::Sleep;
        tokio::time::sleep(Duration::from_micros(SAMPLE_INTERVAL_US)).await;
        self.clock.advance(SAMPLE_INTERVAL_US);
    }

    /// Draws the next sample and emits it stamped `time_us`.
    /// Encode and write failures are logged and the event is dropped.
    async fn sample_and_emit(&mut self, time_us: u64) -> bool {
        let value = self.synthesizer.next_sample();
        let encoded = match Event::sample(value, time_us).encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!("Error formatting JSON: {}", e);
                self.dropped_events += 1;
                return false;
            }
        };

        tracing::debug!("Event TX: {}", encoded.as_str().trim_end());
        match self.sink.emit(encoded.as_bytes()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Event at {} us not delivered: {}", time_us, e);
                self.dropped_events += 1;
                false
            }
        }
    }

    pub fn sink(&self) -> &EmissionSink {
        &self.sink
    }

    pub fn clock(&self) -> VirtualClock {
        self.clock
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn generator(&self) -> &ValueGenerator {
        self.synthesizer.generator()
    }

    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }
}
