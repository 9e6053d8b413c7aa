// src/sample.rs - synthetic sensor readings
use crate::config::{SENSOR_MAX_VALUE, SENSOR_MIN_VALUE};
use crate::generator::ValueGenerator;

/// Resolution of the raw-to-fraction reduction.
const SAMPLE_STEPS: u32 = 10_000;

/// Turns generator output into readings in `[SENSOR_MIN_VALUE, SENSOR_MAX_VALUE)`.
#[derive(Debug, Clone, Default)]
pub struct SampleSynthesizer {
    generator: ValueGenerator,
}

impl SampleSynthesizer {
    pub fn new(generator: ValueGenerator) -> Self {
        Self { generator }
    }

    /// Advances the generator once and maps the result into the sensor range.
    pub fn next_sample(&mut self) -> f32 {
        map_raw(self.generator.advance())
    }

    pub fn generator(&self) -> &ValueGenerator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut ValueGenerator {
        &mut self.generator
    }
}

/// Maps a raw generator word into the sensor range.
///
/// Only the low decimal digits survive the modulo; the higher bits are
/// dropped on purpose so readings match existing captures bit for bit.
pub fn map_raw(raw: u32) -> f32 {
    let range = SENSOR_MAX_VALUE - SENSOR_MIN_VALUE;
    let normalized = (raw % SAMPLE_STEPS) as f32 / SAMPLE_STEPS as f32;
    SENSOR_MIN_VALUE + normalized * range
}
