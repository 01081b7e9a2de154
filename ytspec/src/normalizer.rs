//! Peak-relative normalization of an amplitude envelope
//!
//! Two passes over the raw samples:
//! 1. **Peak pass:** quantize every sample and keep the running maximum
//! 2. **Normalize pass:** quantize every sample again and divide by the peak
//!
//! The denominator is the clip-wide peak, so the second pass cannot start
//! until the first has seen every sample.

use ytspec_common::{
    quantize, round_to, ClipResult, Error, NormalizedSample, PeakValue, Resolution, Result,
};

/// Normalizes raw amplitudes against the clip peak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationPipeline {
    /// Optional half-up rounding of each normalized value
    value_places: Option<u32>,
}

impl NormalizationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Round every normalized value to `places` decimals (e.g. `Some(2)`)
    pub fn with_value_places(mut self, places: Option<u32>) -> Self {
        self.value_places = places;
        self
    }

    /// Peak pass
    ///
    /// # Errors
    /// * `Error::NonFiniteSample` - a raw value is NaN or infinite
    pub fn peak(raw: &[f64]) -> Result<PeakValue> {
        if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteSample { index });
        }
        Ok(PeakValue::of(raw.iter().map(|&v| quantize(v))))
    }

    /// Both passes; output timestamps mirror input indices
    ///
    /// # Errors
    /// * `Error::NonFiniteSample` - a raw value is NaN or infinite
    /// * `Error::DegenerateInput` - empty input or every sample quantizes to zero
    pub fn normalize(&self, raw: &[f64]) -> Result<Vec<NormalizedSample>> {
        let peak = Self::peak(raw)?;
        self.normalize_against(raw, peak)
    }

    /// Normalize a clip and wrap it for a sink
    pub fn run(&self, id: impl Into<String>, raw: &[f64], resolution: Resolution) -> Result<ClipResult> {
        let peak = Self::peak(raw)?;
        let samples = self.normalize_against(raw, peak)?;

        tracing::debug!(
            samples = samples.len(),
            peak = peak.get(),
            resolution = resolution.get(),
            "Normalization complete"
        );

        Ok(ClipResult::new(id, samples)
            .with_resolution(resolution)
            .with_peak(peak))
    }

    fn normalize_against(&self, raw: &[f64], peak: PeakValue) -> Result<Vec<NormalizedSample>> {
        if peak.is_zero() {
            return Err(Error::DegenerateInput {
                sample_count: raw.len(),
            });
        }

        let denominator = peak.get() as f64;
        let samples = raw
            .iter()
            .enumerate()
            .map(|(t, &v)| {
                let value = quantize(v).get() as f64 / denominator;
                let value = match self.value_places {
                    Some(places) => round_to(value, places as i32),
                    None => value,
                };
                NormalizedSample::new(t as u64, value)
            })
            .collect();

        Ok(samples)
    }
}
