//! Sample and clip data model
//!
//! Raw amplitudes are plain `f64` values whose position in the extractor's
//! output is the slice index. Everything downstream of the quantizer is typed.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Amplitude slices per second of audio
///
/// Slice `t` covers wall-clock seconds `[t / resolution, (t + 1) / resolution)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Resolution(NonZeroU32);

impl Resolution {
    /// Slices per second used when nothing else is configured
    pub const DEFAULT: u32 = 4;

    /// Create a resolution, rejecting zero
    pub fn new(slices_per_second: u32) -> Result<Self> {
        NonZeroU32::new(slices_per_second)
            .map(Self)
            .ok_or_else(|| Error::Config("resolution must be a positive integer".to_string()))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Start of slice `timestamp` in seconds
    pub fn slice_start_seconds(self, timestamp: u64) -> f64 {
        timestamp as f64 / self.get() as f64
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(NonZeroU32::new(Self::DEFAULT).unwrap_or(NonZeroU32::MIN))
    }
}

impl TryFrom<u32> for Resolution {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Resolution> for u32 {
    fn from(value: Resolution) -> Self {
        value.get()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/s", self.get())
    }
}

/// A raw amplitude after scaling by 1e6 and half-up rounding
///
/// Recomputed on demand from the raw sample; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScaledValue(pub i64);

impl ScaledValue {
    pub fn get(self) -> i64 {
        self.0
    }
}

/// Largest scaled value in a clip; the normalization denominator
///
/// The running maximum starts at zero, so a peak is never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PeakValue(i64);

impl PeakValue {
    /// Reduce a sequence of scaled values to its peak
    ///
    /// Visit order does not matter. An empty sequence has a peak of zero.
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = ScaledValue>,
    {
        Self(values.into_iter().map(ScaledValue::get).fold(0, i64::max))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// One point of the normalized envelope
///
/// `value` lies in `[0, 1]` whenever the clip has a non-zero peak and
/// non-negative amplitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NormalizedSample {
    /// Slice index (0-based)
    pub timestamp: u64,
    /// Fraction of the clip peak
    pub value: f64,
}

impl NormalizedSample {
    pub fn new(timestamp: u64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Wall-clock start of this sample's slice
    pub fn seconds(&self, resolution: Resolution) -> f64 {
        resolution.slice_start_seconds(self.timestamp)
    }
}

/// The unit handed to a result sink
///
/// Serializes as `{"Id": ..., "SampleData": [...]}`. Resolution and peak are
/// carried for logging and sinks but are not part of the wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClipResult {
    pub id: String,
    pub sample_data: Vec<NormalizedSample>,
    #[serde(skip)]
    pub resolution: Resolution,
    #[serde(skip)]
    pub peak: PeakValue,
}

impl ClipResult {
    pub fn new(id: impl Into<String>, sample_data: Vec<NormalizedSample>) -> Self {
        Self {
            id: id.into(),
            sample_data,
            resolution: Resolution::default(),
            peak: PeakValue::default(),
        }
    }

    /// Result with no samples (decode failure tolerated by configuration)
    pub fn empty(id: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            resolution,
            ..Self::new(id, Vec::new())
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_peak(mut self, peak: PeakValue) -> Self {
        self.peak = peak;
        self
    }

    pub fn len(&self) -> usize {
        self.sample_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_data.is_empty()
    }

    /// Clip length implied by sample count and resolution
    pub fn duration_seconds(&self) -> f64 {
        self.resolution.slice_start_seconds(self.sample_data.len() as u64)
    }
}
