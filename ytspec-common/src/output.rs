//! JSON views of a clip result
//!
//! Two wire shapes are supported over the same typed data:
//! - `Flat`: `{"0": 0.5, "1": 1.0, ...}`
//! - `Structured`: `{"Id": "...", "SampleData": [{"Timestamp": 0, "Value": 0.5}, ...]}`

use crate::model::{ClipResult, NormalizedSample};
use crate::Result;
use serde::{Deserialize, Serialize, Serializer};

/// Selects the JSON shape emitted by sinks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// Timestamp-keyed object of values
    Flat,
    /// Identifier plus an array of timestamp/value records
    #[default]
    Structured,
}

impl OutputShape {
    /// Encode the whole clip in this shape
    pub fn document(self, result: &ClipResult) -> Result<String> {
        let json = match self {
            OutputShape::Flat => serde_json::to_string(&FlatSamples(&result.sample_data))?,
            OutputShape::Structured => serde_json::to_string(result)?,
        };
        Ok(json)
    }
}

/// Encode only the sample array (no identifier), whatever the output shape
///
/// Used where the identifier is stored alongside, e.g. as a database key.
pub fn sample_array(result: &ClipResult) -> Result<String> {
    Ok(serde_json::to_string(&result.sample_data)?)
}

impl std::str::FromStr for OutputShape {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flat" => Ok(OutputShape::Flat),
            "structured" => Ok(OutputShape::Structured),
            other => Err(crate::Error::Config(format!(
                "unknown output shape '{}' (expected flat or structured)",
                other
            ))),
        }
    }
}

/// Timestamp-to-value map view, keys emitted in timestamp order
pub struct FlatSamples<'a>(pub &'a [NormalizedSample]);

impl Serialize for FlatSamples<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|s| (s.timestamp, s.value)))
    }
}
