//! # ytspec Common Library
//!
//! Shared code for the ytspec amplitude-envelope tool:
//! - Error taxonomy (`Error`, `Result`)
//! - Configuration object and its resolution
//! - Sample/clip data model
//! - Half-up rounding primitive and the quantizer
//! - JSON output views (flat and structured)

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod rounding;

pub use error::{Error, Result};
pub use model::{ClipResult, NormalizedSample, PeakValue, Resolution, ScaledValue};
pub use rounding::{quantize, round_to, SCALE_FACTOR};
