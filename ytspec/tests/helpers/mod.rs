//! Test Helper Utilities
//!
//! Shared utilities for testing ytspec

#![allow(dead_code)]

pub mod audio_generator;
pub mod fakes;

pub use audio_generator::{generate_test_wav, AudioConfig};
pub use fakes::{FixedExtractor, RecordingSink};
