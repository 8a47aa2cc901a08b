//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`MarrowError`] covers all failure modes:
//! - Channel construction with malformed sample arrays
//! - Invalid sub-range bounds when trimming channels
//! - Structural problems in clips (duplicate channel names)
//! - Deserialization faults when restoring persisted data
//!
//! Sampling, pose evaluation and trigger arming are total over well-formed
//! inputs and never return an error.
//!
//! # Usage
//!
//! Fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, MarrowError>`.

use thiserror::Error;

/// The main error type for the marrow animation core.
#[derive(Error, Debug)]
pub enum MarrowError {
    // ========================================================================
    // Channel Construction Errors
    // ========================================================================
    /// A channel payload array does not line up with its time array.
    #[error("channel '{channel}': {payload} has {payload_len} entries but times has {times_len}")]
    MismatchedSampleArrays {
        /// Name of the offending channel
        channel: String,
        /// Which payload array disagreed
        payload: &'static str,
        /// Number of time samples
        times_len: usize,
        /// Number of payload entries
        payload_len: usize,
    },

    /// A sub-range request fell outside the channel's samples.
    #[error("channel '{channel}': invalid sample range [{start}, {end}] for {count} samples")]
    InvalidSampleRange {
        /// Name of the source channel
        channel: String,
        /// Requested start sample (inclusive)
        start: usize,
        /// Requested end sample (inclusive)
        end: usize,
        /// Samples available in the source channel
        count: usize,
    },

    /// A sub-range request had its time bounds reversed.
    #[error("channel '{channel}': invalid time range [{start}, {end}]")]
    InvalidTimeRange {
        /// Name of the source channel
        channel: String,
        /// Requested start time
        start: f32,
        /// Requested end time
        end: f32,
    },

    // ========================================================================
    // Clip Structure Errors
    // ========================================================================
    /// Per-instance channel state is keyed by name, so names must be unique
    /// within one clip.
    #[error("clip '{clip}' already has a channel named '{channel}'")]
    DuplicateChannel {
        /// Name of the clip
        clip: String,
        /// The colliding channel name
        channel: String,
    },

    // ========================================================================
    // Persistence Errors
    // ========================================================================
    /// Persisted data decoded structurally but failed semantic validation.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, MarrowError>`.
pub type Result<T> = std::result::Result<T, MarrowError>;
