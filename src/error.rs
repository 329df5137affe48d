//! Unified error types for the emergency core.
//!
//! A single `Error` enum that every subsystem converts into.  None of these
//! are fatal: a malformed sample is dropped, a delivery failure is reported
//! upward as a non-fatal event, and a bad config is rejected before it is
//! applied.  In every case the outcome is "no transition occurred".

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A motion sample was rejected before classification.
    Sample(SampleError),
    /// An alert or call intent could not be handed to its collaborator.
    Delivery(DeliveryError),
    /// Configuration is invalid or could not be decoded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sample(e) => write!(f, "sample: {e}"),
            Self::Delivery(e) => write!(f, "delivery: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sample errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// Acceleration contained NaN or an infinity.
    NonFinite,
    /// Acceleration magnitude is beyond anything a body-worn sensor reports.
    OutOfRange,
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite => write!(f, "non-finite acceleration"),
            Self::OutOfRange => write!(f, "acceleration out of range"),
        }
    }
}

impl From<SampleError> for Error {
    fn from(e: SampleError) -> Self {
        Self::Sample(e)
    }
}

// ---------------------------------------------------------------------------
// Delivery errors
// ---------------------------------------------------------------------------

/// Returned by [`AlertPort`](crate::app::ports::AlertPort) and
/// [`DialerPort`](crate::app::ports::DialerPort) implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DeliveryError {
    /// The channel is not available on this device (no speaker, no modem).
    Unavailable,
    /// The collaborator refused the intent.
    Rejected,
    /// The user has not granted the permission the channel needs.
    PermissionDenied,
    /// Generic transport failure.
    Io,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "channel unavailable"),
            Self::Rejected => write!(f, "rejected by collaborator"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl From<DeliveryError> for Error {
    fn from(e: DeliveryError) -> Self {
        Self::Delivery(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.  Names the field and the rule.
    ValidationFailed(&'static str),
    /// The encoded config could not be decoded.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed => write!(f, "malformed config"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
