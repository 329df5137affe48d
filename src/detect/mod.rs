//! Stateless classifiers that turn raw readings into emergency candidates.
//!
//! Neither classifier holds emergency state.  The motion detector keeps
//! only its fall suppression window; the vitals evaluator keeps nothing
//! beyond its configured bands.

pub mod motion;
pub mod vitals;

pub use motion::{MotionAnomaly, MotionAnomalyDetector};
pub use vitals::{VitalsAnomalyEvaluator, VitalsFlag};
