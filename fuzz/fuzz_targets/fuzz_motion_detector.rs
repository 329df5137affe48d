//! Fuzz target: `MotionAnomalyDetector::classify`
//!
//! Interprets the input as a stream of 32-byte records
//! `(dt_ms: u64, ax: f64, ay: f64, az: f64)` and feeds them to the detector.
//!
//! Invariants checked:
//! - No panics under any bit pattern (NaN, infinities, subnormals)
//! - Malformed acceleration never classifies
//! - At most one `Fall` per suppression window
//!
//! cargo fuzz run fuzz_motion_detector

#![no_main]

use libfuzzer_sys::fuzz_target;
use lifeline::config::EmergencyConfig;
use lifeline::detect::{MotionAnomaly, MotionAnomalyDetector};
use lifeline::model::MotionSample;

fuzz_target!(|data: &[u8]| {
    let config = EmergencyConfig::default();
    let mut detector = MotionAnomalyDetector::new(&config);
    let mut now: u64 = 0;
    let mut last_fall: Option<u64> = None;

    for chunk in data.chunks_exact(32) {
        let word = |i: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&chunk[i * 8..i * 8 + 8]);
            b
        };
        now = now.saturating_add(u64::from_le_bytes(word(0)) % 10_000);
        let sample = MotionSample::accel(
            now,
            f64::from_le_bytes(word(1)),
            f64::from_le_bytes(word(2)),
            f64::from_le_bytes(word(3)),
        );

        match detector.classify(&sample) {
            Ok(found) => {
                assert!(sample.acceleration.is_finite());
                if found.contains(&MotionAnomaly::Fall) {
                    if let Some(prev) = last_fall {
                        assert!(now - prev >= config.fall_suppression_ms);
                    }
                    last_fall = Some(now);
                }
            }
            Err(_) => assert!(
                !sample.acceleration.is_finite()
                    || sample.acceleration.magnitude() > config.max_plausible_g
            ),
        }
    }
});
