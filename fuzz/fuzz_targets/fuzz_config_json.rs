//! Fuzz target: `EmergencyConfig::from_json`
//!
//! Any accepted document must validate, survive a postcard round-trip, and
//! construct a working service.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use lifeline::config::EmergencyConfig;
use lifeline::app::service::EmergencyService;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = EmergencyConfig::from_json(text) else {
        return;
    };

    assert!(config.validate().is_ok());
    let bytes = config.to_postcard().expect("accepted config encodes");
    let decoded = EmergencyConfig::from_postcard(&bytes).expect("accepted config decodes");
    assert_eq!(decoded, config);

    let svc = EmergencyService::new(config);
    assert_eq!(svc.config().countdown_secs, decoded.countdown_secs);

    // Re-serialising through JSON must also be accepted.
    let json = serde_json::to_string(&decoded).expect("serialises");
    assert!(EmergencyConfig::from_json(&json).is_ok());
});
