//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no sensors,
//! speaker or phone required.

mod delivery_tests;
mod mock_ports;
mod orchestrator_tests;
mod runtime_tests;
