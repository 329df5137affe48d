//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the emergency orchestration rules: detectors feed
//! candidates into the FSM, FSM transitions become alert and call intents.
//! All interaction with the device happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without sensors, speakers
//! or a phone.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
