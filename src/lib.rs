//! Emulator for the wired-remote-controller serial protocol of packaged
//! air-conditioning indoor units.
//!
//! The emulator presents itself on the bus as an indoor unit: it extracts
//! frames from the raw byte stream, answers link-establishment and
//! equipment-information commands, applies object writes to an emulated
//! register bank, and reports object status and equipment-confirmation
//! capabilities for one of three supported unit models.

pub mod config;
pub mod device;
pub mod persist;
pub mod protocol;
pub mod service;
