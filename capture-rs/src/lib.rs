//! # Crate capture-rs
//!
//! ## capture-rs
//!
//! The `capture-rs` crate acquires raw accelerometer data from wireless
//! sensor boards attached as serial channels and turns the unframed byte
//! stream into calibrated physical measurements.
//!
//! Features include:
//! - Start-byte detection by majority vote over a short observation window.
//! - Offset calibration as the median of a decoded sample window.
//! - Concurrent, duration-bounded capture across independent channels, with
//!   per-sample frame validation and one output file per channel.
//! - A bandwidth-limited downsampling streamer for live plotting.
//!
//! Transports are abstracted behind the [`ports::ByteStream`] and
//! [`ports::ChannelOpener`] traits; the production adapter speaks to the
//! boards over a serial port.

pub mod adapters;
pub mod calibrate;
pub mod capture;
pub mod decode;
pub mod ports;
pub mod preview;
pub mod services;
pub mod sink;
pub mod sync;

pub use services::AcquisitionService;
