//! Scripted transports and collecting sinks for exercising the acquisition
//! core without hardware.

pub mod channels;
pub mod sinks;

pub use channels::{framed_stream, noisy_stream, ScriptedChannel, ScriptedOpener};
pub use sinks::{ClosedSink, CollectorSink};
