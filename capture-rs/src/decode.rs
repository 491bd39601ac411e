//! Sample decoding: two raw bytes -> hex -> integer -> physical unit.
//!
//! The transform is pure; values stay at full precision and are rounded only
//! when rendered for output.

use common::constants::SAMPLE_SIZE;
use common::{DecodedRecord, DecodedValue};

/// Decodes one 2-byte raw sample.
///
/// The raw integer is the big-endian interpretation of the pair, matching
/// the hex-string decode the boards were characterized with.
pub fn decode_sample(sample: [u8; 2], sensitivity: f64, offset: f64) -> DecodedValue {
    let raw_hex = format!("{:02x}{:02x}", sample[0], sample[1]);
    let raw = u16::from_be_bytes(sample) as f64;
    let value = raw * sensitivity;
    DecodedValue {
        raw_hex,
        value,
        corrected: value - offset,
    }
}

/// Whether `lead` is an acceptable frame marker for `start_byte`.
///
/// A tolerance of one absorbs marker jitter from transmission noise. The
/// comparison does not wrap: 0x00 has no predecessor and 0xff no successor.
pub fn accepts(lead: u8, start_byte: u8) -> bool {
    let delta = lead as i16 - start_byte as i16;
    (-1..=1).contains(&delta)
}

/// Scans a raw capture buffer into the record stream written to disk.
///
/// A sample whose leading byte passes [`accepts`] is decoded and the scan
/// advances by the full sample; anything else emits the rejected sentinel
/// and advances by a single byte, which is what lets the scan regain
/// alignment after a dropped or duplicated byte. A trailing lone byte is
/// rejected since it cannot form a sample.
///
/// Returns the records in stream order and the rejected-sample count.
pub fn scan_records(
    data: &[u8],
    start_byte: u8,
    sensitivity: f64,
    offset: f64,
) -> (Vec<DecodedRecord>, u64) {
    let mut records = Vec::with_capacity(data.len() / SAMPLE_SIZE);
    let mut rejected = 0u64;
    let mut i = 0usize;

    while i < data.len() {
        if i + SAMPLE_SIZE <= data.len() && accepts(data[i], start_byte) {
            let value = decode_sample([data[i], data[i + 1]], sensitivity, offset);
            records.push(DecodedRecord::Valid(value));
            i += SAMPLE_SIZE;
        } else {
            records.push(DecodedRecord::Rejected);
            rejected += 1;
            i += 1;
        }
    }

    (records, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value_scenario() {
        // 0x7564 = 30052; 30052 * 0.08 = 2404.16, minus offset 1.00.
        let value = decode_sample([0x75, 0x64], 0.08, 1.00);
        assert_eq!(value.raw_hex, "7564");
        assert!((value.value - 2404.16).abs() < 1e-9);
        assert!((value.corrected - 2403.16).abs() < 1e-9);
    }

    #[test]
    fn test_decode_is_idempotent() {
        let a = decode_sample([0x7e, 0x64], 0.08, 1.00);
        let b = decode_sample([0x7e, 0x64], 0.08, 1.00);
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_trip_within_rounding() {
        // Encode a known physical value, decode it again.
        let physical: f64 = 2404.16;
        let raw = (physical / 0.08).round() as u16;
        let value = decode_sample(raw.to_be_bytes(), 0.08, 0.0);
        assert!((value.value - physical).abs() <= 0.08);
    }

    #[test]
    fn test_marker_tolerance() {
        assert!(accepts(0x7d, 0x7e));
        assert!(accepts(0x7e, 0x7e));
        assert!(accepts(0x7f, 0x7e));
        assert!(!accepts(0x80, 0x7e));
        // No wrapping at the value range boundaries.
        assert!(!accepts(0xff, 0x00));
        assert!(!accepts(0x00, 0xff));
    }

    #[test]
    fn test_scan_accepts_aligned_stream() {
        let data = [0x7e, 0x10, 0x7d, 0x20, 0x7f, 0x30];
        let (records, rejected) = scan_records(&data, 0x7e, 0.08, 0.0);
        assert_eq!(records.len(), 3);
        assert_eq!(rejected, 0);
        assert!(records.iter().all(|r| !r.is_rejected()));
    }

    #[test]
    fn test_scan_resynchronizes_after_dropped_byte() {
        // One stray byte between samples: rejected, then the scan realigns.
        let data = [0x7e, 0x10, 0x33, 0x7e, 0x20];
        let (records, rejected) = scan_records(&data, 0x7e, 0.08, 0.0);
        assert_eq!(rejected, 1);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], DecodedRecord::Rejected);
        assert!(!records[2].is_rejected());
    }

    #[test]
    fn test_scan_rejects_everything_outside_tolerance() {
        // Every leading byte outside the tolerance: one rejected record per
        // byte position, since rejection advances a single byte at a time.
        let data = [0x10u8; 7];
        let (records, rejected) = scan_records(&data, 0x7e, 0.08, 0.0);
        assert_eq!(rejected, 7);
        assert_eq!(records.len(), 7);
        assert!(records.iter().all(|r| r.is_rejected()));
    }

    #[test]
    fn test_trailing_lone_byte_is_rejected() {
        let data = [0x7e, 0x10, 0x7e];
        let (records, rejected) = scan_records(&data, 0x7e, 0.08, 0.0);
        assert_eq!(records.len(), 2);
        assert_eq!(rejected, 1);
        assert_eq!(records[1], DecodedRecord::Rejected);
    }
}
