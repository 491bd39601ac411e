use std::fmt;

/// A decoded physical measurement, kept at full precision.
///
/// Rounding to two decimal places happens only when a record is rendered
/// for output, so intermediate stages do not compound rounding error.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedValue {
    /// The raw sample as four lowercase hex characters.
    pub raw_hex: String,
    /// Sensitivity-scaled value before offset correction.
    pub value: f64,
    /// Offset-corrected value.
    pub corrected: f64,
}

/// The unit written to a capture file: either a decoded sample or the
/// sentinel for a rejected frame. Record order equals stream arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRecord {
    Valid(DecodedValue),
    Rejected,
}

impl DecodedRecord {
    pub fn is_rejected(&self) -> bool {
        matches!(self, DecodedRecord::Rejected)
    }
}

impl fmt::Display for DecodedRecord {
    /// Renders the record as one capture-file line, rounding to two
    /// decimal places at this presentation boundary only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedRecord::Valid(v) => {
                write!(f, "{},{:.2},{:.2}", v.raw_hex, v.value, v.corrected)
            }
            DecodedRecord::Rejected => write!(f, "NA,NA,NA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_record_line() {
        let record = DecodedRecord::Valid(DecodedValue {
            raw_hex: "7564".to_string(),
            value: 2404.16,
            corrected: 2403.16,
        });
        assert_eq!(record.to_string(), "7564,2404.16,2403.16");
    }

    #[test]
    fn test_rejected_record_line() {
        assert_eq!(DecodedRecord::Rejected.to_string(), "NA,NA,NA");
        assert!(DecodedRecord::Rejected.is_rejected());
    }

    #[test]
    fn test_rounding_happens_at_presentation() {
        let record = DecodedRecord::Valid(DecodedValue {
            raw_hex: "0001".to_string(),
            value: 0.08,
            corrected: 0.075_555,
        });
        assert_eq!(record.to_string(), "0001,0.08,0.08");
    }
}
