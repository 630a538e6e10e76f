//! Error types for the hqm driver.
//!
//! The driver uses a single closed taxonomy, [`HqmError`], for everything the
//! initialization layer can report: malformed configuration strings, values
//! outside hardware bounds, missing required inputs, failed hardware-interface
//! calls, and primary/secondary version incompatibilities.
//!
//! The framework that owns device lifecycle callbacks speaks a C-style status
//! convention (0 = success, negative = error). [`HqmError::status`] provides
//! that mapping; hardware-interface status codes pass through unchanged.

use thiserror::Error;

/// errno-style status codes used on the framework-facing error surface.
pub mod status {
    /// Invalid argument.
    pub const EINVAL: i32 = 22;
    /// Operation not supported.
    pub const EOPNOTSUPP: i32 = 95;
}

/// Raw status returned by a failed hardware-interface call.
///
/// The underlying transport (ioctl, mmap, kernel-driver query) reports signed
/// status codes. The driver never reinterprets them; they are carried here
/// and surfaced unchanged through [`HqmError::HardwareQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("hardware interface call failed with status {0}")]
pub struct HwError(pub i32);

/// Primary error type for the hqm initialization layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HqmError {
    /// A configuration value could not be parsed.
    ///
    /// Raised by the numeric parser and the queue-threshold builder for
    /// empty, non-numeric, out-of-integer-range, or syntactically invalid
    /// input. `key` names the devarg being parsed.
    #[error("invalid value '{value}' for devarg '{key}'")]
    Parse {
        /// Devarg key being parsed when the failure occurred.
        key: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A configuration value parsed but falls outside hardware bounds.
    #[error("devarg '{key}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Devarg key whose bound was violated.
        key: &'static str,
        /// The parsed value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// A required input was absent.
    ///
    /// Defensive contract on the validators: an empty value string (e.g.
    /// `socket_id=`) is rejected here rather than fed to the parser.
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),

    /// An underlying hardware/kernel-driver interface call failed.
    ///
    /// `code` is the transport's status, propagated unchanged.
    #[error("hardware query failed with status {code}")]
    HardwareQuery {
        /// Status code reported by the hardware interface.
        code: i32,
    },

    /// The device version is incompatible with this driver or with the
    /// primary process that initialized the device.
    #[error("device version {found} is not compatible with {expected}")]
    VersionMismatch {
        /// The version required (driver-supported, or primary-recorded).
        expected: String,
        /// The version the hardware reported.
        found: String,
    },
}

impl HqmError {
    /// Map to the framework's signed-integer status convention.
    ///
    /// Always negative. Hardware-interface codes pass through unchanged.
    #[must_use]
    pub fn status(&self) -> i32 {
        match self {
            HqmError::Parse { .. }
            | HqmError::OutOfRange { .. }
            | HqmError::MissingArgument(_) => -status::EINVAL,
            HqmError::HardwareQuery { code } => *code,
            HqmError::VersionMismatch { .. } => -status::EOPNOTSUPP,
        }
    }
}

impl From<HwError> for HqmError {
    fn from(err: HwError) -> Self {
        HqmError::HardwareQuery { code: err.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_names_the_key() {
        let err = HqmError::Parse {
            key: "max_num_events",
            value: "banana".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value 'banana' for devarg 'max_num_events'"
        );
    }

    #[test]
    fn out_of_range_display_includes_bounds() {
        let err = HqmError::OutOfRange {
            key: "cos",
            value: 9,
            min: -1,
            max: 3,
        };
        assert_eq!(err.to_string(), "devarg 'cos' must be between -1 and 3, got 9");
    }

    #[test]
    fn status_codes_are_negative() {
        let cases: Vec<HqmError> = vec![
            HqmError::Parse {
                key: "dev_id",
                value: "x".into(),
            },
            HqmError::OutOfRange {
                key: "socket_id",
                value: 99,
                min: 0,
                max: 32,
            },
            HqmError::MissingArgument("cos"),
            HqmError::HardwareQuery { code: -5 },
            HqmError::VersionMismatch {
                expected: "2.x".into(),
                found: "1.0".into(),
            },
        ];
        for err in cases {
            assert!(err.status() < 0, "non-negative status for {err:?}");
        }
    }

    #[test]
    fn hardware_query_status_passes_through_unchanged() {
        let err: HqmError = HwError(-71).into();
        assert_eq!(err, HqmError::HardwareQuery { code: -71 });
        assert_eq!(err.status(), -71);
    }
}
