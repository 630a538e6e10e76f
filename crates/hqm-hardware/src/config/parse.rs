//! Devargs tokenizer and argument validators.
//!
//! [`parse_device_args`] is the front end: it splits the devargs string into
//! `key=value` pairs against the closed `DevargKey` set and dispatches each
//! recognized key to its validator. Two failure severities apply:
//!
//! - Unrecognized keys or malformed tokens degrade to a warning and the
//!   device proceeds with defaults; the whole string is discarded, not just
//!   the offending token.
//! - A recognized key with an invalid value aborts the parse; the error
//!   carries the offending key.
//!
//! Validators never partially update the configuration record: each one
//! validates fully before assigning its field, and the front end hands the
//! record to the caller only on overall success.

use tracing::{error, warn};

use hqm_core::caps::CosDomain;
use hqm_core::error::HqmError;
use hqm_core::limits::{MAX_NUMA_NODES, MAX_NUM_DIR_CREDITS, MAX_NUM_LDB_CREDITS};

use super::{keys, DeviceConfig};

/// Parse a bounds-checked `i32` from a devargs value.
///
/// Accepts optional surrounding ASCII whitespace and a leading sign. Fails
/// with [`HqmError::Parse`] on empty input, non-numeric input (including
/// trailing garbage) and values outside `i32`.
pub(crate) fn parse_int(key: &'static str, value: &str) -> Result<i32, HqmError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|parsed| i32::try_from(parsed).ok())
        .ok_or_else(|| HqmError::Parse {
            key,
            value: value.to_string(),
        })
}

/// Validators reject `key=` (an empty value) before parsing.
fn require_value(key: &'static str, value: &str) -> Result<(), HqmError> {
    if value.trim().is_empty() {
        return Err(HqmError::MissingArgument(key));
    }
    Ok(())
}

fn set_socket_id(socket_id: &mut i32, value: &str) -> Result<(), HqmError> {
    require_value(keys::SOCKET_ID, value)?;
    let parsed = parse_int(keys::SOCKET_ID, value)?;
    // Negative node ids are rejected explicitly; the hardware has no notion
    // of a placeholder node at this layer.
    if !(0..=MAX_NUMA_NODES).contains(&parsed) {
        return Err(HqmError::OutOfRange {
            key: keys::SOCKET_ID,
            value: i64::from(parsed),
            min: 0,
            max: i64::from(MAX_NUMA_NODES),
        });
    }
    *socket_id = parsed;
    Ok(())
}

fn set_max_num_events(max_num_events: &mut u32, value: &str) -> Result<(), HqmError> {
    require_value(keys::MAX_NUM_EVENTS, value)?;
    let parsed = parse_int(keys::MAX_NUM_EVENTS, value)?;
    if parsed < 0 || parsed > MAX_NUM_LDB_CREDITS as i32 {
        return Err(HqmError::OutOfRange {
            key: keys::MAX_NUM_EVENTS,
            value: i64::from(parsed),
            min: 0,
            max: i64::from(MAX_NUM_LDB_CREDITS),
        });
    }
    *max_num_events = parsed as u32;
    Ok(())
}

fn set_num_dir_credits(num_dir_credits: &mut Option<u32>, value: &str) -> Result<(), HqmError> {
    require_value(keys::NUM_DIR_CREDITS, value)?;
    let parsed = parse_int(keys::NUM_DIR_CREDITS, value)?;
    if parsed < 0 || parsed > MAX_NUM_DIR_CREDITS as i32 {
        return Err(HqmError::OutOfRange {
            key: keys::NUM_DIR_CREDITS,
            value: i64::from(parsed),
            min: 0,
            max: i64::from(MAX_NUM_DIR_CREDITS),
        });
    }
    *num_dir_credits = Some(parsed as u32);
    Ok(())
}

fn set_dev_id(dev_id: &mut i32, value: &str) -> Result<(), HqmError> {
    require_value(keys::DEV_ID, value)?;
    let parsed = parse_int(keys::DEV_ID, value)?;
    // Any representable non-negative id is accepted; the kernel driver
    // decides whether such a device exists.
    if parsed < 0 {
        return Err(HqmError::OutOfRange {
            key: keys::DEV_ID,
            value: i64::from(parsed),
            min: 0,
            max: i64::from(i32::MAX),
        });
    }
    *dev_id = parsed;
    Ok(())
}

fn set_cos(cos: &mut CosDomain, value: &str) -> Result<(), HqmError> {
    require_value(keys::COS, value)?;
    let parsed = parse_int(keys::COS, value)?;
    let selected = CosDomain::from_devarg(parsed).ok_or(HqmError::OutOfRange {
        key: keys::COS,
        value: i64::from(parsed),
        min: i64::from(CosDomain::DEFAULT_SENTINEL),
        max: 3,
    })?;
    *cos = selected;
    Ok(())
}

// =============================================================================
// Key set and dispatch
// =============================================================================

/// The closed set of recognized devarg keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DevargKey {
    SocketId,
    MaxNumEvents,
    NumDirCredits,
    DevId,
    QidDepthThresh,
    Cos,
}

impl DevargKey {
    /// Validator dispatch order. Fixed and documented: together with
    /// per-occurrence dispatch it defines which of two overlapping
    /// threshold ranges wins.
    const DISPATCH_ORDER: [DevargKey; 6] = [
        DevargKey::SocketId,
        DevargKey::MaxNumEvents,
        DevargKey::NumDirCredits,
        DevargKey::DevId,
        DevargKey::QidDepthThresh,
        DevargKey::Cos,
    ];

    fn from_key(key: &str) -> Option<Self> {
        match key {
            keys::SOCKET_ID => Some(DevargKey::SocketId),
            keys::MAX_NUM_EVENTS => Some(DevargKey::MaxNumEvents),
            keys::NUM_DIR_CREDITS => Some(DevargKey::NumDirCredits),
            keys::DEV_ID => Some(DevargKey::DevId),
            keys::QID_DEPTH_THRESH => Some(DevargKey::QidDepthThresh),
            keys::COS => Some(DevargKey::Cos),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            DevargKey::SocketId => keys::SOCKET_ID,
            DevargKey::MaxNumEvents => keys::MAX_NUM_EVENTS,
            DevargKey::NumDirCredits => keys::NUM_DIR_CREDITS,
            DevargKey::DevId => keys::DEV_ID,
            DevargKey::QidDepthThresh => keys::QID_DEPTH_THRESH,
            DevargKey::Cos => keys::COS,
        }
    }

    fn apply(self, config: &mut DeviceConfig, value: &str) -> Result<(), HqmError> {
        match self {
            DevargKey::SocketId => set_socket_id(&mut config.socket_id, value),
            DevargKey::MaxNumEvents => set_max_num_events(&mut config.max_num_events, value),
            DevargKey::NumDirCredits => set_num_dir_credits(&mut config.num_dir_credits, value),
            DevargKey::DevId => set_dev_id(&mut config.dev_id, value),
            DevargKey::QidDepthThresh => config.qid_depth_thresholds.apply_spec(value),
            DevargKey::Cos => set_cos(&mut config.cos, value),
        }
    }
}

/// Parse a devargs string into a validated [`DeviceConfig`].
///
/// An empty or whitespace-only string is a no-op: defaults are returned.
/// `name` identifies the device in diagnostics.
pub fn parse_device_args(name: &str, params: &str) -> Result<DeviceConfig, HqmError> {
    let mut config = DeviceConfig::default();

    let params = params.trim();
    if params.is_empty() {
        return Ok(config);
    }

    // Tokenize the whole string first. One bad token discards all of it.
    let mut pairs: Vec<(DevargKey, &str)> = Vec::new();
    for token in params.split(',') {
        let Some((key, value)) = token.split_once('=') else {
            warn!(
                device = name,
                token, "ignoring unsupported parameters when creating device"
            );
            return Ok(config);
        };
        match DevargKey::from_key(key.trim()) {
            Some(key) => pairs.push((key, value)),
            None => {
                warn!(
                    device = name,
                    key, "ignoring unsupported parameters when creating device"
                );
                return Ok(config);
            }
        }
    }

    for key in DevargKey::DISPATCH_ORDER {
        for &(_, value) in pairs.iter().filter(|(k, _)| *k == key) {
            if let Err(err) = key.apply(&mut config, value) {
                error!(
                    device = name,
                    key = key.as_str(),
                    %err,
                    "error parsing devarg"
                );
                return Err(err);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hqm_core::limits::MAX_NUM_QUEUES;

    #[test]
    fn parse_int_handles_signs_and_whitespace() {
        assert_eq!(parse_int("dev_id", "42").unwrap(), 42);
        assert_eq!(parse_int("dev_id", " -7 ").unwrap(), -7);
        assert_eq!(parse_int("dev_id", "+5").unwrap(), 5);
    }

    #[test]
    fn parse_int_rejects_garbage_and_overflow() {
        for bad in ["", "  ", "abc", "1abc", "0x10", "1.5", "99999999999"] {
            assert!(
                matches!(parse_int("dev_id", bad), Err(HqmError::Parse { .. })),
                "accepted '{bad}'"
            );
        }
    }

    #[test]
    fn socket_id_rejects_negative() {
        // The lower bound is deliberate: no placeholder node id exists at
        // this layer.
        let mut socket_id = 0;
        let err = set_socket_id(&mut socket_id, "-1").unwrap_err();
        assert!(matches!(err, HqmError::OutOfRange { .. }));
        assert_eq!(socket_id, 0);
    }

    #[test]
    fn socket_id_accepts_max_node() {
        let mut socket_id = 0;
        set_socket_id(&mut socket_id, &MAX_NUMA_NODES.to_string()).unwrap();
        assert_eq!(socket_id, MAX_NUMA_NODES);

        let err = set_socket_id(&mut socket_id, &(MAX_NUMA_NODES + 1).to_string()).unwrap_err();
        assert!(matches!(err, HqmError::OutOfRange { .. }));
    }

    #[test]
    fn dev_id_rejects_negative() {
        let mut dev_id = 0;
        let err = set_dev_id(&mut dev_id, "-3").unwrap_err();
        assert!(matches!(err, HqmError::OutOfRange { .. }));
        assert_eq!(dev_id, 0);

        set_dev_id(&mut dev_id, "17").unwrap();
        assert_eq!(dev_id, 17);
    }

    #[test]
    fn max_num_events_bounds() {
        let mut max_num_events = 0;
        set_max_num_events(&mut max_num_events, "0").unwrap();
        assert_eq!(max_num_events, 0);
        set_max_num_events(&mut max_num_events, &MAX_NUM_LDB_CREDITS.to_string()).unwrap();
        assert_eq!(max_num_events, MAX_NUM_LDB_CREDITS);

        let too_big = (MAX_NUM_LDB_CREDITS + 1).to_string();
        for bad in ["-1", too_big.as_str()] {
            let err = set_max_num_events(&mut max_num_events, bad).unwrap_err();
            assert!(matches!(err, HqmError::OutOfRange { .. }), "value {bad}");
        }
    }

    #[test]
    fn num_dir_credits_bounds() {
        let mut num_dir_credits = None;
        set_num_dir_credits(&mut num_dir_credits, "512").unwrap();
        assert_eq!(num_dir_credits, Some(512));

        let mut untouched = None;
        let too_big = (MAX_NUM_DIR_CREDITS + 1).to_string();
        let err = set_num_dir_credits(&mut untouched, &too_big).unwrap_err();
        assert!(matches!(err, HqmError::OutOfRange { .. }));
        assert_eq!(untouched, None);
    }

    #[test]
    fn cos_accepts_sentinel_and_classes_only() {
        let mut cos = CosDomain::Default;
        set_cos(&mut cos, "-1").unwrap();
        assert_eq!(cos, CosDomain::Default);
        set_cos(&mut cos, "2").unwrap();
        assert_eq!(cos, CosDomain::Cos2);

        let err = set_cos(&mut cos, "9").unwrap_err();
        assert!(matches!(err, HqmError::OutOfRange { .. }));
        assert_eq!(cos, CosDomain::Cos2);
    }

    #[test]
    fn empty_value_is_a_missing_argument() {
        let mut cos = CosDomain::Default;
        assert_eq!(
            set_cos(&mut cos, "").unwrap_err(),
            HqmError::MissingArgument(keys::COS)
        );
    }

    #[test]
    fn empty_devargs_returns_defaults() {
        let config = parse_device_args("evdev_hqm0", "").unwrap();
        assert_eq!(config, DeviceConfig::default());

        let config = parse_device_args("evdev_hqm0", "   ").unwrap();
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn full_devargs_string_populates_every_field() {
        let config = parse_device_args(
            "evdev_hqm0",
            "socket_id=1,max_num_events=4096,num_dir_credits=256,dev_id=2,qid_depth_thresh=2-4:64,cos=1",
        )
        .unwrap();
        assert_eq!(config.socket_id, 1);
        assert_eq!(config.max_num_events, 4096);
        assert_eq!(config.num_dir_credits, Some(256));
        assert_eq!(config.dev_id, 2);
        assert_eq!(config.cos, CosDomain::Cos1);
        assert_eq!(
            config.qid_depth_thresholds.overrides().collect::<Vec<_>>(),
            vec![(2, 64), (3, 64), (4, 64)]
        );
    }

    #[test]
    fn unrecognized_key_degrades_to_defaults() {
        // The whole string is discarded, including the recognized keys in it.
        let config = parse_device_args("evdev_hqm0", "socket_id=1,frobnicate=9").unwrap();
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn malformed_token_degrades_to_defaults() {
        let config = parse_device_args("evdev_hqm0", "socket_id").unwrap();
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn invalid_value_for_recognized_key_aborts() {
        let err = parse_device_args("evdev_hqm0", "socket_id=1,cos=9").unwrap_err();
        assert_eq!(
            err,
            HqmError::OutOfRange {
                key: keys::COS,
                value: 9,
                min: -1,
                max: 3,
            }
        );
    }

    #[test]
    fn repeated_threshold_keys_apply_in_supplied_order() {
        let config = parse_device_args(
            "evdev_hqm0",
            "qid_depth_thresh=all:100,qid_depth_thresh=0-1:5",
        )
        .unwrap();
        assert_eq!(config.qid_depth_thresholds.get(0), 5);
        assert_eq!(config.qid_depth_thresholds.get(1), 5);
        for qid in 2..MAX_NUM_QUEUES {
            assert_eq!(config.qid_depth_thresholds.get(qid), 100);
        }
    }

    #[test]
    fn repeated_scalar_key_last_wins() {
        let config = parse_device_args("evdev_hqm0", "dev_id=1,dev_id=3").unwrap();
        assert_eq!(config.dev_id, 3);
    }
}
