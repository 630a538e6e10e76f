//! Device-argument configuration.
//!
//! A device is configured through a flat `key=value` devargs string supplied
//! by the framework at probe time. This module turns that string into a
//! strongly validated [`DeviceConfig`]:
//!
//! - [`parse::parse_device_args`] tokenizes and dispatches recognized keys
//! - [`thresholds::QidDepthThresholds`] holds the per-queue depth-threshold
//!   table built from the compact range syntax
//!
//! Recognized keys (comma-separated, order-insensitive):
//!
//! | key | value |
//! |---|---|
//! | `socket_id` | NUMA node, `0..=MAX_NUMA_NODES` |
//! | `max_num_events` | `0..=MAX_NUM_LDB_CREDITS` |
//! | `num_dir_credits` | `0..=MAX_NUM_DIR_CREDITS` |
//! | `dev_id` | non-negative device id |
//! | `cos` | `-1` (default) or class `0..=3` |
//! | `qid_depth_thresh` | `all:<t>`, `<a>-<b>:<t>` or `<q>:<t>` |

use serde::{Deserialize, Serialize};

use hqm_core::caps::CosDomain;
use hqm_core::limits;

pub mod parse;
pub mod thresholds;

pub use parse::parse_device_args;
pub use thresholds::QidDepthThresholds;

/// Devarg key names, shared by the tokenizer, the validators and the
/// threshold builder's diagnostics.
pub(crate) mod keys {
    pub const SOCKET_ID: &str = "socket_id";
    pub const MAX_NUM_EVENTS: &str = "max_num_events";
    pub const NUM_DIR_CREDITS: &str = "num_dir_credits";
    pub const DEV_ID: &str = "dev_id";
    pub const QID_DEPTH_THRESH: &str = "qid_depth_thresh";
    pub const COS: &str = "cos";
}

/// Aggregated user configuration for one device.
///
/// Built with safe defaults, mutated only by the argument validators during
/// parsing, and read-only once attach begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// NUMA node for device memory.
    pub socket_id: i32,
    /// In-flight event ceiling override.
    pub max_num_events: u32,
    /// Directed-credit pool override; `None` leaves the hardware default.
    pub num_dir_credits: Option<u32>,
    /// Device id to open.
    pub dev_id: i32,
    /// Class-of-service selector for this device's ports.
    pub cos: CosDomain,
    /// Per-queue depth-threshold overrides.
    pub qid_depth_thresholds: QidDepthThresholds,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            socket_id: 0,
            max_num_events: limits::MAX_NUM_LDB_CREDITS,
            num_dir_credits: None,
            dev_id: 0,
            cos: CosDomain::Default,
            qid_depth_thresholds: QidDepthThresholds::default(),
        }
    }
}
