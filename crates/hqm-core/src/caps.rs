//! Capability advertisement and negotiated-resource records.
//!
//! Two records describe what a device can do:
//!
//! - [`DeviceInfo`] is the capability record advertised to the framework. A
//!   process-wide default is built from the compile-time ceilings in
//!   [`crate::limits`]; resource negotiation overrides the queue, port and
//!   credit figures with what the kernel driver actually provisioned.
//! - [`HwResourceInfo`] is the per-device record of hardware maxima saved off
//!   during negotiation and consumed later when the scheduling domain is
//!   created. Its totals are recomputed from the query result (e.g.
//!   `num_queues` counts directed ports as queues) rather than copied raw.
//!
//! [`ResourceCounts`] is the raw result of a hardware resource query.

use serde::{Deserialize, Serialize};

use crate::limits;

// =============================================================================
// Capability flags
// =============================================================================

/// Scheduling capabilities advertised by the device.
///
/// These are fixed properties of the hardware generation, set at compile time
/// and never overridden by resource negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Per-queue quality-of-service levels.
    QueueQos,
    /// Per-event quality-of-service levels.
    EventQos,
    /// Burst enqueue/dequeue.
    BurstMode,
    /// Distributed (multi-port) scheduling.
    DistributedSched,
    /// Ports may disable implicit release on dequeue.
    ImplicitReleaseDisable,
    /// A queue may carry all scheduling types concurrently.
    QueueAllTypes,
}

/// Capabilities of the hqm hardware generation this driver targets.
pub const DEFAULT_CAPABILITIES: &[Capability] = &[
    Capability::QueueQos,
    Capability::EventQos,
    Capability::BurstMode,
    Capability::DistributedSched,
    Capability::ImplicitReleaseDisable,
    Capability::QueueAllTypes,
];

// =============================================================================
// Device version
// =============================================================================

/// Device major revision this driver is built against. A device reporting a
/// different major is rejected at attach.
pub const SUPPORTED_DEVICE_MAJOR: u16 = 2;

/// Hardware revision reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceVersion {
    /// Major revision. Determines driver compatibility.
    pub major: u16,
    /// Minor revision. Informational.
    pub minor: u16,
}

impl DeviceVersion {
    /// Build a version from its parts.
    #[must_use]
    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Whether this driver can operate a device of this revision.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.major == SUPPORTED_DEVICE_MAJOR
    }

    /// Whether two revisions can share one hardware instance across
    /// processes. Minor revisions differ only in errata, so compatibility is
    /// decided on the major alone.
    #[must_use]
    pub fn is_compatible_with(&self, other: &DeviceVersion) -> bool {
        self.major == other.major
    }
}

impl std::fmt::Display for DeviceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// =============================================================================
// Consumer-queue poll mode
// =============================================================================

/// How the hardware writes consumer-queue entries for polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CqPollMode {
    /// One event per cache line.
    #[default]
    Std,
    /// Sparse mode: event interleaved with padding, required on some
    /// steppings for reliable polling.
    Sparse,
}

// =============================================================================
// Class of service
// =============================================================================

/// Hardware traffic class constraining which physical resources a port may
/// use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosDomain {
    /// Let the hardware pick.
    #[default]
    Default,
    /// Traffic class 0.
    Cos0,
    /// Traffic class 1.
    Cos1,
    /// Traffic class 2.
    Cos2,
    /// Traffic class 3.
    Cos3,
}

impl CosDomain {
    /// Devargs sentinel selecting [`CosDomain::Default`].
    pub const DEFAULT_SENTINEL: i32 = -1;

    /// Interpret the devargs integer encoding: `-1` for default, `0..=3` for
    /// an explicit class. Anything else is out of range.
    #[must_use]
    pub fn from_devarg(value: i32) -> Option<Self> {
        match value {
            Self::DEFAULT_SENTINEL => Some(CosDomain::Default),
            0 => Some(CosDomain::Cos0),
            1 => Some(CosDomain::Cos1),
            2 => Some(CosDomain::Cos2),
            3 => Some(CosDomain::Cos3),
            _ => None,
        }
    }

    /// The explicit class index, or `None` for the default selector.
    #[must_use]
    pub fn index(&self) -> Option<u8> {
        match self {
            CosDomain::Default => None,
            CosDomain::Cos0 => Some(0),
            CosDomain::Cos1 => Some(1),
            CosDomain::Cos2 => Some(2),
            CosDomain::Cos3 => Some(3),
        }
    }
}

// =============================================================================
// Advertised capability record
// =============================================================================

/// Device capability record advertised to the framework.
///
/// Immutable after negotiation: the resource negotiator overwrites
/// `max_event_queues`, `max_event_ports` and `max_num_events` with queried
/// values exactly once per device, and the framework reads the record
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Name of the driver instance that populated this record. Stamped at
    /// probe time.
    pub driver_name: String,
    /// Shortest supported dequeue timeout, nanoseconds.
    pub min_dequeue_timeout_ns: u32,
    /// Longest supported dequeue timeout, nanoseconds.
    pub max_dequeue_timeout_ns: u32,
    /// Event queues available to the application.
    pub max_event_queues: u32,
    /// Flows per event queue.
    pub max_event_queue_flows: u32,
    /// Priority levels per queue.
    pub max_event_queue_priority_levels: u8,
    /// Priority levels per event.
    pub max_event_priority_levels: u8,
    /// Event ports available to the application.
    pub max_event_ports: u32,
    /// Deepest dequeue burst per port.
    pub max_event_port_dequeue_depth: u32,
    /// Deepest enqueue burst per port.
    pub max_event_port_enqueue_depth: u32,
    /// Queue links per port.
    pub max_event_port_links: u8,
    /// In-flight event ceiling (load-balanced credit pool).
    pub max_num_events: u32,
    /// Single-link (directed) port/queue pairs.
    pub max_single_link_event_port_queue_pairs: u32,
    /// Fixed scheduling capabilities.
    pub capabilities: Vec<Capability>,
}

impl DeviceInfo {
    /// The compile-time default advertisement, before any hardware query.
    #[must_use]
    pub fn hqm_defaults() -> Self {
        Self {
            driver_name: String::new(),
            min_dequeue_timeout_ns: limits::MIN_DEQUEUE_TIMEOUT_NS,
            max_dequeue_timeout_ns: limits::MAX_DEQUEUE_TIMEOUT_NS,
            max_event_queues: limits::MAX_NUM_LDB_QUEUES,
            max_event_queue_flows: limits::MAX_NUM_FLOWS,
            max_event_queue_priority_levels: limits::QID_PRIORITIES,
            max_event_priority_levels: limits::QID_PRIORITIES,
            max_event_ports: limits::MAX_NUM_LDB_PORTS,
            max_event_port_dequeue_depth: limits::MAX_CQ_DEPTH,
            max_event_port_enqueue_depth: limits::MAX_ENQUEUE_DEPTH,
            max_event_port_links: limits::MAX_NUM_QIDS_PER_LDB_CQ,
            max_num_events: limits::MAX_NUM_LDB_CREDITS,
            max_single_link_event_port_queue_pairs: limits::MAX_NUM_DIR_PORTS,
            capabilities: DEFAULT_CAPABILITIES.to_vec(),
        }
    }
}

// =============================================================================
// Negotiated hardware maxima
// =============================================================================

/// Hardware maxima recorded per device during resource negotiation and used
/// when creating the scheduling domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HwResourceInfo {
    /// Scheduling domains provisioned for this device.
    pub num_sched_domains: u32,
    /// In-flight event ceiling (load-balanced credits).
    pub nb_events_limit: u32,
    /// Total queue slots: load-balanced queues plus directed ports.
    pub num_queues: u32,
    /// Load-balanced queues.
    pub num_ldb_queues: u32,
    /// Load-balanced ports.
    pub num_ldb_ports: u32,
    /// Directed ports.
    pub num_dir_ports: u32,
    /// Reorder window size (history-list entries).
    pub reorder_window_size: u32,
}

// =============================================================================
// Raw query result
// =============================================================================

/// Resource counts reported by the hardware/kernel-driver interface.
///
/// These are the figures actually provisioned for the device, which may be
/// below the ceilings in [`crate::limits`] depending on firmware and
/// kernel-driver version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceCounts {
    /// Scheduling domains.
    pub num_sched_domains: u32,
    /// Load-balanced queues.
    pub num_ldb_queues: u32,
    /// Load-balanced ports.
    pub num_ldb_ports: u32,
    /// Directed ports.
    pub num_dir_ports: u32,
    /// Load-balanced credits.
    pub num_ldb_credits: u32,
    /// Directed credits.
    pub num_dir_credits: u32,
    /// Reorder/history-list entries.
    pub num_hist_list_entries: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cos_from_devarg_accepts_sentinel_and_classes() {
        let cases = [
            (-1, Some(CosDomain::Default)),
            (0, Some(CosDomain::Cos0)),
            (1, Some(CosDomain::Cos1)),
            (2, Some(CosDomain::Cos2)),
            (3, Some(CosDomain::Cos3)),
            (4, None),
            (9, None),
            (-2, None),
        ];
        for (input, expected) in cases {
            assert_eq!(CosDomain::from_devarg(input), expected, "cos={input}");
        }
    }

    #[test]
    fn cos_index_is_none_for_default() {
        assert_eq!(CosDomain::Default.index(), None);
        assert_eq!(CosDomain::Cos3.index(), Some(3));
    }

    #[test]
    fn version_compatibility_is_major_only() {
        let a = DeviceVersion::new(2, 0);
        let b = DeviceVersion::new(2, 5);
        let c = DeviceVersion::new(3, 0);
        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
        assert_eq!(c.to_string(), "3.0");
    }

    #[test]
    fn default_info_matches_compile_time_limits() {
        let info = DeviceInfo::hqm_defaults();
        assert_eq!(info.max_event_queues, limits::MAX_NUM_LDB_QUEUES);
        assert_eq!(info.max_num_events, limits::MAX_NUM_LDB_CREDITS);
        assert_eq!(
            info.max_single_link_event_port_queue_pairs,
            limits::MAX_NUM_DIR_PORTS
        );
        assert_eq!(info.capabilities, DEFAULT_CAPABILITIES.to_vec());
    }

    #[test]
    fn device_info_round_trips_through_json() {
        let info = DeviceInfo::hqm_defaults();
        let json = serde_json::to_string(&info).unwrap();
        let back: DeviceInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
