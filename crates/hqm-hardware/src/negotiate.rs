//! Resource discovery and capability negotiation.
//!
//! Firmware and kernel-driver versions vary the resource counts a device
//! actually gets, so the advertised capability record cannot be fixed at
//! compile time. [`query_resources`] asks the hardware interface what was
//! provisioned, folds the answer into the process-wide default advertisement,
//! and saves the per-device maxima used later when the scheduling domain is
//! created.
//!
//! The default advertisement is process-wide state. It is mutated only here,
//! behind a write lock, under single-writer discipline: concurrent
//! negotiation for multiple devices in one process serializes on the lock, so
//! no update is lost. Everyone else reads it through
//! [`device_info_defaults`].

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, error};

use hqm_core::caps::DeviceInfo;
use hqm_core::error::HqmError;

use crate::device::EventDevice;

static DEFAULT_DEVICE_INFO: Lazy<RwLock<DeviceInfo>> =
    Lazy::new(|| RwLock::new(DeviceInfo::hqm_defaults()));

/// Snapshot of the process-wide default capability advertisement.
///
/// Before any negotiation this is the compile-time record from
/// [`DeviceInfo::hqm_defaults`]; afterwards the queue, port and event-credit
/// figures reflect the most recent hardware query.
#[must_use]
pub fn device_info_defaults() -> DeviceInfo {
    DEFAULT_DEVICE_INFO.read().clone()
}

/// Stamp the probing driver's name into the default advertisement.
pub(crate) fn stamp_driver_name(name: &str) {
    let mut defaults = DEFAULT_DEVICE_INFO.write();
    if defaults.driver_name != name {
        defaults.driver_name = name.to_string();
    }
}

/// Query provisioned resource counts and negotiate capabilities.
///
/// On success the process-wide default advertisement carries the queried
/// queue/port/credit figures and `device.qm_instance.info` holds the maxima
/// for scheduling-domain creation, with recomputed totals (total queues =
/// load-balanced queues + directed ports; reorder window = history-list
/// entries). Idempotent for unchanged hardware state.
///
/// A failed interface call surfaces as [`HqmError::HardwareQuery`] with the
/// underlying status code unchanged.
pub fn query_resources(device: &mut EventDevice) -> Result<(), HqmError> {
    let counts = match device.qm_instance.iface.num_resources() {
        Ok(counts) => counts,
        Err(err) => {
            error!(
                device = device.name(),
                code = err.0,
                "resource query failed"
            );
            return Err(err.into());
        }
    };
    debug!(device = device.name(), ?counts, "provisioned resources");

    {
        let mut defaults = DEFAULT_DEVICE_INFO.write();
        defaults.max_event_queues = counts.num_ldb_queues;
        defaults.max_event_ports = counts.num_ldb_ports;
        defaults.max_num_events = counts.num_ldb_credits;
    }

    // Save off the values used when creating the scheduling domain.
    let _resources = device.qm_instance.resource_lock.lock();
    let info = &mut device.qm_instance.info;
    info.num_sched_domains = counts.num_sched_domains;
    info.nb_events_limit = counts.num_ldb_credits;
    info.num_queues = counts.num_ldb_queues + counts.num_dir_ports;
    info.num_ldb_queues = counts.num_ldb_queues;
    info.num_ldb_ports = counts.num_ldb_ports;
    info.num_dir_ports = counts.num_dir_ports;
    info.reorder_window_size = counts.num_hist_list_entries;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceData;
    use hqm_core::caps::ResourceCounts;
    use hqm_core::limits;
    use hqm_driver_mock::{FailPoint, MockQueueManager};
    use serial_test::serial;

    fn provisioned() -> ResourceCounts {
        ResourceCounts {
            num_sched_domains: 4,
            num_ldb_queues: 17,
            num_ldb_ports: 33,
            num_dir_ports: 9,
            num_ldb_credits: 4000,
            num_dir_credits: 1000,
            num_hist_list_entries: 1500,
        }
    }

    #[test]
    #[serial]
    fn negotiation_overrides_process_defaults() {
        let mock = MockQueueManager::new().with_resources(provisioned());
        let mut device = EventDevice::new("evdev_hqm0", Box::new(mock), DeviceData::new());

        query_resources(&mut device).unwrap();

        let defaults = device_info_defaults();
        assert_eq!(defaults.max_event_queues, 17);
        assert_eq!(defaults.max_event_ports, 33);
        assert_eq!(defaults.max_num_events, 4000);
        // The rest of the advertisement keeps its compile-time values.
        assert_eq!(defaults.max_event_queue_flows, limits::MAX_NUM_FLOWS);
    }

    #[test]
    #[serial]
    fn handle_info_uses_recomputed_totals() {
        let mock = MockQueueManager::new().with_resources(provisioned());
        let mut device = EventDevice::new("evdev_hqm0", Box::new(mock), DeviceData::new());

        query_resources(&mut device).unwrap();

        let info = device.qm_instance.info;
        assert_eq!(info.num_sched_domains, 4);
        assert_eq!(info.nb_events_limit, 4000);
        assert_eq!(info.num_queues, 17 + 9);
        assert_eq!(info.num_ldb_queues, 17);
        assert_eq!(info.num_ldb_ports, 33);
        assert_eq!(info.num_dir_ports, 9);
        assert_eq!(info.reorder_window_size, 1500);
    }

    #[test]
    #[serial]
    fn negotiation_is_idempotent() {
        let mock = MockQueueManager::new().with_resources(provisioned());
        let mut device = EventDevice::new("evdev_hqm0", Box::new(mock), DeviceData::new());

        query_resources(&mut device).unwrap();
        let first_info = device.qm_instance.info;
        let first_defaults = device_info_defaults();

        query_resources(&mut device).unwrap();
        assert_eq!(device.qm_instance.info, first_info);
        assert_eq!(device_info_defaults(), first_defaults);
    }

    #[test]
    #[serial]
    fn query_failure_propagates_code_and_leaves_info_untouched() {
        let mock = MockQueueManager::new().fail_on(FailPoint::NumResources, -19);
        let mut device = EventDevice::new("evdev_hqm0", Box::new(mock), DeviceData::new());

        let err = query_resources(&mut device).unwrap_err();
        assert_eq!(err, HqmError::HardwareQuery { code: -19 });
        assert_eq!(err.status(), -19);
        assert_eq!(device.qm_instance.info, Default::default());
    }
}
