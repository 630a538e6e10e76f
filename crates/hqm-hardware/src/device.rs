//! Device handle and per-device state.
//!
//! [`EventDevice`] is the driver's view of one hardware scheduling-domain
//! instance: the queue-manager handle ([`QmHandle`]), per-queue state, the
//! user overrides recorded at attach, and the attach state machine. The
//! framework owns the device object's lifecycle; the data plane borrows it
//! read-mostly once attach reports ready.
//!
//! [`DeviceData`] stands in for the framework's shared per-device data
//! segment. Every process attaching to the same physical device holds the
//! same instance; the primary records the hardware revision there and
//! secondaries check compatibility against it.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use hqm_core::caps::{CosDomain, CqPollMode, DeviceVersion, HwResourceInfo};
use hqm_core::iface::HardwareInterface;
use hqm_core::limits::{MAX_NUM_LDB_CREDITS, MAX_NUM_QUEUES};

use crate::config::QidDepthThresholds;

/// Attach progress for one device instance.
///
/// Transitions are strictly forward; a failed attach leaves the device at
/// whatever state it reached (no rollback) and the caller is expected to
/// release the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    /// No hardware contact yet.
    Unopened,
    /// Kernel-driver device opened.
    Opened,
    /// Resource counts queried and negotiated.
    ResourcesQueried,
    /// Low-level I/O established; device usable by the data plane.
    Ready,
}

/// Per-queue driver state. Only the scheduling-pressure threshold matters to
/// the initialization layer; the data plane extends this elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventQueue {
    /// Depth threshold override, 0 = hardware default.
    pub depth_threshold: u32,
}

/// Shared per-device data segment.
///
/// One instance per physical device, shared by every attaching process.
#[derive(Debug, Default)]
pub struct DeviceData {
    revision: RwLock<Option<DeviceVersion>>,
}

impl DeviceData {
    /// Fresh segment for a device no process has attached yet.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record the hardware revision. Primary-attach only.
    pub(crate) fn record_revision(&self, version: DeviceVersion) {
        *self.revision.write() = Some(version);
    }

    /// The revision the primary recorded, if any process has attached.
    #[must_use]
    pub fn revision(&self) -> Option<DeviceVersion> {
        *self.revision.read()
    }
}

/// Handle to one queue-manager hardware instance.
pub struct QmHandle {
    /// Device id this handle addresses.
    pub device_id: i32,
    /// Class-of-service selector for ports created on this handle.
    pub cos_id: CosDomain,
    /// Hardware revision, recorded once the device is opened.
    pub revision: Option<DeviceVersion>,
    /// Negotiated hardware maxima, used when creating the scheduling domain.
    pub info: HwResourceInfo,
    pub(crate) iface: Box<dyn HardwareInterface>,
    pub(crate) resource_lock: Mutex<()>,
}

impl QmHandle {
    fn new(iface: Box<dyn HardwareInterface>) -> Self {
        Self {
            device_id: 0,
            cos_id: CosDomain::Default,
            revision: None,
            info: HwResourceInfo::default(),
            iface,
            resource_lock: Mutex::new(()),
        }
    }

    /// Take the hardware-resource lock.
    ///
    /// Guards hardware-resource state shared between processes; every
    /// operation mutating that state holds this for its duration.
    pub fn lock_resources(&self) -> MutexGuard<'_, ()> {
        self.resource_lock.lock()
    }
}

impl std::fmt::Debug for QmHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QmHandle")
            .field("device_id", &self.device_id)
            .field("cos_id", &self.cos_id)
            .field("revision", &self.revision)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// One hardware scheduling-domain instance, as seen by the driver.
#[derive(Debug)]
pub struct EventDevice {
    name: String,
    /// Queue-manager hardware handle.
    pub qm_instance: QmHandle,
    /// Per-queue driver state, indexed by queue id.
    pub ev_queues: Vec<EventQueue>,
    /// Consumer-queue poll mode, queried during primary attach.
    pub poll_mode: CqPollMode,
    /// NUMA node for device memory, from configuration.
    pub socket_id: i32,
    /// User override of the in-flight event ceiling.
    pub max_num_events_override: u32,
    /// User override of the directed-credit pool, if supplied.
    pub num_dir_credits_override: Option<u32>,
    state: AttachState,
    data: Arc<DeviceData>,
}

impl EventDevice {
    /// Create an unattached device over the given hardware interface.
    ///
    /// `data` is the shared per-device segment; a secondary process passes
    /// the same segment the primary used.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        iface: Box<dyn HardwareInterface>,
        data: Arc<DeviceData>,
    ) -> Self {
        Self {
            name: name.into(),
            qm_instance: QmHandle::new(iface),
            ev_queues: vec![EventQueue::default(); MAX_NUM_QUEUES],
            poll_mode: CqPollMode::default(),
            socket_id: 0,
            max_num_events_override: MAX_NUM_LDB_CREDITS,
            num_dir_credits_override: None,
            state: AttachState::Unopened,
            data,
        }
    }

    /// Device name, as given to the kernel driver on open.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current attach state.
    #[must_use]
    pub fn state(&self) -> AttachState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: AttachState) {
        self.state = state;
    }

    /// The shared per-device data segment.
    #[must_use]
    pub fn shared_data(&self) -> &Arc<DeviceData> {
        &self.data
    }

    /// Install the parsed depth-threshold overrides into per-queue state.
    /// Zero entries keep the hardware default.
    pub(crate) fn init_queue_depth_thresholds(&mut self, thresholds: &QidDepthThresholds) {
        for (qid, thresh) in thresholds.overrides() {
            self.ev_queues[qid].depth_threshold = thresh;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hqm_driver_mock::MockQueueManager;

    #[test]
    fn new_device_starts_unopened_with_default_queues() {
        let mock = MockQueueManager::new();
        let device = EventDevice::new("evdev_hqm0", Box::new(mock), DeviceData::new());
        assert_eq!(device.state(), AttachState::Unopened);
        assert_eq!(device.ev_queues.len(), MAX_NUM_QUEUES);
        assert!(device.ev_queues.iter().all(|q| q.depth_threshold == 0));
        assert_eq!(device.qm_instance.revision, None);
    }

    #[test]
    fn threshold_installation_touches_only_overridden_queues() {
        let mock = MockQueueManager::new();
        let mut device = EventDevice::new("evdev_hqm0", Box::new(mock), DeviceData::new());

        let mut thresholds = QidDepthThresholds::default();
        thresholds.apply_spec("3-4:77").unwrap();
        device.init_queue_depth_thresholds(&thresholds);

        for (qid, queue) in device.ev_queues.iter().enumerate() {
            let expected = if qid == 3 || qid == 4 { 77 } else { 0 };
            assert_eq!(queue.depth_threshold, expected, "queue {qid}");
        }
    }

    #[test]
    fn shared_data_revision_round_trip() {
        let data = DeviceData::new();
        assert_eq!(data.revision(), None);
        data.record_revision(DeviceVersion::new(2, 1));
        assert_eq!(data.revision(), Some(DeviceVersion::new(2, 1)));
    }
}
