//! Simulated queue-manager hardware for hqm driver tests.
//!
//! [`MockQueueManager`] implements
//! [`hqm_core::iface::HardwareInterface`] without physical hardware:
//!
//! - resource counts, device version and poll mode are configurable
//! - any fallible interface call can be made to fail with a chosen status
//!   code ([`FailPoint`])
//! - every call is counted ([`CallLog`]) so lifecycle tests can assert, for
//!   example, that a secondary attach never runs `hardware_init`
//!
//! The mock is a clonable handle over shared state: keep one clone in the
//! test and box another into the device, then inspect [`calls`] afterwards.
//!
//! [`calls`]: MockQueueManager::calls
//!
//! # Example
//!
//! ```rust,ignore
//! let mock = MockQueueManager::new().fail_on(FailPoint::NumResources, -19);
//! let mut device = EventDevice::new("evdev_hqm0", Box::new(mock.clone()), DeviceData::new());
//! assert!(device.primary_attach(&DeviceConfig::default()).is_err());
//! assert_eq!(mock.calls().num_resources, 1);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use hqm_core::caps::{CqPollMode, DeviceVersion, ResourceCounts};
use hqm_core::error::HwError;
use hqm_core::iface::HardwareInterface;
use hqm_core::limits;

/// Fallible interface calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Fail the device open.
    Open,
    /// Fail the version query.
    DeviceVersion,
    /// Fail the resource-count query.
    NumResources,
    /// Fail the poll-mode query.
    CqPollMode,
    /// Fail low-level I/O setup.
    LowLevelIoInit,
}

/// Per-method invocation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallLog {
    /// `open` invocations.
    pub open: u32,
    /// `device_version` invocations.
    pub device_version: u32,
    /// `num_resources` invocations.
    pub num_resources: u32,
    /// `hardware_init` invocations.
    pub hardware_init: u32,
    /// `cq_poll_mode` invocations.
    pub cq_poll_mode: u32,
    /// `low_level_io_init` invocations.
    pub low_level_io_init: u32,
}

#[derive(Debug)]
struct MockState {
    resources: ResourceCounts,
    version: DeviceVersion,
    poll_mode: CqPollMode,
    failures: HashMap<FailPoint, i32>,
    calls: CallLog,
    opened_as: Option<String>,
}

/// Simulated queue-manager hardware.
#[derive(Debug, Clone)]
pub struct MockQueueManager {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockQueueManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueueManager {
    /// A fully-provisioned device of the supported revision.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                resources: ResourceCounts {
                    num_sched_domains: limits::MAX_NUM_SCHED_DOMAINS,
                    num_ldb_queues: limits::MAX_NUM_LDB_QUEUES,
                    num_ldb_ports: limits::MAX_NUM_LDB_PORTS,
                    num_dir_ports: limits::MAX_NUM_DIR_PORTS,
                    num_ldb_credits: limits::MAX_NUM_LDB_CREDITS,
                    num_dir_credits: limits::MAX_NUM_DIR_CREDITS,
                    num_hist_list_entries: limits::MAX_NUM_HIST_LIST_ENTRIES,
                },
                version: DeviceVersion::new(hqm_core::caps::SUPPORTED_DEVICE_MAJOR, 0),
                poll_mode: CqPollMode::Std,
                failures: HashMap::new(),
                calls: CallLog::default(),
                opened_as: None,
            })),
        }
    }

    /// Report these resource counts from `num_resources`.
    #[must_use]
    pub fn with_resources(self, resources: ResourceCounts) -> Self {
        self.state.lock().resources = resources;
        self
    }

    /// Report this revision from `device_version`.
    #[must_use]
    pub fn with_version(self, version: DeviceVersion) -> Self {
        self.state.lock().version = version;
        self
    }

    /// Report this poll mode from `cq_poll_mode`.
    #[must_use]
    pub fn with_poll_mode(self, poll_mode: CqPollMode) -> Self {
        self.state.lock().poll_mode = poll_mode;
        self
    }

    /// Make `point` fail with `code` on every invocation.
    #[must_use]
    pub fn fail_on(self, point: FailPoint, code: i32) -> Self {
        self.state.lock().failures.insert(point, code);
        self
    }

    /// Snapshot of the per-method invocation counts.
    #[must_use]
    pub fn calls(&self) -> CallLog {
        self.state.lock().calls
    }

    /// The name the device was last opened under, if any.
    #[must_use]
    pub fn opened_as(&self) -> Option<String> {
        self.state.lock().opened_as.clone()
    }

    fn check_failure(state: &MockState, point: FailPoint) -> Result<(), HwError> {
        match state.failures.get(&point) {
            Some(&code) => Err(HwError(code)),
            None => Ok(()),
        }
    }
}

impl HardwareInterface for MockQueueManager {
    fn open(&mut self, name: &str) -> Result<(), HwError> {
        let mut state = self.state.lock();
        state.calls.open += 1;
        Self::check_failure(&state, FailPoint::Open)?;
        state.opened_as = Some(name.to_string());
        Ok(())
    }

    fn device_version(&mut self) -> Result<DeviceVersion, HwError> {
        let mut state = self.state.lock();
        state.calls.device_version += 1;
        Self::check_failure(&state, FailPoint::DeviceVersion)?;
        Ok(state.version)
    }

    fn num_resources(&mut self) -> Result<ResourceCounts, HwError> {
        let mut state = self.state.lock();
        state.calls.num_resources += 1;
        Self::check_failure(&state, FailPoint::NumResources)?;
        Ok(state.resources)
    }

    fn hardware_init(&mut self) {
        self.state.lock().calls.hardware_init += 1;
    }

    fn cq_poll_mode(&mut self) -> Result<CqPollMode, HwError> {
        let mut state = self.state.lock();
        state.calls.cq_poll_mode += 1;
        Self::check_failure(&state, FailPoint::CqPollMode)?;
        Ok(state.poll_mode)
    }

    fn low_level_io_init(&mut self) -> Result<(), HwError> {
        let mut state = self.state.lock();
        state.calls.low_level_io_init += 1;
        Self::check_failure(&state, FailPoint::LowLevelIoInit)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_are_counted_across_clones() {
        let mock = MockQueueManager::new();
        let mut boxed: Box<dyn HardwareInterface> = Box::new(mock.clone());

        boxed.open("evdev_hqm0").unwrap();
        boxed.hardware_init();
        boxed.hardware_init();

        let calls = mock.calls();
        assert_eq!(calls.open, 1);
        assert_eq!(calls.hardware_init, 2);
        assert_eq!(mock.opened_as().as_deref(), Some("evdev_hqm0"));
    }

    #[test]
    fn fail_on_returns_the_configured_code() {
        let mock = MockQueueManager::new().fail_on(FailPoint::CqPollMode, -71);
        let mut boxed: Box<dyn HardwareInterface> = Box::new(mock.clone());

        boxed.open("evdev_hqm0").unwrap();
        assert_eq!(boxed.cq_poll_mode(), Err(HwError(-71)));
        // Unrelated calls still succeed.
        assert!(boxed.num_resources().is_ok());
    }

    #[test]
    fn defaults_are_the_compile_time_ceilings() {
        let mock = MockQueueManager::new();
        let mut boxed: Box<dyn HardwareInterface> = Box::new(mock);
        let counts = boxed.num_resources().unwrap();
        assert_eq!(counts.num_ldb_queues, limits::MAX_NUM_LDB_QUEUES);
        assert_eq!(counts.num_ldb_credits, limits::MAX_NUM_LDB_CREDITS);
    }
}
