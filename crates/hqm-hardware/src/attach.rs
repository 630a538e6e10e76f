//! Primary/secondary process attach protocol.
//!
//! Multiple OS processes may share one hardware instance. The first
//! (primary) process performs the full bring-up: open, version check,
//! resource negotiation, hardware-state initialization, poll-mode query,
//! low-level I/O setup and threshold installation. Later (secondary)
//! processes perform a reduced attach against the already-initialized
//! instance: open, version compatibility check against the revision the
//! primary recorded, resource query and low-level I/O setup.
//!
//! Both paths walk the [`AttachState`] machine
//! `Unopened → Opened → ResourcesQueried → Ready`. A failure at any
//! transition is terminal for the attempt: the device is left at the state
//! it reached, nothing is rolled back, and the caller abandons the handle.

use tracing::{error, info};

use hqm_core::caps::SUPPORTED_DEVICE_MAJOR;
use hqm_core::error::HqmError;

use crate::config::DeviceConfig;
use crate::device::{AttachState, EventDevice};
use crate::negotiate;

impl EventDevice {
    /// Full primary-process attach.
    ///
    /// `config` must come from [`crate::config::parse_device_args`] (or be
    /// the defaults); it is read-only from here on.
    pub fn primary_attach(&mut self, config: &DeviceConfig) -> Result<(), HqmError> {
        let name = self.name().to_owned();

        self.socket_id = config.socket_id;
        self.max_num_events_override = config.max_num_events;
        self.num_dir_credits_override = config.num_dir_credits;
        self.qm_instance.cos_id = config.cos;
        self.qm_instance.device_id = config.dev_id;

        negotiate::stamp_driver_name(&name);

        if let Err(err) = self.qm_instance.iface.open(&name) {
            error!(device = %name, code = err.0, "could not open event hardware device");
            return Err(err.into());
        }
        self.set_state(AttachState::Opened);

        let version = match self.qm_instance.iface.device_version() {
            Ok(version) => version,
            Err(err) => {
                error!(device = %name, code = err.0, "failed to get the device version");
                return Err(err.into());
            }
        };
        if !version.is_supported() {
            error!(device = %name, %version, "unsupported device version");
            return Err(HqmError::VersionMismatch {
                expected: format!("{SUPPORTED_DEVICE_MAJOR}.x"),
                found: version.to_string(),
            });
        }
        self.qm_instance.revision = Some(version);
        self.shared_data().record_revision(version);

        negotiate::query_resources(self)?;
        self.set_state(AttachState::ResourcesQueried);

        // Clear and arm the scheduling structures. Once per physical device;
        // secondaries rely on this having happened.
        self.qm_instance.iface.hardware_init();

        self.poll_mode = match self.qm_instance.iface.cq_poll_mode() {
            Ok(mode) => mode,
            Err(err) => {
                error!(device = %name, code = err.0, "failed to get the poll mode");
                return Err(err.into());
            }
        };

        if let Err(err) = self.qm_instance.iface.low_level_io_init() {
            error!(device = %name, code = err.0, "low-level I/O setup failed");
            return Err(err.into());
        }

        self.init_queue_depth_thresholds(&config.qid_depth_thresholds);

        self.set_state(AttachState::Ready);
        info!(device = %name, %version, "primary attach complete");
        Ok(())
    }

    /// Reduced secondary-process attach against an initialized instance.
    pub fn secondary_attach(&mut self) -> Result<(), HqmError> {
        let name = self.name().to_owned();

        negotiate::stamp_driver_name(&name);

        if let Err(err) = self.qm_instance.iface.open(&name) {
            error!(device = %name, code = err.0, "could not open event hardware device");
            return Err(err.into());
        }
        self.set_state(AttachState::Opened);

        let version = match self.qm_instance.iface.device_version() {
            Ok(version) => version,
            Err(err) => {
                error!(device = %name, code = err.0, "failed to get the device version");
                return Err(err.into());
            }
        };
        let Some(primary) = self.shared_data().revision() else {
            error!(device = %name, "secondary attach without an initialized primary");
            return Err(HqmError::VersionMismatch {
                expected: "a primary-initialized device".to_string(),
                found: version.to_string(),
            });
        };
        if !primary.is_compatible_with(&version) {
            error!(
                device = %name,
                primary = %primary,
                %version,
                "device version does not match the primary process"
            );
            return Err(HqmError::VersionMismatch {
                expected: primary.to_string(),
                found: version.to_string(),
            });
        }
        self.qm_instance.revision = Some(version);

        negotiate::query_resources(self)?;
        self.set_state(AttachState::ResourcesQueried);

        if let Err(err) = self.qm_instance.iface.low_level_io_init() {
            error!(device = %name, code = err.0, "low-level I/O setup failed");
            return Err(err.into());
        }

        self.set_state(AttachState::Ready);
        info!(device = %name, %version, "secondary attach complete");
        Ok(())
    }
}
