//! The hardware resource interface.
//!
//! [`HardwareInterface`] is the narrow contract between the driver's
//! initialization layer and the underlying hardware/kernel-driver transport
//! (ioctl command set, register maps, mmap'd producer ports). The transport
//! is opaque to this crate; production backends wrap the kernel driver, and
//! `hqm-driver-mock` provides a simulated one for tests.
//!
//! All calls are synchronous and may take bounded but non-trivial time; none
//! of them should be invoked from a cancellation-sensitive context. Failures
//! carry the transport's raw status code ([`HwError`]) so callers can
//! propagate it unchanged.

use crate::caps::{CqPollMode, DeviceVersion, ResourceCounts};
use crate::error::HwError;

/// Contract to the underlying hardware/kernel-driver transport.
pub trait HardwareInterface: Send + Sync {
    /// Open the named device through the kernel driver.
    fn open(&mut self, name: &str) -> Result<(), HwError>;

    /// Query the hardware revision.
    fn device_version(&mut self) -> Result<DeviceVersion, HwError>;

    /// Query the resource counts provisioned for this device.
    fn num_resources(&mut self) -> Result<ResourceCounts, HwError>;

    /// Clear and arm the hardware's internal scheduling structures.
    ///
    /// Performed once per physical device, by the primary process only;
    /// secondary attaches assume it already happened.
    fn hardware_init(&mut self);

    /// Query which consumer-queue poll mode the device requires.
    fn cq_poll_mode(&mut self) -> Result<CqPollMode, HwError>;

    /// Set up the low-level I/O channel (producer-port mapping). Final step
    /// before a device becomes ready, on both attach paths.
    fn low_level_io_init(&mut self) -> Result<(), HwError>;
}
