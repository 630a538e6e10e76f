//! `hqm-core`
//!
//! Core type definitions for the hqm event-device driver.
//!
//! The hqm ("hardware queue manager") is a hardware event scheduling and
//! load-balancing engine exposed to an event-processing framework as a
//! virtual device. This crate provides the building blocks shared by the
//! driver's initialization layer and its hardware backends:
//!
//! - [`error::HqmError`]: the driver's closed error taxonomy, with a mapping
//!   to the framework's signed-integer status convention
//! - [`limits`]: compile-time hardware resource ceilings
//! - [`caps`]: capability advertisement and negotiated-resource records
//! - [`iface::HardwareInterface`]: the narrow contract to the underlying
//!   hardware/kernel-driver transport
//!
//! The event fast path (enqueue/dequeue, port scheduling, flow hashing) and
//! the ioctl wire format live behind [`iface::HardwareInterface`] and are out
//! of scope here.

pub mod caps;
pub mod error;
pub mod iface;
pub mod limits;

pub use caps::{
    Capability, CosDomain, CqPollMode, DeviceInfo, DeviceVersion, HwResourceInfo, ResourceCounts,
};
pub use error::{HqmError, HwError};
pub use iface::HardwareInterface;
