//! `hqm-hardware`
//!
//! Initialization and configuration-negotiation layer for the hqm event
//! device. This crate takes a device from a devargs string to a ready,
//! capability-negotiated handle:
//!
//! ```text
//! devargs string
//!      │  config::parse_device_args (validators, threshold builder)
//!      ▼
//! config::DeviceConfig
//!      │  EventDevice::primary_attach / secondary_attach
//!      ▼
//! negotiate::query_resources ──► process-wide default DeviceInfo
//!      │                          + per-device HwResourceInfo
//!      ▼
//! device::EventDevice (AttachState::Ready)
//! ```
//!
//! The data-plane fast path consumes the ready device elsewhere; the
//! hardware transport is abstracted behind
//! [`hqm_core::iface::HardwareInterface`].

pub mod attach;
pub mod config;
pub mod device;
pub mod negotiate;

pub use config::{parse_device_args, DeviceConfig, QidDepthThresholds};
pub use device::{AttachState, DeviceData, EventDevice, EventQueue, QmHandle};
pub use negotiate::{device_info_defaults, query_resources};
