//! Compile-time hardware resource ceilings.
//!
//! These are the maxima the hqm hardware family can ever provision. The
//! actual counts available to a given device are discovered at runtime
//! through [`crate::iface::HardwareInterface::num_resources`] (firmware and
//! kernel-driver versions vary them) and reconciled against these ceilings
//! during negotiation. Validators range-check user configuration against the
//! constants here.

// =============================================================================
// Queues and ports
// =============================================================================

/// Maximum number of load-balanced queues.
pub const MAX_NUM_LDB_QUEUES: u32 = 32;

/// Maximum number of load-balanced ports.
pub const MAX_NUM_LDB_PORTS: u32 = 64;

/// Maximum number of directed (single-link) ports. Each directed port is
/// paired with its own directed queue.
pub const MAX_NUM_DIR_PORTS: u32 = 64;

/// Total addressable queue slots: load-balanced queues plus the directed
/// queues implied by directed ports. The per-queue depth-threshold table is
/// indexed `0..MAX_NUM_QUEUES`.
pub const MAX_NUM_QUEUES: usize = (MAX_NUM_LDB_QUEUES + MAX_NUM_DIR_PORTS) as usize;

/// Maximum number of flows per load-balanced queue.
pub const MAX_NUM_FLOWS: u32 = 64 * 1024;

/// Maximum queue links a single load-balanced consumer queue may carry.
pub const MAX_NUM_QIDS_PER_LDB_CQ: u8 = 8;

// =============================================================================
// Credits and scheduling state
// =============================================================================

/// Size of the load-balanced credit pool (bounds in-flight events).
pub const MAX_NUM_LDB_CREDITS: u32 = 8 * 1024;

/// Size of the directed credit pool.
pub const MAX_NUM_DIR_CREDITS: u32 = 2 * 1024;

/// Total reorder/history-list entries in the hardware window.
pub const MAX_NUM_HIST_LIST_ENTRIES: u32 = 2048;

/// Number of hardware scheduling domains.
pub const MAX_NUM_SCHED_DOMAINS: u32 = 32;

/// Distinct queue/event priority levels.
pub const QID_PRIORITIES: u8 = 8;

/// Upper bound for a per-queue depth threshold override.
pub const MAX_QUEUE_DEPTH_THRESHOLD: u32 = 8191;

// =============================================================================
// Port depths and timeouts
// =============================================================================

/// Deepest supported consumer queue.
pub const MAX_CQ_DEPTH: u32 = 1024;

/// Deepest supported enqueue burst.
pub const MAX_ENQUEUE_DEPTH: u32 = 64;

/// Shortest supported dequeue timeout, in nanoseconds.
pub const MIN_DEQUEUE_TIMEOUT_NS: u32 = 1;

/// Longest supported dequeue timeout, in nanoseconds.
pub const MAX_DEQUEUE_TIMEOUT_NS: u32 = u32::MAX;

// =============================================================================
// Host topology
// =============================================================================

/// Highest NUMA node id the platform supports.
pub const MAX_NUMA_NODES: i32 = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_table_covers_ldb_and_dir() {
        assert_eq!(
            MAX_NUM_QUEUES,
            (MAX_NUM_LDB_QUEUES + MAX_NUM_DIR_PORTS) as usize
        );
    }

    #[test]
    fn threshold_bound_is_below_credit_pool() {
        // A queue can never hold more events than the credit pool admits.
        assert!(MAX_QUEUE_DEPTH_THRESHOLD < MAX_NUM_LDB_CREDITS);
    }
}
