//! Runtime configuration.
//!
//! A small `Copy` struct held per thread, read with [`config`] and changed with
//! the setters below. Everything in the runtime is single-threaded, so the
//! configuration is too.

use std::cell::Cell;

// =============================================================================
// Policies
// =============================================================================

/// What happens when a subscriber panics during [`Event::fire`](crate::Event::fire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Catch the panic, report it as a [`Fault`](crate::Fault) and keep
    /// notifying the remaining subscribers.
    #[default]
    Isolate,
    /// Resume unwinding out of `fire`. Later subscribers of the same fire are
    /// skipped.
    Propagate,
}

/// How a signal-bound component treats fires that land between its first draw
/// and its mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountGap {
    /// Compare the signal version at mount with the one seen at construction
    /// and re-render with the latest value if they differ.
    #[default]
    CatchUp,
    /// Ignore fires that happened before the subscription was installed.
    Drop,
}

// =============================================================================
// Runtime Config
// =============================================================================

/// Per-thread runtime settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub fault_policy: FaultPolicy,
    pub mount_gap: MountGap,
    /// Upper bound on re-render passes in a single host flush.
    pub max_flush_passes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fault_policy: FaultPolicy::default(),
            mount_gap: MountGap::default(),
            max_flush_passes: 64,
        }
    }
}

thread_local! {
    static CONFIG: Cell<RuntimeConfig> = Cell::new(RuntimeConfig::default());
}

/// Get the current configuration.
pub fn config() -> RuntimeConfig {
    CONFIG.with(|c| c.get())
}

/// Replace the whole configuration.
pub fn set_config(config: RuntimeConfig) {
    CONFIG.with(|c| c.set(config));
}

/// Set the fault policy.
pub fn set_fault_policy(policy: FaultPolicy) {
    CONFIG.with(|c| {
        let mut config = c.get();
        config.fault_policy = policy;
        c.set(config);
    });
}

/// Set the mount gap policy.
pub fn set_mount_gap(policy: MountGap) {
    CONFIG.with(|c| {
        let mut config = c.get();
        config.mount_gap = policy;
        c.set(config);
    });
}

/// Restore the defaults.
pub fn reset_config() {
    set_config(RuntimeConfig::default());
}

// =============================================================================
// Tests
// =============================================================================
