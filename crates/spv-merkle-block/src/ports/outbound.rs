//! # Outbound Ports
//!
//! Dependencies the validator needs from its environment.

/// Wall clock, abstracted so validation can run against a fixed time.
pub trait TimeSource: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> u64;
}
