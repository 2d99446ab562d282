//! Relay Metrics - Lightweight counters for substrate diagnostics
//!
//! Provides zero-cost abstractions for metrics collection that completely
//! vanish in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use relay_metrics::Counter;
//!
//! let counter = Counter::new();
//! counter.increment("lookups", 1);
//! assert_eq!(counter.get("lookups"), 1);
//! ```
//!
//! Counters take `&self` so they can live inside shared tables. In
//! production builds (without `metrics` feature), all instrumentation is
//! compiled out to zero overhead.

#[cfg(feature = "metrics")]
mod counter;

#[cfg(feature = "metrics")]
pub use counter::Counter;

/// Whether this build records metrics.
pub const ENABLED: bool = cfg!(feature = "metrics");

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Execute code only when metrics are enabled
#[macro_export]
macro_rules! metrics {
    ($($tt:tt)*) => {
        #[cfg(feature = "metrics")]
        {
            $($tt)*
        }
    };
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&self, _name: &str, _value: usize) {}
    pub fn get(&self, _name: &str) -> usize { 0 }
    pub fn total(&self) -> usize { 0 }
    pub fn reset(&self, _name: &str) {}
    pub fn reset_all(&self) {}
}
