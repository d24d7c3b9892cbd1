//! ECM Metrics - counters for view cache bookkeeping
//!
//! Provides named counters that completely vanish when the `metrics`
//! feature is disabled.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable counter collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use ecm_metrics::Counter;
//!
//! let mut counter = Counter::new();
//! counter.increment("views_created", 1);
//! println!("views: {}", counter.get("views_created"));
//! ```

#[cfg(feature = "metrics")]
mod counter;

#[cfg(feature = "metrics")]
pub use counter::Counter;

// ============================================================================
// No-op stub when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &'static str, _value: usize) {}
    pub fn get(&self, _name: &str) -> usize { 0 }
    pub fn reset_all(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ { std::iter::empty() }
}
