//! GapFinder: cross-venue price gap scanner.
//!
//! Simulates discovery of a price gap between a reference venue and a
//! synthetic comparison venue for one trading pair, behind a timed scan and
//! an advisory daily cooldown.
//!
//! ## Architecture
//!
//! ```text
//! QuoteFeed (Bybit) -> gap math -> ScanSession --> RateLimitGate
//!                                     |    |
//!                              ResultCache +--> CyclingDisplay
//!                                     |
//!                              Store (SQLite) <- hydrate on startup
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gap;
pub mod gate;
pub mod server;
pub mod session;
pub mod source;
pub mod storage;
pub mod ticker;
pub mod types;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod types_tests;
