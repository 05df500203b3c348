//! Autonomous decision engine for a single Uniswap V3 trading pair.
//!
//! Pipeline: resilient RPC data source → rolling price history → indicator
//! computation → weighted signal vote → risk validation + emergency-stop
//! gate → trade executor. Signing, broadcast, and persistence live outside
//! this crate behind the seams in [`core::data_source`] and
//! [`execution::trader`].

pub mod config;
pub mod constants;
pub mod core;
pub mod errors;
pub mod events;
pub mod execution;
pub mod logging;
pub mod rpc;
pub mod types;
