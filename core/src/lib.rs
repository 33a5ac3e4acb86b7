//! titan-core: deterministic engine for Titan Industries, a quarterly
//! CEO decision game. The runner in `tools/` drives it over stdin/stdout.

pub mod autoplay;
pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod gemini;
pub mod impact;
pub mod market;
pub mod metrics;
pub mod provider;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod types;
