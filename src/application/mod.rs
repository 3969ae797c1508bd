//! Application layer orchestrating gateway calls.
//!
//! `Provider` is the entry point: it resolves shortcuts, validates plugin
//! lists, and drives the `Pipeline` whose terminal action is the dispatch
//! gate (`Provider::ignite`).

pub mod pipeline;
pub mod provider;
