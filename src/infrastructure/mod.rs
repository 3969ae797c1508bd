//! Adapters behind the domain ports: transports, event sinks, the registry,
//! and the concrete gateways.

pub mod http;
pub mod in_memory;
pub mod jsb;
pub mod registry;
