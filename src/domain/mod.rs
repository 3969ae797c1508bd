//! Domain types and the ports the application layer depends on.

pub mod envelope;
pub mod event;
pub mod plugin;
pub mod ports;
pub mod radar;
pub mod shortcut;
