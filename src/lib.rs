pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

pub use application::provider::Provider;
pub use domain::envelope::{Destination, Envelope, Params, Payload};
pub use domain::plugin::{Next, Plugin, PluginEntry};
pub use error::{PayError, Result};
