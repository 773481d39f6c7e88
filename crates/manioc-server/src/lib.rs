//! Manioc server - configuration, logging and the command line front end
//! over the config transfer engine

pub mod command; // Command line front end
pub mod model; // Configuration, shared state and result payloads
pub mod startup; // Logging bootstrap

pub use model::{AppState, Configuration};
