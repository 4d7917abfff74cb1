pub mod config;
pub mod serve;

// Re-export command functions for convenience
pub use config::show_config;
pub use serve::{serve, ServeParams};
