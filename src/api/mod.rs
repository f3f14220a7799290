pub mod client;
pub mod endpoints;
pub mod error;

/// Source tag carried in taxonomy errors, retry logs, and user notifications.
pub const SOURCE_NAME: &str = "FloodWatch";
