//! Campus gate library
//!
//! Wires the route gate, action guards and session store into one
//! application context and exposes the demo HTTP router for integration
//! testing.

pub mod app_context;
pub mod errors;
pub mod server;

pub use app_context::{AppContext, SessionSeed};
pub use errors::AppError;
