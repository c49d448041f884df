pub mod check;
pub mod output;
pub mod routes;
pub mod serve;
pub mod settings;

pub use check::{cmd_check, CheckArgs};
pub use output::OutputFormat;
pub use routes::cmd_routes;
pub use serve::{cmd_serve, ServeArgs};
pub use settings::cmd_settings;
