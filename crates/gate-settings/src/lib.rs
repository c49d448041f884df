pub mod apply;
pub mod defaults;
pub mod errors;
pub mod loader;
pub mod model;

pub use defaults::default_settings;
pub use errors::SettingsError;
pub use loader::{load_settings, load_settings_with_options, LoadOptions};
pub use model::{
    GateSettings, RedirectSettings, RouteSettings, ServerSettings, SessionSettings,
    SettingProvenance, SettingSource,
};

#[cfg(test)]
mod tests;
