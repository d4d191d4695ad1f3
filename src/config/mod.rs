pub mod schema;

pub use schema::{Config, NetworkConfig, PreferencesConfig, PresenterConfig, VersionsConfig};
