//! Settings loading for the dynamic buffer.
//!
//! Reads `settings.{ron,toml,json}`, validates it and resolves it into a
//! [`BufferConfig`](warpbuffer_power::BufferConfig).

pub mod loader;
pub mod schema;

pub use loader::{
    Format, SettingsError, find_settings_file, load_settings, load_settings_dir, parse_settings,
    resolve,
};
pub use schema::SettingsData;
