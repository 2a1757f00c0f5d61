//! Configuration loading.
//!
//! The relay is configured entirely through environment variables; see
//! [`Settings::from_env`].

mod settings;

pub use settings::{
    ConfigError, Settings, DEFAULT_BASE_URL, DEFAULT_SENDER_EMAIL, DEFAULT_SENDER_NAME,
};
