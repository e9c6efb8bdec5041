pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod generator;
pub mod json;
pub mod provider;
pub mod recipient;
pub mod recorder;
pub mod sanitizer;
pub mod translator;
