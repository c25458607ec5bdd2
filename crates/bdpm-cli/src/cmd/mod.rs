pub mod build;
pub mod show_config;
