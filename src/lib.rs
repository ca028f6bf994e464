pub mod app;
pub mod backend;
pub mod binding;
pub mod config;
pub mod driver;
pub mod logging;
pub mod panel;
pub mod params;
pub mod preset;
pub mod render;
pub mod shader;
pub mod terminal;
