mod app;
mod cli;
mod config;

pub use app::run_app;
