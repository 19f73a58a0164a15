pub mod activity;
pub mod config;
pub mod console;
pub mod telemetry;
pub mod writer;
