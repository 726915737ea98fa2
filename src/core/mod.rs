pub mod aggregate;
pub mod billing;
pub mod config;
pub mod formatter;
pub mod logging;
pub mod models;
pub mod report;
pub mod webhook;
pub mod window;
