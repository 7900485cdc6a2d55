pub mod assembly;
pub mod config;
pub mod logging;
pub mod progression;
pub mod runner;
