pub mod cli;
pub mod clip;
pub mod history;
pub mod io;
pub mod logging;
pub mod outside;
pub mod progress;
pub mod result;
pub mod sanitize;
pub mod session;
pub mod types;
