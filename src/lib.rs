pub mod bank;
pub mod cli;
pub mod compare;
pub mod config;
pub mod execution;
pub mod extract;
pub mod logging;
pub mod printer;
pub mod report;
pub mod verify;
