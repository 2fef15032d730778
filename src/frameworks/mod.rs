// Frameworks layer: configuration loading and the terminal shell.

pub mod config;
pub mod shell;
