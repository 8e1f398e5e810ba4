pub mod commands;
pub mod libs;
