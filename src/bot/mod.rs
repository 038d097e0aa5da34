pub mod commands;
pub mod handlers;
pub mod picker;
pub mod provision;
