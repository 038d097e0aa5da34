//! # Flyver Reservation Bot
//!
//! A Discord bot that books one-hour Flyver flight slots through interactive menus.
//!
//! ## Features
//! - Day-then-hour slot picker with taken-slot markers
//! - Private reservation channel and category per confirmed slot
//! - Cancel button bound to the reservation owner
//! - Automatic archival of reservations after 24 hours
//! - In-memory reservation book (nothing survives a restart)

/// Command parsing, gateway handlers and the interactive picker
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Background services: the archival sweep and the health endpoint
pub mod services;
/// In-memory reservation state
pub mod store;
/// Utility functions for slot labels and channel naming
pub mod utils;
