//! Unit-versus-unit combat comparison: a fixed-tick battle simulator, a
//! closed-form duel estimate, and the CLI/HTTP surfaces that expose them.

pub mod cli;
pub mod combat;
pub mod data;
pub mod parallel;
pub mod server;
pub mod settings;
