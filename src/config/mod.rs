//! Configuration for the `spriteswap` command-line tool
//!
//! Provides types and discovery for the optional `spriteswap.toml` file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
