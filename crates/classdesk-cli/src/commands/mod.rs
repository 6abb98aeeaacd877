//! CLI command implementations.

pub mod check;
pub mod keygen;
pub mod run;
pub mod seal;
pub mod tools;

mod render;
