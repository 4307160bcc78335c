//! Shared utilities for the spriterig CLI

pub mod table;
pub mod tree;

pub use table::*;
pub use tree::*;
