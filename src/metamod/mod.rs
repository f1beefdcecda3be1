//! Metamod ABI: FFI layouts, the exported entry points and the engine
//! adapter.

pub mod exports;
pub mod host;
pub mod types;
