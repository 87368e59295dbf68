//! Infrastructure Layer - Storage implementations

pub mod kv_chain_store;
pub mod memory;
pub mod postgres;
