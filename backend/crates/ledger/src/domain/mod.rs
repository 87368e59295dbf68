//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Block, CertificatePayload, Chain)
//! - Domain value objects (Difficulty, ChainTip)
//! - Domain services (block hashing, mining, validation)
//! - Repository traits (interfaces)

pub mod entities;
pub mod miner;
pub mod repository;
pub mod services;
pub mod validator;
pub mod value_objects;
