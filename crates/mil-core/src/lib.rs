//! # mil-core
//!
//! Core types shared across all Milstone crates:
//! - Entity structs for all domain objects (projects, milestones, decisions, ...)
//! - Status enums with state machine transitions
//! - The `AuthorityLevel` newtype and the `AuthorityPolicy` provider interface
//! - HTTP/CLI response types

pub mod authority;
pub mod entities;
pub mod enums;
pub mod responses;
