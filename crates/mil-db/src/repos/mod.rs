//! Repository modules — one per entity, all implemented as `impl MilService`.

pub mod decision;
pub mod decision_link;
pub mod log;
pub mod milestone;
pub mod override_graph;
pub mod override_request;
pub mod project;
pub mod snapshot;
