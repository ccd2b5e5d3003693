//! Diamond dependency conflict resolution: iterative accept/reject passes
//! over a candidate tree, AND/OR satisfiability checks of proposed
//! solutions, and projection of metadata into per-id candidate lists.

pub mod conflict;
pub mod evaluate;
pub mod graph;
pub mod operations;
pub mod participants;
pub mod search;
pub mod tracker;

pub use evaluate::{satisfy, Solution};
pub use graph::{Disposition, GraphItem, GraphNode};
pub use operations::{try_resolve_conflicts, Resolution, Resolver};
pub use participants::{get_participants, Participants};
