//! Marker traits separating commands (state-changing) from queries (read-only).
//!
//! Every request type registered with the mediator tags itself with one of
//! these so the dispatch surface documents which operations mutate job state.

/// Marker for requests that mutate jobs, uploads, or entity records.
pub trait Command {}

/// Marker for side-effect-free requests.
pub trait Query {}
