pub mod aggregation_service;
pub mod resilient_subscription;
pub mod stream_subscription;

use crate::models::collection::Snapshot;

/// What a stream hands to its owner on each turn.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    /// A full replacement of the collection
    Snapshot(Snapshot),
    /// The stream is in trouble; previously delivered data stays valid
    Degraded(String),
    /// The stream could not be established at all; reported once
    Failed(String),
}
