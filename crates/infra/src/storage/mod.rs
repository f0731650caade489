//! Durable storage adapters

mod file_snapshot;

pub use file_snapshot::FileSnapshotStore;
