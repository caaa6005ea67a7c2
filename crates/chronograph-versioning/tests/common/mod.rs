//! Shared setup for the versioning integration tests.

#![allow(dead_code)]

use chronograph_common::types::{NodeId, Value, Version};
use chronograph_engine::{Config, GraphDB, Session};
use chronograph_versioning::{PropertyContainer, VersionContext, VersioningHandler};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Routes `tracing` output through the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A fresh database with versioning installed.
pub fn versioned_db() -> (GraphDB, Arc<VersioningHandler>) {
    versioned_db_with(Config::in_memory())
}

pub fn versioned_db_with(config: Config) -> (GraphDB, Arc<VersioningHandler>) {
    init_tracing();
    let db = GraphDB::with_config(config);
    let handler = chronograph_versioning::install(&db).unwrap();
    (db, handler)
}

pub fn v(n: u64) -> Version {
    Version::new(n)
}

pub fn at(n: u64) -> VersionContext {
    VersionContext::new(v(n))
}

/// Reads `key` of `node` as of version `n`.
pub fn read(session: &Session, node: NodeId, n: u64, key: &str) -> Option<Value> {
    at(n).node(session, node).unwrap().property(key).unwrap()
}
