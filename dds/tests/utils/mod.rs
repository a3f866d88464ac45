#![allow(dead_code)]

pub mod entity_tree;

/// Installs a subscriber printing the crate's log output in the test output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}
