//! Shared helpers for the integration tests.

#![allow(dead_code)]

use tracing_subscriber::EnvFilter;

use kasane_vfs::{ErrorKind, VfsResult};

/// Install a test subscriber once. Set `RUST_LOG=kasane_vfs=trace` to see
/// dispatch decisions.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Assert that `result` failed with `kind` and return the reported path.
#[track_caller]
pub fn expect_kind<T: std::fmt::Debug>(result: VfsResult<T>, kind: ErrorKind) -> String {
    match result {
        Err(e) => {
            assert_eq!(e.kind(), kind, "unexpected error: {e}");
            e.path().to_string()
        }
        Ok(v) => panic!("expected {kind}, got Ok({v:?})"),
    }
}

/// Deterministic non-text payload larger than the default copy chunk.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
