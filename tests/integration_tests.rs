//! Integration tests for Stagebox nodes
//!
//! Test categories:
//! - Effects: construction, clamping, bypass crossfade, deferred attachment
//! - Analysis: live reads and stereo correction through an installed tap
//! - Chain: serial wiring, rollback and teardown
//!
//! Run with:
//! ```bash
//! cargo test -p stagebox --test integration_tests
//! ```

mod helpers;
mod integration;
