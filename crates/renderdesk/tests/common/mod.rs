//! Shared test utilities for renderdesk integration tests.
//!
//! - `TestHarness`: temp directories, scene files and an in-memory database
//! - builders for jobs and layers
//! - `MockFarm`, a scriptable `FarmClient`

pub mod builders;
pub mod harness;
pub mod mock_farm;

pub use builders::*;
pub use harness::TestHarness;
pub use mock_farm::MockFarm;
