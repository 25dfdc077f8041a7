//! attendwise-portal — Student portal clients.
//!
//! Implements the `PortalClient` trait against the portal's HTTP API, an
//! offline JSON snapshot, and an in-memory mock for tests.

pub mod config;
pub mod http;
pub mod mock;
pub mod snapshot;

pub use config::{
    create_portal, load_config_from, open_session, AttendwiseConfig, PortalConfig,
};
pub use http::HttpPortal;
pub use mock::MockPortal;
pub use snapshot::{ComponentLectures, PortalSnapshot, SnapshotPortal};
