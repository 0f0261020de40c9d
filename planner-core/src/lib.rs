//! Resource store for the planner.
//!
//! This crate holds everything the server and CLI share:
//! - `record` types for logins, users, calendars and their items
//! - `store::Store`, the in-memory mirror of the data directory with
//!   per-resource locking and the user/calendar association cascades
//! - `config` for locating the data directory

pub mod codec;
pub mod config;
pub mod error;
pub mod layout;
pub mod permission;
pub mod record;
pub mod singleton;
pub mod store;

pub use config::PlannerConfig;
pub use error::{PlannerError, PlannerResult, ResourceKind};
pub use permission::Permission;
pub use record::{Calendar, CalendarReference, Login, User};
pub use store::{ShareLevel, Store};
