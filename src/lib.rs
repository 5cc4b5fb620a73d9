//! Marksheet - command-line client for the student marksheet portal
//!
//! The heart of the crate is the asynchronous report flow: an admin starts a
//! bulk report job on the server, the client polls its status once a second
//! and downloads the CSV automatically once the job is READY.
//!
//! ## Modules
//!
//! - [`report`]: HTTP client, job poller and the controller that ties them
//!   together, plus individual student marksheets.
//! - [`session`]: the logged-in user (email, role, token, department).
//! - [`config`]: `~/.marksheet/config.toml`.

pub mod config;
pub mod report;
pub mod session;

pub use config::Config;
pub use session::{Role, Session, SessionStore};
