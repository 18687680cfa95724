//! Canvas LMS access.
//!
//! [`CanvasApi`] is the async trait the rest of the crate depends on.
//! [`CanvasClient`] implements it over any [`crate::fetch::HttpClient`], and
//! [`CanvasSession`] carries the per-user token and endpoint used to build one.

pub mod api;
mod client;
mod session;

pub use api::{CanvasApi, CourseSummary};
pub use client::CanvasClient;
pub use session::{CanvasSession, SessionTransport};
