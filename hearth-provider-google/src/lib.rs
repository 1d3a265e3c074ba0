//! Google Calendar as a read-only event source for hearth.
//!
//! Events are fetched expanded (one item per occurrence) and converted into
//! `Event`s pinned to the date they start on, so they pass through the day
//! resolver and the column packer like any other event.

pub mod api;
pub mod credentials;
pub mod normalize;
pub mod token;

pub use api::{GoogleAuth, GoogleCalendarClient};
pub use credentials::ServiceAccountCredentials;
