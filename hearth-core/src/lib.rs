//! Core types for the hearth dashboard calendar.
//!
//! - `event`: event rows and the typed `Event` they are loaded into
//! - `resolve` / `layout`: which events land on a date, and how timed
//!   events are arranged side by side
//! - `window`: the 1, 3 or 7-day view being displayed
//! - `edit` / `series`: creating and changing events, and excluding or
//!   detaching single occurrences of a weekly series
//! - `settings`, `cache`, `config`, `store`: the surrounding plumbing

pub mod cache;
pub mod config;
pub mod constants;
pub mod edit;
pub mod error;
pub mod event;
pub mod layout;
pub mod resolve;
pub mod series;
pub mod settings;
pub mod store;
pub mod window;

pub use error::{HearthError, HearthResult};
pub use event::{Event, EventColor, EventKind, EventRecord, EventTiming, load_events};
pub use layout::{DayLayout, PlacedEvent, pack_columns};
pub use resolve::events_for_date;
pub use window::{CalendarWindow, ViewMode};
