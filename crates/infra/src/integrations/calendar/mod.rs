//! Calendar provider integrations
//!
//! Event fetching for:
//! - Google Calendar
//! - Microsoft Calendar (Outlook/365, via Graph)

pub mod providers;

pub use providers::{build_registry, GoogleCalendarSource, MicrosoftCalendarSource};
