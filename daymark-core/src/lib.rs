//! Core types for daymark.
//!
//! This crate holds everything between a calendar provider and the screen:
//! - `event` and `day` for the event model and the canonical local-day key
//! - `marks` for grouping events into marked calendar days
//! - `gateway` for the provider contract, with `provider` (subprocess) and
//!   `memory` (in-process) implementations
//! - `session` and `controller` for form state, validation and reloads

pub mod config;
pub mod constants;
pub mod controller;
pub mod day;
pub mod error;
pub mod event;
pub mod gateway;
pub mod marks;
pub mod memory;
pub mod protocol;
pub mod provider;
pub mod session;
pub mod validation;
pub mod window;

pub use controller::EventController;
pub use day::DayKey;
pub use error::{DaymarkError, DaymarkResult};
pub use event::{Event, EventDraft, EventId};
pub use gateway::{CalendarGateway, CalendarHandle, Granted};
pub use marks::{MarkedDates, MarkedDayInfo};
pub use session::{FormState, ReloadOutcome, ReloadTicket, Session};
pub use validation::ValidationError;
pub use window::Window;
