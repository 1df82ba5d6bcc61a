// ABOUTME: Built-in tools the upstream model can invoke during a session.
// ABOUTME: Weather lookup, person search, and calendar read/write.

mod calendar;
mod person_search;
mod weather;

pub use calendar::{CreateCalendarEventTool, GetCalendarEventsTool};
pub use person_search::PersonSearchTool;
pub use weather::WeatherTool;
