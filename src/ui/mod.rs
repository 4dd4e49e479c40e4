//! Terminal week view. [`App`] owns the store and the selected day;
//! [`run_app`] drives it with crossterm events.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
