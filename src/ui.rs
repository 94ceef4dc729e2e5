//! Ratatui front-end. One session screen: controls on the left, the live
//! `original -> new` preview list on the right, status and key hints in the
//! footer. Popups handle the base name and the add-files path.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
