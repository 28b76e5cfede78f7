//! Theme system: Tera templates for the dashboard shell.

mod engine;

pub use engine::ThemeEngine;
