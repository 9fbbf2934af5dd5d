//! Terminal output: the row model, the static printer and the ratatui TUI.

mod app;
mod input;
pub mod paint;
pub mod print;
pub mod render;
pub mod rows;

pub use app::{App, DiffLoader, Focus, GitLoader, Mode};
pub use input::handle_input;
pub use paint::{FilePainter, PaintOptions, ViewLayout};
pub use print::{print_diff, terminal_width, PrintOptions};
pub use render::render;
pub use rows::{build_rows, DiffRow};
