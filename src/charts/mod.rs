//! Charts module - chart descriptions, PNG rendering and desktop drawing

pub mod catalog;
pub mod interactive;
pub mod layout;
pub mod palette;
mod render;
pub mod spec;

pub use render::{encode_png, render_png, RenderError};
pub use spec::{ChartSpec, NamedChart};
