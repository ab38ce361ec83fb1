/// Terminal presentation - Gateway
mod render;
mod theme;

pub use render::{render_catalog, render_history, render_status};
pub use theme::{truncate_preview, DisplayTheme};
