pub mod color;
pub mod config;
pub mod console;
pub mod dialogs;
pub mod editor;
pub mod elevation;
pub mod focus_area;
pub mod geometry;
pub mod guide;
pub mod logging;
pub mod overlay;
pub mod tray;
