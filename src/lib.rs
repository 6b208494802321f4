pub mod dims;
pub mod error;
pub mod helpers;
pub mod logging;
pub mod menu;
pub mod renderer;
pub mod settings;
pub mod terminal;
pub mod ui;
