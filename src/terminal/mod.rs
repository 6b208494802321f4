pub mod headless;
pub mod tty;

use std::{io, time::Duration};

use crate::{dims::Dims, renderer::Surface, ui::Rect};

pub use headless::{HeadlessHandle, HeadlessTerminal};
pub use tty::CrosstermTerminal;

/// The keys a menu reacts to, everything else is folded into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Enter,
    /// Leaves the current menu, like its exit item.
    Back,
    /// Ctrl+C, unwinds every menu up to the root.
    Interrupt,
    Resize(Dims),
    Other,
}

/// Everything a menu needs from the console it is drawn on.
pub trait Terminal: Send {
    fn size(&self) -> io::Result<Dims>;

    /// Waits at most `timeout` for a key, `None` when nothing arrived.
    fn read_key(&mut self, timeout: Duration) -> io::Result<Option<Key>>;

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()>;

    /// Copies the rows of `surface` starting at `top_row` into `region` of
    /// the screen.
    fn refresh_region(&mut self, surface: &Surface, top_row: i32, region: Rect)
        -> io::Result<()>;

    /// Takes over the screen for drawing.
    fn enter(&mut self) -> io::Result<()>;

    /// Gives the screen back, undoing [`Terminal::enter`].
    fn leave(&mut self) -> io::Result<()>;

    /// Hands the terminal to an external program.
    fn suspend(&mut self) -> io::Result<()>;

    /// Takes the terminal back after [`Terminal::suspend`].
    fn restore(&mut self) -> io::Result<()>;

    fn clear(&mut self) -> io::Result<()>;
}
