use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::{
    dims::Dims,
    error::MenuError,
    settings::{theme::MenuStyles, Settings},
    terminal::{CrosstermTerminal, HeadlessHandle, HeadlessTerminal, Terminal},
};

use super::{Menu, MenuRef};

/// State shared by every menu drawn on one terminal: the terminal itself,
/// the look of the menus and the slot holding the menu that has input.
pub struct MenuContext {
    terminal: Mutex<Box<dyn Terminal>>,
    active: Mutex<Option<MenuRef>>,
    styles: MenuStyles,
    show_exit_option: bool,
    poll_interval: Duration,
}

impl MenuContext {
    pub fn new(terminal: impl Terminal + 'static, settings: &Settings) -> Arc<Self> {
        Arc::new(MenuContext {
            terminal: Mutex::new(Box::new(terminal)),
            active: Mutex::new(None),
            styles: settings.styles(),
            show_exit_option: settings.show_exit_option,
            poll_interval: settings.poll_interval(),
        })
    }

    pub fn crossterm(settings: &Settings) -> Arc<Self> {
        Self::new(CrosstermTerminal::new(), settings)
    }

    /// Context on a [`HeadlessTerminal`] of the given size, polling often so
    /// scripted runs finish quickly.
    pub fn headless(size: Dims) -> (Arc<Self>, HeadlessHandle) {
        let (terminal, handle) = HeadlessTerminal::new(size);
        let settings = Settings {
            poll_interval_ms: 2,
            ..Settings::default()
        };
        (Self::new(terminal, &settings), handle)
    }

    pub fn styles(&self) -> MenuStyles {
        self.styles
    }

    pub fn show_exit_option(&self) -> bool {
        self.show_exit_option
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn terminal(&self) -> Result<MutexGuard<Box<dyn Terminal>>, MenuError> {
        Ok(self.terminal.lock()?)
    }

    fn active_slot(&self) -> MutexGuard<Option<MenuRef>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The menu currently receiving input, if any.
    pub fn active_menu(&self) -> Option<Menu> {
        self.active_slot().as_ref().and_then(MenuRef::upgrade)
    }

    pub(crate) fn set_active(&self, menu: Option<MenuRef>) {
        *self.active_slot() = menu;
    }

    pub(crate) fn take_active(&self) -> Option<MenuRef> {
        self.active_slot().take()
    }
}

impl std::fmt::Debug for MenuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuContext")
            .field("active", &self.active_menu())
            .field("styles", &self.styles)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
