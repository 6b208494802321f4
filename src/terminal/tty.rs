use std::{
    io::{self, stdout, Write},
    panic::{self, PanicHookInfo},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::{self, ContentStyle},
    terminal::{self, ClearType},
    QueueableCommand, SynchronizedUpdate,
};

use crate::{
    dims::Dims,
    helpers::{is_release, lock},
    renderer::{Cell, Surface},
    ui::Rect,
};

use super::{Key, Terminal};

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Terminal on the process' stdout, driven by crossterm.
#[derive(Default)]
pub struct CrosstermTerminal {
    entered: bool,
    prev_hook: Option<Arc<Mutex<Option<PanicHook>>>>,
}

impl std::fmt::Debug for CrosstermTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrosstermTerminal")
            .field("entered", &self.entered)
            .finish_non_exhaustive()
    }
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    fn turn_on(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(())
    }

    fn turn_off(&mut self) -> io::Result<()> {
        execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn register_panic_hook(&mut self) {
        let prev = Arc::new(Mutex::new(Some(panic::take_hook())));
        self.prev_hook = Some(prev.clone());

        panic::set_hook(Box::new(move |info| {
            let _ = execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show);
            let _ = terminal::disable_raw_mode();

            if let Some(prev) = lock(&prev).as_ref() {
                prev(info)
            }
        }));
    }

    /// Puts back whatever hook was installed before [`Self::register_panic_hook`].
    fn unregister_panic_hook(&mut self) {
        let Some(prev) = self.prev_hook.take() else {
            return;
        };
        if thread::panicking() {
            return;
        }

        let _ = panic::take_hook();
        if let Some(hook) = lock(&prev).take() {
            panic::set_hook(hook);
        };
    }

    fn convert_key(code: KeyCode, modifiers: KeyModifiers) -> Key {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Esc => Key::Back,
            KeyCode::Enter => Key::Enter,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            _ => Key::Other,
        }
    }
}

impl Terminal for CrosstermTerminal {
    fn size(&self) -> io::Result<Dims> {
        terminal::size().map(Dims::from)
    }

    fn read_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        Ok(match event::read()? {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) if !is_release(kind) => Some(Self::convert_key(code, modifiers)),
            Event::Resize(w, h) => Some(Key::Resize((w, h).into())),
            _ => None,
        })
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        if visible {
            execute!(stdout(), cursor::Show)
        } else {
            execute!(stdout(), cursor::Hide)
        }
    }

    fn refresh_region(
        &mut self,
        surface: &Surface,
        top_row: i32,
        region: Rect,
    ) -> io::Result<()> {
        let mut tty = stdout();

        tty.sync_update(|tty| {
            let mut current = ContentStyle::default();
            tty.queue(style::ResetColor)?;

            for y in region.start.1..=region.end.1 {
                let row = top_row + y - region.start.1;
                tty.queue(cursor::MoveTo(region.start.0.max(0) as u16, y.max(0) as u16))?;

                if !(0..surface.size().1).contains(&row) {
                    tty.queue(style::ResetColor)?;
                    tty.queue(terminal::Clear(ClearType::UntilNewLine))?;
                    current = ContentStyle::default();
                    continue;
                }

                let cols = region.size().0.min(surface.size().0).max(0) as usize;
                for cell in &surface[row][..cols] {
                    let Cell::Content(c) = cell else {
                        continue;
                    };

                    let c_style: ContentStyle = c.style.into();
                    if current != c_style {
                        if current.background_color != c_style.background_color {
                            tty.queue(style::SetBackgroundColor(
                                c_style.background_color.unwrap_or(style::Color::Reset),
                            ))?;
                        }
                        if current.foreground_color != c_style.foreground_color {
                            tty.queue(style::SetForegroundColor(
                                c_style.foreground_color.unwrap_or(style::Color::Reset),
                            ))?;
                        }
                        if current.attributes != c_style.attributes {
                            tty.queue(style::SetAttribute(style::Attribute::Reset))?;
                            if let Some(x) = c_style.foreground_color {
                                tty.queue(style::SetForegroundColor(x))?;
                            }
                            if let Some(x) = c_style.background_color {
                                tty.queue(style::SetBackgroundColor(x))?;
                            }
                            tty.queue(style::SetAttributes(c_style.attributes))?;
                        }
                        current = c_style;
                    }
                    tty.queue(style::Print(c.character))?;
                }
            }

            tty.queue(style::ResetColor)?;
            tty.queue(style::SetAttribute(style::Attribute::Reset))?;
            tty.flush()
        })?
    }

    fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        self.register_panic_hook();
        self.turn_on()?;
        self.entered = true;
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        self.unregister_panic_hook();
        self.entered = false;
        self.turn_off()
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.turn_off()
    }

    fn restore(&mut self) -> io::Result<()> {
        self.turn_on()?;
        execute!(stdout(), terminal::Clear(ClearType::All))
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(
            stdout(),
            style::ResetColor,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
        )
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn ctrl_c_and_esc_leave_menus() {
        let convert = CrosstermTerminal::convert_key;

        assert_eq!(convert(KeyCode::Char('c'), KeyModifiers::CONTROL), Key::Interrupt);
        assert_eq!(convert(KeyCode::Char('c'), KeyModifiers::NONE), Key::Char('c'));
        assert_eq!(convert(KeyCode::Esc, KeyModifiers::NONE), Key::Back);
        assert_eq!(convert(KeyCode::Char('3'), KeyModifiers::SHIFT), Key::Char('3'));
        assert_eq!(convert(KeyCode::Tab, KeyModifiers::NONE), Key::Other);
    }

    #[test]
    fn unregistering_restores_previous_panic_hook() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        const MESSAGE: &str = "panic seen by the outer hook";

        let original = panic::take_hook();
        panic::set_hook(Box::new(|info| {
            if info.payload().downcast_ref::<&str>() == Some(&MESSAGE) {
                CALLS.fetch_add(1, Ordering::SeqCst);
            }
        }));

        let mut term = CrosstermTerminal::new();
        term.register_panic_hook();
        term.unregister_panic_hook();
        assert!(term.prev_hook.is_none());

        let _ = panic::catch_unwind(|| panic::panic_any(MESSAGE));
        panic::set_hook(original);

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
