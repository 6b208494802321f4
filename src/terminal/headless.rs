use std::{
    io,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::{dims::Dims, helpers::lock, renderer::Surface, ui::Rect};

use super::{Key, Terminal};

/// One `refresh_region` call, as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub top_row: i32,
    pub lines: Vec<String>,
}

impl Frame {
    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|l| l.contains(text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermEvent {
    Enter,
    Leave,
    Suspend,
    Restore,
    Clear,
    Cursor(bool),
}

#[derive(Debug)]
struct Recorder {
    size: Mutex<Dims>,
    frames: Mutex<Vec<Frame>>,
    events: Mutex<Vec<TermEvent>>,
}

/// Terminal without a screen. Keys come from a [`HeadlessHandle`] and every
/// refresh is recorded as a [`Frame`].
#[derive(Debug)]
pub struct HeadlessTerminal {
    keys: Receiver<Key>,
    recorder: Arc<Recorder>,
}

/// Script side of a [`HeadlessTerminal`].
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    keys: Sender<Key>,
    recorder: Arc<Recorder>,
}

impl HeadlessTerminal {
    pub fn new(size: Dims) -> (Self, HeadlessHandle) {
        let (tx, rx) = unbounded();
        let recorder = Arc::new(Recorder {
            size: Mutex::new(size),
            frames: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        });

        (
            HeadlessTerminal {
                keys: rx,
                recorder: recorder.clone(),
            },
            HeadlessHandle { keys: tx, recorder },
        )
    }

    fn record(&self, event: TermEvent) {
        lock(&self.recorder.events).push(event);
    }
}

impl Terminal for HeadlessTerminal {
    fn size(&self) -> io::Result<Dims> {
        Ok(*lock(&self.recorder.size))
    }

    fn read_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        match self.keys.recv_timeout(timeout) {
            Ok(key) => Ok(Some(key)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.record(TermEvent::Cursor(visible));
        Ok(())
    }

    fn refresh_region(
        &mut self,
        surface: &Surface,
        top_row: i32,
        region: Rect,
    ) -> io::Result<()> {
        let width = region.size().0.max(0) as usize;
        let lines = (top_row..top_row + region.size().1)
            .map(|row| surface.row_text(row).chars().take(width).collect())
            .collect();

        lock(&self.recorder.frames).push(Frame { top_row, lines });
        Ok(())
    }

    fn enter(&mut self) -> io::Result<()> {
        self.record(TermEvent::Enter);
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        self.record(TermEvent::Leave);
        Ok(())
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.record(TermEvent::Suspend);
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        self.record(TermEvent::Restore);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.record(TermEvent::Clear);
        Ok(())
    }
}

impl HeadlessHandle {
    pub fn press(&self, key: Key) {
        // the terminal is gone once its menus are dropped, nothing to deliver to
        let _ = self.keys.send(key);
    }

    pub fn press_all(&self, keys: impl IntoIterator<Item = Key>) {
        keys.into_iter().for_each(|k| self.press(k));
    }

    pub fn type_str(&self, text: &str) {
        self.press_all(text.chars().map(Key::Char));
    }

    /// Changes the reported size and queues the matching resize event.
    pub fn resize(&self, size: Dims) {
        *lock(&self.recorder.size) = size;
        self.press(Key::Resize(size));
    }

    /// Keys sent but not read yet.
    pub fn pending(&self) -> usize {
        self.keys.len()
    }

    pub fn frames(&self) -> Vec<Frame> {
        lock(&self.recorder.frames).clone()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        lock(&self.recorder.frames).last().cloned()
    }

    pub fn events(&self) -> Vec<TermEvent> {
        lock(&self.recorder.events).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::theme::Style;

    #[test]
    fn keys_arrive_in_order_then_time_out() {
        let (mut term, handle) = HeadlessTerminal::new(Dims(10, 5));
        handle.press(Key::Down);
        handle.type_str("1");

        let timeout = Duration::from_millis(1);
        assert_eq!(term.read_key(timeout).unwrap(), Some(Key::Down));
        assert_eq!(term.read_key(timeout).unwrap(), Some(Key::Char('1')));
        assert_eq!(term.read_key(timeout).unwrap(), None);
    }

    #[test]
    fn refresh_records_visible_rows() {
        let (mut term, handle) = HeadlessTerminal::new(Dims(4, 2));
        let mut surface = Surface::new(Dims(6, 4));
        surface.add_text(Dims(0, 2), "abcdef", Style::default());

        term.refresh_region(&surface, 1, Rect::sized(Dims(4, 2)))
            .unwrap();

        let frame = handle.last_frame().unwrap();
        assert_eq!(frame.top_row, 1);
        assert_eq!(frame.lines, ["    ", "abcd"]);
    }

    #[test]
    fn resize_updates_size() {
        let (term, handle) = HeadlessTerminal::new(Dims(10, 5));
        handle.resize(Dims(20, 8));

        assert_eq!(term.size().unwrap(), Dims(20, 8));
        assert_eq!(handle.pending(), 1);
    }
}
