use std::ops::Index;

use unicode_width::UnicodeWidthChar;

use crate::{dims::Dims, settings::theme::Style, ui::Rect};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CellContent {
    pub character: char,
    pub width: u8,
    pub style: Style,
}

impl CellContent {
    pub fn styled(c: char, style: Style) -> Self {
        CellContent {
            character: c,
            width: c.width().unwrap_or(1).max(1) as u8,
            style,
        }
    }

    pub fn empty() -> Self {
        CellContent {
            character: ' ',
            width: 1,
            style: Style::default(),
        }
    }
}

/// Wide characters occupy one `Content` cell followed by `Placeholder`s
/// holding the distance back to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cell {
    Placeholder(u8),
    Content(CellContent),
}

impl Cell {
    pub fn styled(c: char, s: Style) -> Self {
        Cell::Content(CellContent::styled(c, s))
    }

    pub fn empty() -> Self {
        Cell::Content(CellContent::empty())
    }

    pub fn content(&self) -> Option<&CellContent> {
        match self {
            Cell::Content(c) => Some(c),
            _ => None,
        }
    }

    /// Returns `true` if the cell is [`Placeholder`].
    ///
    /// [`Placeholder`]: Cell::Placeholder
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(..))
    }
}

/// Off-screen drawing area owned by a menu. It can be taller than the
/// terminal, only a window of its rows is copied to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    size: Dims,
    cells: Vec<Cell>,
}

impl Surface {
    pub fn new(size: Dims) -> Self {
        let size = Dims(size.0.max(0), size.1.max(0));
        Surface {
            size,
            cells: vec![Cell::empty(); (size.0 * size.1) as usize],
        }
    }

    pub fn size(&self) -> Dims {
        self.size
    }

    pub fn resize(&mut self, new_size: Dims) {
        if self.size != new_size {
            *self = Surface::new(new_size);
        }
    }

    pub fn contains(&self, pos: Dims) -> bool {
        Rect::sized(self.size).contains(pos)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::empty());
    }

    fn idx(&self, pos: Dims) -> usize {
        (pos.1 * self.size.0 + pos.0) as usize
    }

    pub fn get(&self, pos: Dims) -> Option<&Cell> {
        self.contains(pos).then(|| &self.cells[self.idx(pos)])
    }

    fn clear_space(&mut self, pos: Dims, style: Style) {
        let start = match self.cells[self.idx(pos)] {
            Cell::Content(_) => pos,
            Cell::Placeholder(by) => pos - Dims(by as i32, 0),
        };
        let width = match self.cells[self.idx(start)] {
            Cell::Content(c) => c.width as i32,
            Cell::Placeholder(_) => 1,
        };

        for x in start.0..(start.0 + width).min(self.size.0) {
            let idx = self.idx(Dims(x, start.1));
            self.cells[idx] = Cell::styled(' ', style);
        }
    }

    /// Puts a single character at `pos`, returns how many columns it takes.
    /// Characters that don't fit whole are replaced by blanks.
    pub fn add_char(&mut self, pos: Dims, chr: char, style: Style) -> i32 {
        let width = chr.width().unwrap_or(1).max(1) as i32;

        if !self.contains(pos) || !self.contains(Dims(pos.0 + width - 1, pos.1)) {
            if (0..self.size.1).contains(&pos.1) {
                for x in pos.0.max(0)..(pos.0 + width).min(self.size.0) {
                    self.clear_space(Dims(x, pos.1), style);
                }
            }
            return width;
        }

        for x in pos.0..pos.0 + width {
            self.clear_space(Dims(x, pos.1), style);
        }

        let idx = self.idx(pos);
        self.cells[idx] = Cell::styled(chr, style);
        for x in pos.0 + 1..pos.0 + width {
            let idx = self.idx(Dims(x, pos.1));
            self.cells[idx] = Cell::Placeholder((x - pos.0) as u8);
        }

        width
    }

    /// Writes `text` starting at `pos`, clipped to the surface.
    pub fn add_text(&mut self, pos: Dims, text: &str, style: Style) {
        let mut x = pos.0;
        for chr in text.chars() {
            if x >= self.size.0 {
                break;
            }
            x += self.add_char(Dims(x, pos.1), chr, style);
        }
    }

    pub fn border(&mut self, style: Style) {
        crate::ui::draw_box(self, Dims::ZERO, self.size, style);
    }

    /// Text of one row without styles, placeholders skipped.
    pub fn row_text(&self, row: i32) -> String {
        if !(0..self.size.1).contains(&row) {
            return String::new();
        }
        self[row].iter().filter_map(|c| c.content()).map(|c| c.character).collect()
    }
}

impl Index<i32> for Surface {
    type Output = [Cell];

    fn index(&self, row: i32) -> &Self::Output {
        let start = self.idx(Dims(0, row));
        &self.cells[start..start + self.size.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_clipped_at_the_edge() {
        let mut surface = Surface::new(Dims(5, 2));
        surface.add_text(Dims(2, 1), "hello", Style::default());

        assert_eq!(surface.row_text(0), "     ");
        assert_eq!(surface.row_text(1), "  hel");
    }

    #[test]
    fn wide_chars_use_placeholders() {
        let mut surface = Surface::new(Dims(4, 1));
        surface.add_text(Dims(0, 0), "界a", Style::default());

        assert_eq!(surface[0][1], Cell::Placeholder(1));
        assert_eq!(surface.row_text(0), "界a ");

        // overwriting the second half of a wide char blanks the first half
        surface.add_char(Dims(1, 0), 'x', Style::default());
        assert_eq!(surface.row_text(0), " xa ");
    }

    #[test]
    fn wide_char_that_does_not_fit_becomes_blank() {
        let mut surface = Surface::new(Dims(3, 1));
        surface.add_text(Dims(0, 0), "ab界", Style::default());
        assert_eq!(surface.row_text(0), "ab ");
    }

    #[test]
    fn border_is_drawn_around_the_surface() {
        let mut surface = Surface::new(Dims(4, 3));
        surface.border(Style::default());

        assert_eq!(surface.row_text(0), "╭──╮");
        assert_eq!(surface.row_text(1), "│  │");
        assert_eq!(surface.row_text(2), "╰──╯");
    }

    #[test]
    fn resize_clears_content() {
        let mut surface = Surface::new(Dims(3, 1));
        surface.add_text(Dims::ZERO, "abc", Style::default());
        surface.resize(Dims(2, 2));

        assert_eq!(surface.size(), Dims(2, 2));
        assert_eq!(surface.row_text(0), "  ");
        assert!(surface.get(Dims(2, 0)).is_none());
    }
}
