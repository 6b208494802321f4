use std::sync::Arc;

use crate::error::MenuError;

use super::{Menu, MenuContext, MenuItem};

/// Menu built from a list of strings. Selecting one ends the menu and
/// returns its index.
#[derive(Debug, Clone)]
pub struct SelectionMenu {
    menu: Menu,
}

impl SelectionMenu {
    pub fn new<S: AsRef<str>>(
        ctx: &Arc<MenuContext>,
        strings: &[S],
        title: impl Into<String>,
        subtitle: impl Into<String>,
    ) -> Result<Self, MenuError> {
        let menu = Menu::new(ctx, title, subtitle);
        for (index, text) in strings.iter().enumerate() {
            menu.append_item(MenuItem::selection(text.as_ref(), index))?;
        }
        Ok(SelectionMenu { menu })
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Index of the chosen string, `None` if the menu was left through the
    /// exit item or not shown yet.
    pub fn selection(&self) -> Option<usize> {
        self.menu.returned_as::<usize>()
    }

    /// Shows a menu of `strings` and blocks until one is picked.
    pub fn get_selection<S: AsRef<str>>(
        ctx: &Arc<MenuContext>,
        strings: &[S],
        title: impl Into<String>,
        subtitle: impl Into<String>,
        show_exit_option: bool,
    ) -> Result<Option<usize>, MenuError> {
        let selection = Self::new(ctx, strings, title, subtitle)?;
        selection.menu.show(Some(show_exit_option))?;
        Ok(selection.selection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dims::Dims, terminal::Key};

    const FRUIT: [&str; 3] = ["apple", "pear", "plum"];

    #[test]
    fn returns_picked_index() {
        let (ctx, term) = MenuContext::headless(Dims(40, 20));
        term.press_all([Key::Down, Key::Enter]);

        let picked = SelectionMenu::get_selection(&ctx, &FRUIT, "Fruit", "", true).unwrap();
        assert_eq!(picked, Some(1));
    }

    #[test]
    fn exit_item_returns_nothing() {
        let (ctx, term) = MenuContext::headless(Dims(40, 20));
        term.press_all([Key::Char('4'), Key::Enter]);

        let picked = SelectionMenu::get_selection(&ctx, &FRUIT, "Fruit", "", true).unwrap();
        assert_eq!(picked, None);
    }

    #[test]
    fn without_exit_item_up_wraps_to_last_string() {
        let (ctx, term) = MenuContext::headless(Dims(40, 20));
        term.press_all([Key::Up, Key::Enter]);

        let selection = SelectionMenu::new(&ctx, &FRUIT, "Fruit", "").unwrap();
        selection.menu().show(Some(false)).unwrap();

        assert_eq!(selection.menu().items_len(), 3);
        assert_eq!(selection.selection(), Some(2));
    }
}
