use std::{
    any::Any,
    process::Command,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{error::MenuError, helpers::lock};

use super::{Menu, MenuRef, Returned};

type ItemFn = Box<dyn FnMut() -> Result<Option<Returned>, MenuError> + Send>;

/// What an item does when selected.
pub enum ItemKind {
    /// Does nothing. Returns the given value, or passes the menu's last one on.
    Plain(Option<Returned>),
    /// Runs a closure with the terminal handed over to it.
    Function(Mutex<ItemFn>),
    /// Runs a shell command with the terminal handed over to it.
    Command {
        command: String,
        arguments: Vec<String>,
    },
    /// Opens another menu on top of the owning one.
    Submenu(Menu),
    /// Returns its index in a [`SelectionMenu`](super::SelectionMenu).
    Selection(usize),
    /// Ends the owning menu.
    Exit,
}

impl std::fmt::Debug for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Plain(value) => f.debug_tuple("Plain").field(&value.is_some()).finish(),
            ItemKind::Function(_) => f.write_str("Function"),
            ItemKind::Command { command, arguments } => f
                .debug_struct("Command")
                .field("command", command)
                .field("arguments", arguments)
                .finish(),
            ItemKind::Submenu(menu) => f.debug_tuple("Submenu").field(menu).finish(),
            ItemKind::Selection(index) => f.debug_tuple("Selection").field(index).finish(),
            ItemKind::Exit => f.write_str("Exit"),
        }
    }
}

#[derive(Debug)]
pub struct MenuItem {
    text: String,
    pub(super) menu: MenuRef,
    terminates: bool,
    kind: ItemKind,
    last_return: Mutex<Option<Returned>>,
}

impl MenuItem {
    fn with_kind(text: impl Into<String>, kind: ItemKind, terminates: bool) -> Self {
        MenuItem {
            text: text.into(),
            menu: MenuRef::default(),
            terminates,
            kind,
            last_return: Mutex::new(None),
        }
    }

    pub fn new(text: impl Into<String>) -> Self {
        Self::with_kind(text, ItemKind::Plain(None), false)
    }

    /// Item returning a fixed value when selected.
    pub fn value<T: Any + Send + Sync>(text: impl Into<String>, value: T) -> Self {
        Self::with_kind(text, ItemKind::Plain(Some(Arc::new(value))), false)
    }

    pub fn function<T, F>(text: impl Into<String>, mut function: F) -> Self
    where
        T: Any + Send + Sync,
        F: FnMut() -> T + Send + 'static,
    {
        Self::try_function(text, move || Ok(function()))
    }

    /// Like [`MenuItem::function`], but an error ends the menu loop and is
    /// returned from [`Menu::join`].
    pub fn try_function<T, F>(text: impl Into<String>, mut function: F) -> Self
    where
        T: Any + Send + Sync,
        F: FnMut() -> Result<T, MenuError> + Send + 'static,
    {
        let call: ItemFn = Box::new(move || Ok(Some(Arc::new(function()?) as Returned)));
        Self::with_kind(text, ItemKind::Function(Mutex::new(call)), false)
    }

    /// Runs `command` with `arguments` through the shell. Returns the exit
    /// code as `i32`, `-1` when the process was killed by a signal.
    pub fn command<I, S>(text: impl Into<String>, command: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let kind = ItemKind::Command {
            command: command.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        };
        Self::with_kind(text, kind, false)
    }

    pub fn submenu(text: impl Into<String>, submenu: Menu) -> Self {
        Self::with_kind(text, ItemKind::Submenu(submenu), false)
    }

    pub fn selection(text: impl Into<String>, index: usize) -> Self {
        Self::with_kind(text, ItemKind::Selection(index), true)
    }

    pub(super) fn exit(menu: MenuRef) -> Self {
        MenuItem {
            menu,
            ..Self::with_kind("Exit", ItemKind::Exit, true)
        }
    }

    /// Makes selecting this item end the menu.
    pub fn terminating(mut self, terminates: bool) -> Self {
        self.terminates = terminates;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn terminates_menu(&self) -> bool {
        self.terminates
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.kind, ItemKind::Exit)
    }

    pub fn menu(&self) -> Option<Menu> {
        self.menu.upgrade()
    }

    /// Text drawn for the item at `index` of its menu.
    pub fn show(&self, index: usize) -> String {
        format!("{} - {}", index + 1, self.display_text())
    }

    fn display_text(&self) -> String {
        if !self.is_exit() {
            return self.text.clone();
        }

        match self.menu().and_then(|m| m.parent()) {
            Some(parent) => format!("Return to {} menu", parent.title()),
            None => "Exit".to_string(),
        }
    }

    fn last_return(&self) -> MutexGuard<Option<Returned>> {
        lock(&self.last_return)
    }

    fn owner(&self) -> Option<Menu> {
        let menu = self.menu();
        if menu.is_none() {
            log::warn!("Item {:?} isn't attached to any menu", self.text);
        }
        menu
    }

    pub fn set_up(&self) -> Result<(), MenuError> {
        match &self.kind {
            ItemKind::Function(_) | ItemKind::Command { .. } => {
                if let Some(menu) = self.owner() {
                    menu.clear_screen();
                    menu.context().terminal()?.suspend()?;
                }
            }
            ItemKind::Submenu(_) => {
                if let Some(menu) = self.owner() {
                    menu.pause();
                    menu.clear_screen();
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn action(&self) -> Result<(), MenuError> {
        match &self.kind {
            ItemKind::Function(function) => {
                let mut guard = lock(function);
                let call: &mut ItemFn = &mut guard;
                *self.last_return() = call()?;
            }
            ItemKind::Command { command, arguments } => {
                let code = run_command(command, arguments)?;
                *self.last_return() = Some(Arc::new(code));
            }
            ItemKind::Submenu(submenu) => {
                submenu.start(None)?;
                submenu.join(None)?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn clean_up(&self) -> Result<(), MenuError> {
        match &self.kind {
            ItemKind::Function(_) | ItemKind::Command { .. } => {
                if let Some(menu) = self.owner() {
                    menu.context().terminal()?.restore()?;
                    menu.clear_screen();
                }
            }
            ItemKind::Submenu(submenu) => {
                submenu.clear_screen();
                if let Some(menu) = self.owner() {
                    menu.resume();
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Value the owning menu stores after this item was selected.
    pub fn get_return(&self) -> Option<Returned> {
        match &self.kind {
            ItemKind::Plain(Some(value)) => Some(value.clone()),
            ItemKind::Function(_) | ItemKind::Command { .. } => self.last_return().clone(),
            ItemKind::Submenu(submenu) => submenu.returned_value(),
            ItemKind::Selection(index) => Some(Arc::new(*index)),
            ItemKind::Plain(None) | ItemKind::Exit => {
                self.menu().and_then(|m| m.returned_value())
            }
        }
    }
}

pub fn command_line(command: &str, arguments: &[String]) -> String {
    std::iter::once(command)
        .chain(arguments.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_command(command: &str, arguments: &[String]) -> Result<i32, MenuError> {
    let line = command_line(command, arguments);
    log::debug!("Running command `{}`", line);

    let (shell, flag) = if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };
    let status = Command::new(shell)
        .args([flag, line.as_str()])
        .status()
        .map_err(|source| MenuError::Command {
            command: line.clone(),
            source,
        })?;

    Ok(status.code().unwrap_or(-1))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn default_text() {
        assert_eq!(MenuItem::new("Open").show(0), "1 - Open");
        assert_eq!(MenuItem::new("Quit").show(11), "12 - Quit");
    }

    #[test]
    fn command_line_joins_arguments() {
        let args = ["-l", "-a", "~"].map(String::from);
        assert_eq!(command_line("ls", &args), "ls -l -a ~");
        assert_eq!(command_line("ls", &[]), "ls");
    }

    #[test]
    fn selection_returns_index_and_terminates() {
        let item = MenuItem::selection("third", 2);
        assert!(item.terminates_menu());
        let value = item.get_return().unwrap();
        assert_eq!(value.downcast_ref::<usize>(), Some(&2));
    }

    #[test]
    fn detached_function_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let item = {
            let calls = calls.clone();
            MenuItem::function("count", move || calls.fetch_add(1, Ordering::SeqCst) + 1)
        };

        item.set_up().unwrap();
        item.action().unwrap();
        item.clean_up().unwrap();
        item.action().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let value = item.get_return().unwrap();
        assert_eq!(value.downcast_ref::<usize>(), Some(&2));
    }

    #[test]
    fn function_error_propagates() {
        let item = MenuItem::try_function("fail", || -> Result<(), MenuError> {
            Err(MenuError::NotStarted)
        });
        assert!(matches!(item.action(), Err(MenuError::NotStarted)));
        assert!(item.get_return().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn command_returns_exit_code() {
        let item = MenuItem::command("fail", "exit", ["3"]);
        item.action().unwrap();
        let code = item.get_return().unwrap();
        assert_eq!(code.downcast_ref::<i32>(), Some(&3));
    }

    #[cfg(unix)]
    #[test]
    fn command_runs_through_the_shell() {
        let path = std::env::temp_dir().join(format!("tmenu-command-{}.txt", std::process::id()));
        let path_str = path.to_string_lossy().to_string();

        let create = MenuItem::command("create", "echo", ["hello", ">", path_str.as_str()]);
        create.action().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");

        let delete = MenuItem::command("delete", "rm", [path_str.as_str()]);
        delete.action().unwrap();
        assert!(!path.exists());
        assert_eq!(delete.get_return().unwrap().downcast_ref::<i32>(), Some(&0));
    }
}
