pub mod context;
pub mod definition;
pub mod item;
pub mod lifecycle;
pub mod selection;
mod signal;
pub mod viewport;

use std::{
    any::Any,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak},
    thread::{self, JoinHandle, ThreadId},
    time::Duration,
};

use crate::{
    dims::Dims,
    error::MenuError,
    helpers::lock,
    renderer::Surface,
    terminal::Key,
    ui::Rect,
};

use self::{
    signal::{Gate, Latch},
    viewport::CHROME_ROWS,
};

pub use context::MenuContext;
pub use definition::{ItemDefinition, MenuDefinition};
pub use item::{ItemKind, MenuItem};
pub use lifecycle::Lifecycle;
pub use selection::SelectionMenu;

/// Value handed back by a selected item.
pub type Returned = Arc<dyn Any + Send + Sync>;

struct MenuState {
    items: Vec<Arc<MenuItem>>,
    exit_item: Arc<MenuItem>,
    show_exit_option: bool,
    current: usize,
    selected: Option<usize>,
    returned: Option<Returned>,
    surface: Option<Surface>,
    viewport_top: i32,
}

impl MenuState {
    fn has_exit(&self) -> bool {
        self.items
            .last()
            .is_some_and(|item| Arc::ptr_eq(item, &self.exit_item))
    }

    fn add_exit(&mut self) -> bool {
        if self.has_exit() {
            return false;
        }
        self.items.push(self.exit_item.clone());
        true
    }

    fn remove_exit(&mut self) -> bool {
        if !self.has_exit() {
            return false;
        }
        self.items.pop();
        if self.current >= self.items.len() {
            self.current = self.items.len().saturating_sub(1);
        }
        true
    }
}

struct MenuShared {
    ctx: Arc<MenuContext>,
    title: String,
    subtitle: String,
    state: Mutex<MenuState>,
    parent: RwLock<Option<MenuRef>>,
    previous_active: Mutex<Option<MenuRef>>,
    gate: Gate,
    finished: Latch,
    lifecycle: Mutex<Lifecycle>,
    thread: Mutex<Option<JoinHandle<Result<(), MenuError>>>>,
    loop_thread: Mutex<Option<ThreadId>>,
}

/// Marks the loop as over even when it unwinds, so joiners never hang.
struct FinishGuard<'a>(&'a MenuShared);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        *lock(&self.0.lifecycle) = Lifecycle::Stopped;
        self.0.gate.stop();
        self.0.finished.set();
    }
}

/// Non-owning handle to a [`Menu`].
#[derive(Clone, Default)]
pub struct MenuRef(Weak<MenuShared>);

impl MenuRef {
    pub fn upgrade(&self) -> Option<Menu> {
        self.0.upgrade().map(|shared| Menu { shared })
    }
}

impl fmt::Debug for MenuRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.upgrade() {
            Some(shared) => f.debug_tuple("MenuRef").field(&shared.title).finish(),
            None => f.write_str("MenuRef(<dropped>)"),
        }
    }
}

/// A titled list of items drawn in a box, navigated with the arrow keys,
/// digits and Enter. Runs its input loop on its own thread.
///
/// `Menu` is a cheap handle, clones refer to the same menu.
#[derive(Clone)]
pub struct Menu {
    shared: Arc<MenuShared>,
}

impl Menu {
    /// Empty title or subtitle is not drawn.
    pub fn new(ctx: &Arc<MenuContext>, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        let shared = Arc::new_cyclic(|weak| MenuShared {
            ctx: ctx.clone(),
            title: title.into(),
            subtitle: subtitle.into(),
            state: Mutex::new(MenuState {
                items: Vec::new(),
                exit_item: Arc::new(MenuItem::exit(MenuRef(weak.clone()))),
                show_exit_option: ctx.show_exit_option(),
                current: 0,
                selected: None,
                returned: None,
                surface: None,
                viewport_top: 0,
            }),
            parent: RwLock::new(None),
            previous_active: Mutex::new(None),
            gate: Gate::default(),
            finished: Latch::default(),
            lifecycle: Mutex::new(Lifecycle::Created),
            thread: Mutex::new(None),
            loop_thread: Mutex::new(None),
        });

        Menu { shared }
    }

    pub fn with_exit_option(self, show_exit_option: bool) -> Self {
        self.set_show_exit_option(show_exit_option);
        self
    }

    /// Whether the exit item is shown when started without an override.
    pub fn set_show_exit_option(&self, show_exit_option: bool) {
        self.lock_state().show_exit_option = show_exit_option;
    }

    pub fn downgrade(&self) -> MenuRef {
        MenuRef(Arc::downgrade(&self.shared))
    }

    pub fn context(&self) -> &Arc<MenuContext> {
        &self.shared.ctx
    }

    pub fn title(&self) -> &str {
        &self.shared.title
    }

    pub fn subtitle(&self) -> &str {
        &self.shared.subtitle
    }

    pub fn parent(&self) -> Option<Menu> {
        self.shared
            .parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(MenuRef::upgrade)
    }

    pub fn set_parent(&self, parent: Option<&Menu>) {
        *self
            .shared
            .parent
            .write()
            .unwrap_or_else(PoisonError::into_inner) = parent.map(Menu::downgrade);
    }

    fn lock_state(&self) -> MutexGuard<MenuState> {
        lock(&self.shared.state)
    }

    fn lifecycle(&self) -> MutexGuard<Lifecycle> {
        lock(&self.shared.lifecycle)
    }

    pub fn state(&self) -> Lifecycle {
        *self.lifecycle()
    }

    pub fn items(&self) -> Vec<Arc<MenuItem>> {
        self.lock_state().items.clone()
    }

    pub fn items_len(&self) -> usize {
        self.lock_state().items.len()
    }

    pub fn has_exit(&self) -> bool {
        self.lock_state().has_exit()
    }

    pub fn current_index(&self) -> usize {
        self.lock_state().current
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.lock_state().selected
    }

    pub fn current_item(&self) -> Option<Arc<MenuItem>> {
        let state = self.lock_state();
        state.items.get(state.current).cloned()
    }

    pub fn selected_item(&self) -> Option<Arc<MenuItem>> {
        let state = self.lock_state();
        state.selected.and_then(|i| state.items.get(i)).cloned()
    }

    pub fn returned_value(&self) -> Option<Returned> {
        self.lock_state().returned.clone()
    }

    /// The returned value, if there is one of type `T`.
    pub fn returned_as<T: Any + Clone>(&self) -> Option<T> {
        self.returned_value()?.downcast_ref::<T>().cloned()
    }

    /// First surface row shown by the last draw.
    pub fn viewport_top(&self) -> i32 {
        self.lock_state().viewport_top
    }

    /// Adds `item` in front of the exit item and redraws if the menu is on
    /// screen.
    pub fn append_item(&self, mut item: MenuItem) -> Result<Arc<MenuItem>, MenuError> {
        item.menu = self.downgrade();
        if let ItemKind::Submenu(submenu) = item.kind() {
            submenu.set_parent(Some(self));
        }
        let item = Arc::new(item);

        let mut state = self.lock_state();
        let had_exit = state.remove_exit();
        state.items.push(item.clone());
        if had_exit {
            state.add_exit();
        }
        self.draw_locked(&mut state)?;

        Ok(item)
    }

    /// Returns `true` if the exit item had to be added.
    pub fn add_exit(&self) -> bool {
        self.lock_state().add_exit()
    }

    /// Returns `true` if the exit item had to be removed.
    pub fn remove_exit(&self) -> bool {
        self.lock_state().remove_exit()
    }

    /// Spawns the input loop and returns right away. `show_exit_option`
    /// overrides the menu's own setting for this run.
    pub fn start(&self, show_exit_option: Option<bool>) -> Result<(), MenuError> {
        {
            let mut lifecycle = self.lifecycle();
            if lifecycle.is_active() {
                log::warn!("Menu {:?} started while {:?}", self.title(), *lifecycle);
                return Err(MenuError::AlreadyRunning);
            }
            *lifecycle = Lifecycle::Starting;
        }

        let previous = lock(&self.shared.thread).take();
        if let Some(handle) = previous {
            if let Ok(Err(err)) = handle.join() {
                log::warn!("Previous run of {:?} ended with: {}", self.title(), err);
            }
        }

        *lock(&self.shared.previous_active) = self.shared.ctx.take_active();
        self.shared.gate.reset();
        self.shared.finished.reset();

        {
            let mut state = self.lock_state();
            if show_exit_option.unwrap_or(state.show_exit_option) {
                state.add_exit();
            } else {
                state.remove_exit();
            }
        }

        let menu = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("menu {}", self.title()))
            .spawn(move || menu.run());

        match spawned {
            Ok(handle) => {
                *lock(&self.shared.thread) = Some(handle);
                log::debug!("Menu {:?} started", self.title());
                Ok(())
            }
            Err(err) => {
                self.shared
                    .ctx
                    .set_active(lock(&self.shared.previous_active).take());
                drop(FinishGuard(&self.shared));
                Err(err.into())
            }
        }
    }

    /// [`Menu::start`] followed by a blocking [`Menu::join`].
    pub fn show(&self, show_exit_option: Option<bool>) -> Result<(), MenuError> {
        self.start(show_exit_option)?;
        self.join(None).map(|_| ())
    }

    fn run(self) -> Result<(), MenuError> {
        *lock(&self.shared.loop_thread) = Some(thread::current().id());
        let _finish = FinishGuard(&self.shared);
        let root = self.parent().is_none();

        let result = self.main_loop(root);
        if let Err(err) = &result {
            log::error!("Menu {:?} failed: {}", self.title(), err);
        }

        *self.lifecycle() = Lifecycle::Exiting;
        let teardown = self.teardown(root);
        result.and(teardown)
    }

    fn main_loop(&self, root: bool) -> Result<(), MenuError> {
        let ctx = &self.shared.ctx;

        if root {
            ctx.terminal()?.enter()?;
        }

        let size = ctx.terminal()?.size()?;
        {
            let mut state = self.lock_state();
            let rows = state.items.len() as i32 + CHROME_ROWS;
            state.surface = Some(Surface::new(Dims(size.0, rows)));
        }
        ctx.terminal()?.set_cursor_visible(false)?;
        self.draw()?;

        ctx.set_active(Some(self.downgrade()));
        *self.lifecycle() = Lifecycle::Running;
        self.shared.gate.set_running(true);
        log::debug!("Menu {:?} is running", self.title());

        while self.shared.gate.wait_running() {
            let key = ctx.terminal()?.read_key(ctx.poll_interval())?;
            if let Some(key) = key {
                self.process_key(key)?;
            }
        }

        Ok(())
    }

    fn teardown(&self, root: bool) -> Result<(), MenuError> {
        let ctx = &self.shared.ctx;
        ctx.set_active(None);

        {
            let mut state = self.lock_state();
            if let Some(surface) = state.surface.as_mut() {
                surface.clear();
            }
            state.surface = None;
        }

        let released = if root { self.release_terminal() } else { Ok(()) };

        ctx.set_active(lock(&self.shared.previous_active).take());
        log::debug!("Menu {:?} stopped", self.title());

        released
    }

    fn release_terminal(&self) -> Result<(), MenuError> {
        let mut terminal = self.shared.ctx.terminal()?;
        terminal.clear()?;
        terminal.set_cursor_visible(true)?;
        terminal.leave()?;
        Ok(())
    }

    fn process_key(&self, key: Key) -> Result<(), MenuError> {
        match key {
            Key::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < self.items_len() {
                    self.go_to(index)?;
                }
            }
            Key::Down => self.go_down()?,
            Key::Up => self.go_up()?,
            Key::Enter => self.select()?,
            Key::Back => {
                log::debug!("Leaving {:?}", self.title());
                self.shared.gate.request_exit();
            }
            Key::Interrupt => {
                log::info!("Interrupted in {:?}", self.title());
                let mut menu = Some(self.clone());
                while let Some(m) = menu {
                    m.shared.gate.request_exit();
                    menu = m.parent();
                }
            }
            Key::Resize(size) => {
                log::trace!("Terminal resized to {:?}", size);
                self.draw()?;
            }
            key => log::trace!("Ignoring {:?} in {:?}", key, self.title()),
        }
        Ok(())
    }

    /// Blocks while paused, wakes up if the menu is asked to exit.
    pub fn pause(&self) {
        self.shared.gate.set_running(false);
        let mut lifecycle = self.lifecycle();
        if *lifecycle == Lifecycle::Running {
            *lifecycle = Lifecycle::Paused;
        }
        log::debug!("Menu {:?} paused", self.title());
    }

    /// Makes this the active menu and lets its loop continue.
    pub fn resume(&self) {
        self.shared.ctx.set_active(Some(self.downgrade()));
        {
            let mut lifecycle = self.lifecycle();
            if *lifecycle == Lifecycle::Paused {
                *lifecycle = Lifecycle::Running;
            }
        }
        self.shared.gate.set_running(true);
        log::debug!("Menu {:?} resumed", self.title());
    }

    pub fn is_running(&self) -> bool {
        self.shared.gate.is_running()
    }

    /// Returns whether the menu was seen running before `timeout`.
    pub fn wait_for_start(&self, timeout: Option<Duration>) -> bool {
        self.shared.gate.wait_started(timeout)
    }

    /// Whether the loop thread is still going. Always `false`, with a
    /// warning, for a menu that was never started.
    pub fn is_alive(&self) -> bool {
        if self.state() == Lifecycle::Created {
            log::warn!("is_alive called on {:?} before start", self.title());
            return false;
        }
        !self.shared.finished.is_set()
    }

    fn on_loop_thread(&self) -> bool {
        *lock(&self.shared.loop_thread) == Some(thread::current().id())
    }

    /// Waits for the loop to end. `Ok(false)` means the timeout elapsed
    /// first. Errors of the loop itself, including a failing item, are
    /// returned here.
    pub fn join(&self, timeout: Option<Duration>) -> Result<bool, MenuError> {
        if self.state() == Lifecycle::Created {
            return Err(MenuError::NotStarted);
        }
        if self.on_loop_thread() {
            log::warn!("Menu {:?} can't join its own loop", self.title());
            return Ok(false);
        }
        if !self.shared.finished.wait(timeout) {
            return Ok(false);
        }

        // the first joiner gets the loop's result
        let handle = lock(&self.shared.thread).take();
        match handle {
            Some(handle) => match handle.join() {
                Ok(result) => result.map(|()| true),
                Err(_) => Err(MenuError::LoopPanicked),
            },
            None => Ok(true),
        }
    }

    /// Asks the loop to end and waits for it. From inside the loop, e.g. an
    /// item action, only the request is made.
    pub fn exit(&self) -> Result<(), MenuError> {
        self.shared.gate.request_exit();
        if self.on_loop_thread() {
            return Ok(());
        }
        self.join(None).map(|_| ())
    }

    pub fn go_to(&self, index: usize) -> Result<(), MenuError> {
        let mut state = self.lock_state();
        if index >= state.items.len() {
            return Ok(());
        }
        state.current = index;
        self.draw_locked(&mut state)
    }

    /// Moves the highlight down, wrapping to the first item.
    pub fn go_down(&self) -> Result<(), MenuError> {
        let mut state = self.lock_state();
        let len = state.items.len();
        if len == 0 {
            return Ok(());
        }
        state.current = if state.current + 1 < len {
            state.current + 1
        } else {
            0
        };
        self.draw_locked(&mut state)
    }

    /// Moves the highlight up, wrapping to the last item.
    pub fn go_up(&self) -> Result<(), MenuError> {
        let mut state = self.lock_state();
        let len = state.items.len();
        if len == 0 {
            return Ok(());
        }
        state.current = if state.current > 0 {
            state.current - 1
        } else {
            len - 1
        };
        self.draw_locked(&mut state)
    }

    /// Runs the current item and stores what it returns.
    pub fn select(&self) -> Result<(), MenuError> {
        let item = {
            let mut state = self.lock_state();
            let Some(item) = state.items.get(state.current).cloned() else {
                return Ok(());
            };
            state.selected = Some(state.current);
            item
        };
        log::debug!("Selected {:?} in {:?}", item.text(), self.title());

        // the state lock is free here, items may draw or nest other menus
        item.set_up()?;
        item.action()?;
        item.clean_up()?;

        let returned = item.get_return();
        self.lock_state().returned = returned;

        if item.terminates_menu() {
            self.shared.gate.request_exit();
            Ok(())
        } else {
            self.draw()
        }
    }

    pub fn clear_screen(&self) {
        if let Some(surface) = self.lock_state().surface.as_mut() {
            surface.clear();
        }
    }

    /// Redraws the menu. Does nothing while the menu isn't on screen.
    pub fn draw(&self) -> Result<(), MenuError> {
        let mut state = self.lock_state();
        self.draw_locked(&mut state)
    }

    fn draw_locked(&self, state: &mut MenuState) -> Result<(), MenuError> {
        let MenuState {
            items,
            current,
            surface,
            viewport_top,
            ..
        } = state;
        let Some(surface) = surface.as_mut() else {
            return Ok(());
        };

        let mut terminal = self.shared.ctx.terminal()?;
        let screen = terminal.size()?;
        let styles = self.shared.ctx.styles();

        surface.resize(Dims(screen.0, items.len() as i32 + CHROME_ROWS));
        surface.clear();
        surface.border(styles.normal);

        if !self.title().is_empty() {
            surface.add_text(Dims(2, 2), self.title(), styles.title());
        }
        if !self.subtitle().is_empty() {
            surface.add_text(Dims(2, 4), self.subtitle(), styles.subtitle());
        }
        for (index, item) in items.iter().enumerate() {
            surface.add_text(
                Dims(4, 5 + index as i32),
                &item.show(index),
                styles.item(index == *current),
            );
        }

        *viewport_top = viewport::top_row(items.len(), *current, screen.1);
        terminal.refresh_region(surface, *viewport_top, Rect::sized(screen))?;
        Ok(())
    }
}

impl PartialEq for Menu {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Menu {}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}. {} items",
            self.title(),
            self.subtitle(),
            self.items_len()
        )
    }
}
