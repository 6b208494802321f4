pub mod constants;

use std::path::Path;

/// Returns the lowercase extension of `path`, if there is one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

pub fn is_release(kind: crossterm::event::KeyEventKind) -> bool {
    kind == crossterm::event::KeyEventKind::Release
}

/// Locks `mutex`, ignoring poisoning. For state that stays consistent even
/// when a holder panicked.
pub fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
