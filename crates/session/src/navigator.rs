//! Page navigation seam.

use std::sync::{Mutex, PoisonError};

/// Moves the shell between pages.
pub trait Navigator: Send + Sync {
    /// Path of the page currently shown.
    fn current_page(&self) -> String;

    fn navigate(&self, page: &str);
}

/// Navigator that only records where it was sent.
///
/// Used by the CLI, which reports the navigation instead of performing it,
/// and by tests.
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(start.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every page navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_page(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, page: &str) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = page.to_string();
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(page.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_updates_current_page_and_history() {
        let nav = RecordingNavigator::new("/login.html");
        nav.navigate("index.html");
        nav.navigate("select-studio.html");
        assert_eq!(nav.current_page(), "select-studio.html");
        assert_eq!(nav.history(), vec!["index.html", "select-studio.html"]);
    }
}
