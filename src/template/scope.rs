//! Theme-scoped binding resolution
//!
//! While a [`ScopeGuard`] is alive, the render engine resolves templates
//! against the site's current theme instead of the theme of the request
//! that is doing the rendering (an admin theme, for example).

use std::cell::Cell;
use std::rc::Rc;

/// Toggle for theme-scoped resolution, shared by one request's services
///
/// Enabling nests: the scope stays on until every guard has been dropped.
#[derive(Debug, Clone, Default)]
pub struct ThemeScope {
    depth: Rc<Cell<usize>>,
}

impl ThemeScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn theme-scoped resolution on until the returned guard is dropped
    pub fn enable(&self) -> ScopeGuard {
        self.depth.set(self.depth.get() + 1);
        ScopeGuard {
            depth: Rc::clone(&self.depth),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.depth.get() > 0
    }
}

/// Keeps theme-scoped resolution enabled.
#[must_use = "the scope is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    depth: Rc<Cell<usize>>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let prev = self.depth.get();
        debug_assert!(prev > 0, "theme scope underflow");
        self.depth.set(prev.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let scope = ThemeScope::new();
        assert!(!scope.is_enabled());
        {
            let _guard = scope.enable();
            assert!(scope.is_enabled());
        }
        assert!(!scope.is_enabled());
    }

    #[test]
    fn test_nested_guards() {
        let scope = ThemeScope::new();
        let outer = scope.enable();
        let inner = scope.clone().enable();
        drop(outer);
        assert!(scope.is_enabled());
        drop(inner);
        assert!(!scope.is_enabled());
    }

    #[test]
    fn test_guard_releases_on_error_path() {
        fn failing(scope: &ThemeScope) -> Result<(), String> {
            let _guard = scope.enable();
            "boom".parse::<u32>().map_err(|e| e.to_string())?;
            Ok(())
        }
        let scope = ThemeScope::new();
        assert!(failing(&scope).is_err());
        assert!(!scope.is_enabled());
    }
}
