//! Scoped terminal color control.

/// Overrides the stderr color setting until dropped.
///
/// The previous setting is restored on drop, including when the scope is
/// left through `?` or a panic.
///
/// # Example
///
/// ```
/// use clinch::ui::ColorScope;
///
/// let before = console::colors_enabled_stderr();
/// {
///     let _scope = ColorScope::stderr(!before);
///     assert_eq!(console::colors_enabled_stderr(), !before);
/// }
/// assert_eq!(console::colors_enabled_stderr(), before);
/// ```
#[derive(Debug)]
#[must_use = "colors are restored as soon as the scope is dropped"]
pub struct ColorScope {
    previous: bool,
}

impl ColorScope {
    /// Set stderr colors to `enabled` for the lifetime of the guard.
    pub fn stderr(enabled: bool) -> Self {
        let previous = console::colors_enabled_stderr();
        console::set_colors_enabled_stderr(enabled);
        Self { previous }
    }
}

impl Drop for ColorScope {
    fn drop(&mut self) {
        console::set_colors_enabled_stderr(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_scopes_restore_in_order() {
        let original = console::colors_enabled_stderr();
        {
            let _outer = ColorScope::stderr(true);
            {
                let _inner = ColorScope::stderr(false);
                assert!(!console::colors_enabled_stderr());
            }
            assert!(console::colors_enabled_stderr());
        }
        assert_eq!(console::colors_enabled_stderr(), original);
    }
}
