//! # Debugger Options
//!
//! Process-wide display options consulted by the visualizer.
//!
//! The options are owned by the host integration and may be flipped at any time
//! from its settings UI, while many visualizations read them concurrently from
//! evaluation threads. Each option is therefore an atomic and reads never lock.
//!
//! ## Environment Variables
//!
//! - `PYVIEW_SHOW_VIEW_NODES`: `1|true|yes|on` or `0|false|no|off` (default: on)

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;

/// Environment variable controlling [`DebuggerOptions::show_python_view_nodes`].
pub const SHOW_VIEW_NODES_ENV: &str = "PYVIEW_SHOW_VIEW_NODES";

static GLOBAL: Lazy<DebuggerOptions> = Lazy::new(DebuggerOptions::from_env);

/// Display options shared by every visualization in the process.
#[derive(Debug)]
pub struct DebuggerOptions
{
    show_python_view_nodes: AtomicBool,
}

impl Default for DebuggerOptions
{
    fn default() -> Self
    {
        Self::new(true)
    }
}

impl DebuggerOptions
{
    /// Create options with an explicit `[Python view]` node setting.
    #[must_use]
    pub const fn new(show_python_view_nodes: bool) -> Self
    {
        Self {
            show_python_view_nodes: AtomicBool::new(show_python_view_nodes),
        }
    }

    /// Build options from the environment, falling back to defaults for unset
    /// or unparseable values.
    #[must_use]
    pub fn from_env() -> Self
    {
        let show = env::var(SHOW_VIEW_NODES_ENV)
            .ok()
            .and_then(|value| parse_flag(&value))
            .unwrap_or(true);
        Self::new(show)
    }

    /// The shared instance, initialized from the environment on first use.
    pub fn global() -> &'static DebuggerOptions
    {
        &GLOBAL
    }

    /// Whether native objects should get an extra `[Python view]` child node.
    pub fn show_python_view_nodes(&self) -> bool
    {
        self.show_python_view_nodes.load(Ordering::Relaxed)
    }

    /// Change the `[Python view]` node setting.
    pub fn set_show_python_view_nodes(&self, show: bool)
    {
        self.show_python_view_nodes.store(show, Ordering::Relaxed);
    }
}

/// Parse a boolean option value. Returns `None` for anything unrecognized.
pub fn parse_flag(value: &str) -> Option<bool>
{
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_flag()
    {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_default_shows_view_nodes()
    {
        assert!(DebuggerOptions::default().show_python_view_nodes());
    }

    #[test]
    fn test_toggle_view_nodes()
    {
        let options = DebuggerOptions::new(true);
        options.set_show_python_view_nodes(false);
        assert!(!options.show_python_view_nodes());
        options.set_show_python_view_nodes(true);
        assert!(options.show_python_view_nodes());
    }
}
