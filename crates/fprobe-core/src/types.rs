//! Android window and activity domain types

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier of the system status bar window.
pub const STATUS_BAR: &str = "StatusBar";

/// Process that hosts the status bar and other system UI windows.
pub const SYSTEM_UI_PROCESS: &str = "com.android.systemui";

/// Window hashcodes as printed by `dumpsys window` (6 to 8 word characters).
static HASHCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w{6,8}$").expect("Invalid window hashcode regex"));

/// An on-screen window as reported by the window manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    /// Identity hashcode, e.g. `"a1b2c3d"`
    pub hashcode: String,

    /// Window title; for activity windows this is the activity class name
    pub title: String,

    /// The window this one is attached to (popups, dialogs, IME panels).
    ///
    /// A snapshot of a sibling in the same window list, not an owner. When
    /// present it is the window whose content actually hosts this one.
    #[serde(default)]
    pub attached_window: Option<Box<Window>>,
}

impl Window {
    pub fn new(hashcode: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            hashcode: hashcode.into(),
            title: title.into(),
            attached_window: None,
        }
    }

    /// Builder: attach this window to `host`.
    pub fn attached_to(mut self, host: Window) -> Self {
        self.attached_window = Some(Box::new(host));
        self
    }

    /// The window hosting this one's content: the attachment if any, else self.
    ///
    /// Follows exactly one hop.
    pub fn host(&self) -> &Window {
        self.attached_window.as_deref().unwrap_or(self)
    }

    /// Whether this window is selected by `key`.
    pub fn matches(&self, key: &WindowKey) -> bool {
        match key {
            WindowKey::Hashcode(hash) => self.hashcode == *hash,
            WindowKey::Title(title) => self.title == *title,
        }
    }
}

/// A running activity and the process that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Fully qualified activity class name
    pub name: String,

    /// Owning process, usually the package name (`com.example.app`)
    pub process_name: String,
}

impl Activity {
    pub fn new(name: impl Into<String>, process_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            process_name: process_name.into(),
        }
    }
}

/// What a caller hands to window-to-process resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowTarget {
    /// A window obtained earlier from a window list
    Window(Window),
    /// A hashcode, a title, or the `StatusBar` sentinel
    Identifier(String),
}

impl From<Window> for WindowTarget {
    fn from(window: Window) -> Self {
        WindowTarget::Window(window)
    }
}

impl From<&str> for WindowTarget {
    fn from(identifier: &str) -> Self {
        WindowTarget::Identifier(identifier.to_string())
    }
}

impl From<String> for WindowTarget {
    fn from(identifier: String) -> Self {
        WindowTarget::Identifier(identifier)
    }
}

/// How an identifier string selects a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowKey {
    Hashcode(String),
    Title(String),
}

impl WindowKey {
    /// Classify an identifier: hashcode-shaped tokens match on hashcode only,
    /// anything else matches on title.
    pub fn classify(identifier: &str) -> Self {
        if HASHCODE_PATTERN.is_match(identifier) {
            WindowKey::Hashcode(identifier.to_string())
        } else {
            WindowKey::Title(identifier.to_string())
        }
    }

    pub fn is_hashcode(&self) -> bool {
        matches!(self, WindowKey::Hashcode(_))
    }
}
