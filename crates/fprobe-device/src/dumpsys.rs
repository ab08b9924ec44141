//! Parsers for `dumpsys` output
//!
//! `dumpsys window windows` lists one header per window, optionally followed
//! by an attachment line:
//!
//! ```text
//!   Window #3 Window{e5f6a7b u0 PopupWindow:1234}:
//!     mAttachedWindow=Window{a1b2c3d u0 com.example/com.example.MainActivity} mLayoutAttached=true
//! ```
//!
//! `dumpsys activity activities` lists activity records, each followed by its
//! process name:
//!
//! ```text
//!     * ActivityRecord{5c3a1f0 u0 com.example/.MainActivity t12}
//!       packageName=com.example processName=com.example
//! ```

use std::sync::LazyLock;

use regex::Regex;

use fprobe_core::{Activity, Window};

/// `Window #N Window{hash uX title}:`
static WINDOW_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Window #\d+ Window\{(\w+) u\d+ (.*)\}:\s*$")
        .expect("Invalid window header regex")
});

/// `mAttachedWindow=Window{hash uX title}`
static ATTACHED_WINDOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"mAttachedWindow=Window\{(\w+) u\d+ ([^}]*)\}")
        .expect("Invalid attached window regex")
});

/// `ActivityRecord{hash uX package/component tN}`
static ACTIVITY_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ActivityRecord\{\w+ u\d+ ([\w.]+)/([\w.$]+)").expect("Invalid activity regex")
});

static PROCESS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bprocessName=(\S+)").expect("Invalid process name regex"));

/// Expand an Android component name to a class name.
///
/// - `com.example/.MainActivity` -> `com.example.MainActivity`
/// - `com.example/org.lib.Activity` -> `org.lib.Activity`
/// - Anything without a `/` is returned unchanged.
pub fn component_class(component: &str) -> String {
    match component.split_once('/') {
        Some((package, class)) if class.starts_with('.') => format!("{package}{class}"),
        Some((_, class)) => class.to_string(),
        None => component.to_string(),
    }
}

struct RawWindow {
    hashcode: String,
    title: String,
    attached: Option<(String, String)>,
}

/// Parse `dumpsys window windows` output into windows in window manager order.
///
/// Attachments are resolved against the parsed list by hashcode; when the
/// host is not listed, the attachment line's own description is used.
pub fn parse_windows(output: &str) -> Vec<Window> {
    let mut raw: Vec<RawWindow> = Vec::new();

    for line in output.lines() {
        if let Some(caps) = WINDOW_HEADER.captures(line) {
            raw.push(RawWindow {
                hashcode: caps[1].to_string(),
                title: component_class(caps[2].trim()),
                attached: None,
            });
        } else if let Some(caps) = ATTACHED_WINDOW.captures(line) {
            if let Some(current) = raw.last_mut() {
                current.attached = Some((caps[1].to_string(), component_class(caps[2].trim())));
            }
        }
    }

    raw.iter()
        .map(|w| {
            let window = Window::new(w.hashcode.clone(), w.title.clone());
            match &w.attached {
                Some((hash, title)) => {
                    let host = raw
                        .iter()
                        .find(|candidate| candidate.hashcode == *hash)
                        .map(|h| Window::new(h.hashcode.clone(), h.title.clone()))
                        .unwrap_or_else(|| Window::new(hash.clone(), title.clone()));
                    window.attached_to(host)
                }
                None => window,
            }
        })
        .collect()
}

/// Parse `dumpsys activity activities` output.
///
/// An activity is listed once even if several sections mention it. Records
/// without a `processName=` line default to their package name.
pub fn parse_activities(output: &str) -> Vec<Activity> {
    let mut activities: Vec<Activity> = Vec::new();
    let mut current: Option<usize> = None;

    for line in output.lines() {
        if let Some(caps) = ACTIVITY_RECORD.captures(line) {
            let package = &caps[1];
            let name = component_class(&format!("{}/{}", package, &caps[2]));

            current = match activities.iter().position(|a| a.name == name) {
                Some(index) => Some(index),
                None => {
                    activities.push(Activity::new(name, package));
                    Some(activities.len() - 1)
                }
            };
        } else if let Some(caps) = PROCESS_NAME.captures(line) {
            if let Some(activity) = current.and_then(|i| activities.get_mut(i)) {
                activity.process_name = caps[1].to_string();
            }
        }
    }

    activities
}
