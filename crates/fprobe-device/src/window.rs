//! Window-to-process resolution
//!
//! Maps an on-screen window to the process that owns its content. Popups and
//! dialogs are attached to another window; the attachment is followed once so
//! they resolve to their host activity's process.

use fprobe_core::prelude::*;
use fprobe_core::{Activity, Window, WindowKey, WindowTarget, STATUS_BAR, SYSTEM_UI_PROCESS};

use crate::source::{ActivityProvider, WindowProvider};

/// Resolve `target` against already-fetched window and activity lists.
///
/// Returns `Ok(None)` when the window exists but no activity is named after
/// it (system windows, toasts).
///
/// # Errors
///
/// [`Error::WindowNotFound`] when an identifier matches no window.
pub fn resolve_process(
    windows: &[Window],
    activities: &[Activity],
    target: &WindowTarget,
) -> Result<Option<String>> {
    let window = match target {
        WindowTarget::Window(window) => window.host(),
        WindowTarget::Identifier(id) if id == STATUS_BAR => {
            return Ok(Some(SYSTEM_UI_PROCESS.to_string()));
        }
        WindowTarget::Identifier(id) => find_window(windows, id)?.host(),
    };

    Ok(process_of(activities, window))
}

/// Resolve `target`, fetching windows and activities from the device.
///
/// The window list is only fetched when `target` is an identifier other
/// than the status bar.
pub async fn window_process<W, A>(
    windows: &W,
    activities: &A,
    target: &WindowTarget,
) -> Result<Option<String>>
where
    W: WindowProvider,
    A: ActivityProvider,
{
    let window_list = match target {
        WindowTarget::Identifier(id) if id == STATUS_BAR => {
            debug!("{} is hosted by {}", STATUS_BAR, SYSTEM_UI_PROCESS);
            return Ok(Some(SYSTEM_UI_PROCESS.to_string()));
        }
        WindowTarget::Identifier(_) => windows.list_windows().await?,
        WindowTarget::Window(_) => Vec::new(),
    };
    let activity_list = activities.list_activities().await?;

    let process = resolve_process(&window_list, &activity_list, target)?;
    match &process {
        Some(name) => debug!("Window {:?} belongs to {}", target, name),
        None => debug!("No activity hosts window {:?}", target),
    }
    Ok(process)
}

fn find_window<'a>(windows: &'a [Window], identifier: &str) -> Result<&'a Window> {
    let key = WindowKey::classify(identifier);
    windows
        .iter()
        .find(|w| w.matches(&key))
        .ok_or_else(|| Error::window_not_found(identifier))
}

fn process_of(activities: &[Activity], window: &Window) -> Option<String> {
    activities
        .iter()
        .find(|a| a.name == window.title)
        .map(|a| a.process_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeDevice;

    fn main_window() -> Window {
        Window::new("a1b2c3d", "com.example.MainActivity")
    }

    fn activities() -> Vec<Activity> {
        vec![
            Activity::new("com.example.SettingsActivity", "com.example:settings"),
            Activity::new("com.example.MainActivity", "com.example"),
        ]
    }

    #[test]
    fn test_status_bar_skips_window_list() {
        let process = resolve_process(&[], &[], &WindowTarget::from(STATUS_BAR)).unwrap();
        assert_eq!(process.as_deref(), Some("com.android.systemui"));
    }

    #[test]
    fn test_resolve_by_title() {
        let windows = vec![main_window()];
        let process = resolve_process(
            &windows,
            &activities(),
            &WindowTarget::from("com.example.MainActivity"),
        )
        .unwrap();
        assert_eq!(process.as_deref(), Some("com.example"));
    }

    #[test]
    fn test_resolve_by_hashcode_follows_attachment() {
        let popup = Window::new("e5f6a7b", "PopupWindow:1234").attached_to(main_window());
        let windows = vec![main_window(), popup];
        let process =
            resolve_process(&windows, &activities(), &WindowTarget::from("e5f6a7b")).unwrap();
        assert_eq!(process.as_deref(), Some("com.example"));
    }

    #[test]
    fn test_resolve_window_handle_follows_attachment() {
        let popup = Window::new("e5f6a7b", "PopupWindow:1234").attached_to(main_window());
        let process = resolve_process(&[], &activities(), &WindowTarget::from(popup)).unwrap();
        assert_eq!(process.as_deref(), Some("com.example"));
    }

    #[test]
    fn test_hashcode_shaped_token_never_matches_title() {
        // "Dialog" is 6 word characters, so it is looked up as a hashcode
        let windows = vec![Window::new("a1b2c3d", "Dialog")];
        let err = resolve_process(&windows, &activities(), &WindowTarget::from("Dialog"))
            .unwrap_err();
        assert!(matches!(err, Error::WindowNotFound { ref identifier } if identifier == "Dialog"));
    }

    #[test]
    fn test_first_match_wins() {
        let windows = vec![
            Window::new("1111111", "com.example.MainActivity"),
            Window::new("2222222", "com.example.MainActivity")
                .attached_to(Window::new("3333333", "com.example.SettingsActivity")),
        ];
        let process = resolve_process(
            &windows,
            &activities(),
            &WindowTarget::from("com.example.MainActivity"),
        )
        .unwrap();
        assert_eq!(process.as_deref(), Some("com.example"));
    }

    #[test]
    fn test_unknown_activity_is_none() {
        let windows = vec![Window::new("a1b2c3d", "InputMethod")];
        let process =
            resolve_process(&windows, &activities(), &WindowTarget::from("a1b2c3d")).unwrap();
        assert_eq!(process, None);
    }

    #[test]
    fn test_missing_window_is_error() {
        let err = resolve_process(&[main_window()], &activities(), &WindowTarget::from("ffffff"))
            .unwrap_err();
        assert!(err.to_string().contains("ffffff"));
    }

    #[tokio::test]
    async fn test_window_process_uses_providers() {
        let device = FakeDevice::new()
            .with_windows(vec![main_window()])
            .with_activities(activities());
        let process = window_process(&device, &device, &WindowTarget::from("a1b2c3d"))
            .await
            .unwrap();
        assert_eq!(process.as_deref(), Some("com.example"));
    }

    #[tokio::test]
    async fn test_window_process_status_bar() {
        let device = FakeDevice::new();
        let process = window_process(&device, &device, &WindowTarget::from(STATUS_BAR))
            .await
            .unwrap();
        assert_eq!(process.as_deref(), Some(SYSTEM_UI_PROCESS));
    }
}
