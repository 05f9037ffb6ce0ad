//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native;
//! whether a key reaches it (focus, text inputs) is up to the host.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Delete the selected node or edge.
    Delete,
    /// Leave add-edge mode without creating an edge.
    CancelEdge,
    ZoomIn,
    ZoomOut,
    /// Back to 100%.
    ZoomReset,
}

/// Resolves key events into shortcut actions.
///
/// `ctrl` and `meta` are interchangeable so `⌘+` and `Ctrl+` both zoom.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"+"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, ctrl: bool, _shift: bool, alt: bool, meta: bool) -> Option<ShortcutAction> {
        if alt {
            return None;
        }
        let cmd = ctrl || meta;

        // Zoom keys work with or without the command modifier; shift is
        // ignored because `+` needs it on most layouts.
        match key {
            "+" | "=" => return Some(ShortcutAction::ZoomIn),
            "-" | "_" => return Some(ShortcutAction::ZoomOut),
            "0" => return Some(ShortcutAction::ZoomReset),
            _ => {}
        }

        if cmd {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::CancelEdge),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_delete() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
    }

    #[test]
    fn resolve_escape_cancels_edge() {
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::CancelEdge)
        );
    }

    #[test]
    fn resolve_zoom_with_and_without_modifier() {
        assert_eq!(
            ShortcutMap::resolve("+", false, true, false, false),
            Some(ShortcutAction::ZoomIn)
        );
        // Cmd+= → ZoomIn
        assert_eq!(
            ShortcutMap::resolve("=", false, false, false, true),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("-", true, false, false, false),
            Some(ShortcutAction::ZoomOut)
        );
        assert_eq!(
            ShortcutMap::resolve("0", false, false, false, false),
            Some(ShortcutAction::ZoomReset)
        );
    }

    #[test]
    fn modified_delete_is_left_to_the_host() {
        assert_eq!(ShortcutMap::resolve("Delete", false, false, false, true), None);
        assert_eq!(ShortcutMap::resolve("Backspace", true, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("+", false, false, true, false), None);
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("7", false, false, false, false), None);
    }
}
