// Copyright (c) 2026 rezky_nightky

use crossterm::event::{KeyCode, KeyModifiers};

pub const DIAGNOSTIC_BANNER: &[&str] = &[
    ">> PORTFOLIO CONSOLE ACTIVATED",
    "Available shortcuts:",
    "  G - Trigger glitch effect",
    "  M - Toggle matrix rain",
    "  C - Show this console",
    "  H - Show help",
];

pub const HELP_LINES: &[&str] = &[
    "KEYBOARD SHORTCUTS",
    "",
    "G - Trigger glitch effect",
    "M - Toggle matrix rain",
    "C - Show console banner",
    "H - Show this help",
    "",
    "Click anywhere to close",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutAction {
    TriggerGlitch,
    ToggleRain,
    ShowDiagnostics,
    ShowHelp,
}

/// Global key routing. Events with ctrl or alt held pass through
/// untouched. The help overlay belongs to the router: while it is up,
/// the help key does nothing and the next click dismisses it.
pub struct ShortcutRouter {
    help_visible: bool,
}

impl ShortcutRouter {
    pub fn new() -> Self {
        Self {
            help_visible: false,
        }
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<ShortcutAction> {
        if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        let KeyCode::Char(c) = code else {
            return None;
        };
        match c.to_ascii_lowercase() {
            'g' => Some(ShortcutAction::TriggerGlitch),
            'm' => Some(ShortcutAction::ToggleRain),
            'c' => Some(ShortcutAction::ShowDiagnostics),
            'h' => {
                if self.help_visible {
                    None
                } else {
                    self.help_visible = true;
                    Some(ShortcutAction::ShowHelp)
                }
            }
            _ => None,
        }
    }

    /// Click-to-dismiss for the help overlay. Returns true when a click
    /// consumed the overlay; afterwards clicks route normally again.
    pub fn handle_click(&mut self) -> bool {
        if self.help_visible {
            self.help_visible = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_chords_are_ignored() {
        let mut r = ShortcutRouter::new();
        assert_eq!(r.handle_key(KeyCode::Char('g'), KeyModifiers::CONTROL), None);
        assert_eq!(r.handle_key(KeyCode::Char('m'), KeyModifiers::ALT), None);
        assert_eq!(
            r.handle_key(KeyCode::Char('g'), KeyModifiers::NONE),
            Some(ShortcutAction::TriggerGlitch)
        );
    }

    #[test]
    fn shift_variants_still_match() {
        let mut r = ShortcutRouter::new();
        assert_eq!(
            r.handle_key(KeyCode::Char('M'), KeyModifiers::SHIFT),
            Some(ShortcutAction::ToggleRain)
        );
    }

    #[test]
    fn help_key_does_not_toggle_while_open() {
        let mut r = ShortcutRouter::new();
        assert_eq!(
            r.handle_key(KeyCode::Char('h'), KeyModifiers::NONE),
            Some(ShortcutAction::ShowHelp)
        );
        assert!(r.help_visible());
        assert_eq!(r.handle_key(KeyCode::Char('h'), KeyModifiers::NONE), None);
        assert!(r.help_visible());
    }

    #[test]
    fn click_dismisses_help_and_detaches() {
        let mut r = ShortcutRouter::new();
        r.handle_key(KeyCode::Char('h'), KeyModifiers::NONE);
        assert!(r.handle_click());
        assert!(!r.help_visible());
        assert!(!r.handle_click());
    }

    #[test]
    fn unmapped_keys_do_nothing() {
        let mut r = ShortcutRouter::new();
        assert_eq!(r.handle_key(KeyCode::Char('x'), KeyModifiers::NONE), None);
        assert_eq!(r.handle_key(KeyCode::Enter, KeyModifiers::NONE), None);
    }
}
