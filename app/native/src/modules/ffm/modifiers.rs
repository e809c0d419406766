//! Keyboard modifier masks and bypass-modifier parsing.
//!
//! The bits match the macOS `CGEventFlags` device-independent masks so the
//! flags read from a Core Graphics event can be wrapped without translation.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u64 {
        /// Shift key (⇧). `kCGEventFlagMaskShift`.
        const SHIFT = 0x0002_0000;
        /// Control key (^). `kCGEventFlagMaskControl`.
        const CTRL = 0x0004_0000;
        /// Option/Alt key (⌥). `kCGEventFlagMaskAlternate`.
        const ALT = 0x0008_0000;
        /// Command key (⌘). `kCGEventFlagMaskCommand`.
        const CMD = 0x0010_0000;
        /// Function key (fn). `kCGEventFlagMaskSecondaryFn`.
        const FN = 0x0080_0000;

        // Other CGEventFlags bits (caps lock, numeric pad, ...) are carried through untouched.
        const _ = !0;
    }
}

impl Modifiers {
    /// Maps a single configuration token to its modifier bit.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "fn" => Some(Self::FN),
            "shift" => Some(Self::SHIFT),
            "alt" => Some(Self::ALT),
            "cmd" => Some(Self::CMD),
            "ctrl" => Some(Self::CTRL),
            _ => None,
        }
    }

    /// Returns whether every modifier in `mask` is held.
    ///
    /// An empty mask is never considered held.
    #[must_use]
    pub fn holds_all(self, mask: Self) -> bool { !mask.is_empty() && self.contains(mask) }
}

/// Parses the bypass-modifier configuration string into a mask.
///
/// Tokens are separated by whitespace, `+`, `,` or `|`. Unknown tokens are
/// ignored. When nothing matches (including an empty string) the mask
/// defaults to `fn`.
#[must_use]
pub fn parse_bypass_modifiers(value: &str) -> Modifiers {
    let mask = value
        .split(|c: char| c.is_whitespace() || matches!(c, '+' | ',' | '|'))
        .filter(|token| !token.is_empty())
        .filter_map(Modifiers::from_token)
        .fold(Modifiers::empty(), |mask, bit| mask | bit);

    if mask.is_empty() { Modifiers::FN } else { mask }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token() {
        assert_eq!(parse_bypass_modifiers("cmd"), Modifiers::CMD);
        assert_eq!(parse_bypass_modifiers("shift"), Modifiers::SHIFT);
    }

    #[test]
    fn test_tokens_are_unioned() {
        assert_eq!(parse_bypass_modifiers("alt shift"), Modifiers::ALT | Modifiers::SHIFT);
        assert_eq!(parse_bypass_modifiers("ctrl+cmd"), Modifiers::CTRL | Modifiers::CMD);
        assert_eq!(parse_bypass_modifiers(" fn , alt "), Modifiers::FN | Modifiers::ALT);
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        assert_eq!(parse_bypass_modifiers("hyper cmd meta"), Modifiers::CMD);
    }

    #[test]
    fn test_empty_defaults_to_fn() {
        assert_eq!(parse_bypass_modifiers(""), Modifiers::FN);
        assert_eq!(parse_bypass_modifiers("   "), Modifiers::FN);
        assert_eq!(parse_bypass_modifiers("super hyper"), Modifiers::FN);
    }

    #[test]
    fn test_tokens_are_case_insensitive() {
        assert_eq!(parse_bypass_modifiers("CMD Shift"), Modifiers::CMD | Modifiers::SHIFT);
    }

    #[test]
    fn test_bits_match_cg_event_flags() {
        assert_eq!(Modifiers::SHIFT.bits(), 0x0002_0000);
        assert_eq!(Modifiers::CTRL.bits(), 0x0004_0000);
        assert_eq!(Modifiers::ALT.bits(), 0x0008_0000);
        assert_eq!(Modifiers::CMD.bits(), 0x0010_0000);
        assert_eq!(Modifiers::FN.bits(), 0x0080_0000);
    }

    #[test]
    fn test_holds_all() {
        let held = Modifiers::CMD | Modifiers::SHIFT;
        assert!(held.holds_all(Modifiers::CMD));
        assert!(held.holds_all(Modifiers::CMD | Modifiers::SHIFT));
        assert!(!held.holds_all(Modifiers::CMD | Modifiers::ALT));
        assert!(!held.holds_all(Modifiers::empty()));
    }

    #[test]
    fn test_unknown_flag_bits_are_preserved() {
        // Caps lock (kCGEventFlagMaskAlphaShift) plus command.
        let raw = Modifiers::from_bits_retain(0x0001_0000 | 0x0010_0000);
        assert!(raw.holds_all(Modifiers::CMD));
        assert_eq!(raw.bits(), 0x0011_0000);
    }
}
