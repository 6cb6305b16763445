//! Physical key code → logical character under the active keyboard layout.
//!
//! A physical key code names a key by position (`KeyS` is the key right of
//! `KeyA` on a US board), not by what it types. The OS layout map tells us
//! what the user's layout types there. Shift state never folds into the
//! result: it travels separately as a flag, so the character is always
//! lowercased.

use picker_protocol::KeyboardLayoutMap;

/// Label used when a key code is empty.
const UNIDENTIFIED: &str = "unidentified";

/// Resolve `physical_key` against `layout`.
///
/// Never fails and never returns an empty string. Keys missing from the map
/// (or mapped to an empty string) resolve to [`fallback_label`].
pub fn resolve_virtual_key(physical_key: &str, layout: &KeyboardLayoutMap) -> String {
    match layout.get(physical_key) {
        Some(ch) if !ch.is_empty() => ch.to_lowercase(),
        _ => fallback_label(physical_key),
    }
}

/// The key code's own label, lowercased.
///
/// Letter and digit codes drop their `Key`/`Digit` prefix (`KeyQ` → `q`,
/// `Digit4` → `4`); every other code is lowercased as a whole
/// (`Backquote` → `backquote`).
pub fn fallback_label(physical_key: &str) -> String {
    let code = physical_key.trim();
    if code.is_empty() {
        return UNIDENTIFIED.to_string();
    }
    let stripped = code
        .strip_prefix("Key")
        .or_else(|| code.strip_prefix("Digit"))
        .filter(|rest| rest.chars().count() == 1);
    stripped.unwrap_or(code).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qwerty() -> KeyboardLayoutMap {
        [("KeyS", "s"), ("KeyA", "a"), ("Digit1", "1"), ("Semicolon", ";")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn maps_through_layout() {
        assert_eq!(resolve_virtual_key("KeyS", &qwerty()), "s");
        assert_eq!(resolve_virtual_key("Semicolon", &qwerty()), ";");
    }

    #[test]
    fn lowercases_layout_output() {
        let mut layout = qwerty();
        layout.insert("KeyS".into(), "S".into());
        assert_eq!(resolve_virtual_key("KeyS", &layout), "s");
    }

    #[test]
    fn follows_non_us_layouts() {
        // AZERTY puts `a` where QWERTY has `q`.
        let layout: KeyboardLayoutMap = [("KeyQ".to_string(), "a".to_string())].into();
        assert_eq!(resolve_virtual_key("KeyQ", &layout), "a");
    }

    #[test]
    fn absent_keys_fall_back_to_lowercase_label() {
        let layout = qwerty();
        for (code, want) in [
            ("KeyZ", "z"),
            ("Digit9", "9"),
            ("Backquote", "backquote"),
            ("F12", "f12"),
            ("Keyboard", "keyboard"),
            ("", "unidentified"),
        ] {
            let got = resolve_virtual_key(code, &layout);
            assert_eq!(got, want, "code {code:?}");
            assert!(!got.is_empty());
            assert_eq!(got, got.to_lowercase());
        }
    }

    #[test]
    fn empty_mapping_uses_fallback() {
        let layout: KeyboardLayoutMap = [("KeyS".to_string(), String::new())].into();
        assert_eq!(resolve_virtual_key("KeyS", &layout), "s");
    }
}
