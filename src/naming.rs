//! Naming conventions shared by the reader and the edit engine.
//!
//! Event members are always stored as `onXxx`; slot members as `slotXxx` or in the
//! hyphenated `slot-xxx` form.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
    static ref SLOT_NAME_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(-[A-Za-z0-9_$]+)*$").unwrap();
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits an identifier into words the way lodash does for ASCII input:
/// separators, lower->Upper transitions, the end of an acronym (`XMLHttp` -> `XML`, `Http`)
/// and letter/digit transitions.
pub fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.map(|n| n.is_lowercase()).unwrap_or(false))
                || (prev.is_ascii_digit() != c.is_ascii_digit());
            if boundary {
                out.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

pub fn kebab_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn camel_case(s: &str) -> String {
    words(s)
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let lower = w.to_lowercase();
            if i == 0 {
                lower
            } else {
                upper_first(&lower)
            }
        })
        .collect()
}

/// `MyButton` -> `my-button`; only upper-case letters introduce a dash.
pub fn kebab_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out.strip_prefix('-').map(str::to_string).unwrap_or(out)
}

/// Human title for a member name: `onClick` -> `On Click`, `sub-title` -> `Sub Title`.
pub fn gen_title(name: &str) -> String {
    kebab_case(name)
        .split('-')
        .filter(|s| !s.is_empty())
        .map(upper_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `name` is `marker` followed by an upper-case letter.
fn starts_with_marker(name: &str, marker: &str) -> bool {
    name.strip_prefix(marker)
        .and_then(|rest| rest.chars().next())
        .map(char::is_uppercase)
        .unwrap_or(false)
}

pub fn normalize_event_name(name: &str) -> String {
    if name.is_empty() || starts_with_marker(name, "on") {
        return name.to_string();
    }
    format!("on{}", upper_first(name))
}

pub fn normalize_slot_name(name: &str) -> String {
    if name.is_empty() || name.starts_with("slot-") || starts_with_marker(name, "slot") {
        return name.to_string();
    }
    if name.contains('-') {
        return format!("slot-{}", name);
    }
    format!("slot{}", upper_first(name))
}

/// The camel-cased twin of a hyphenated slot (`slot-sub-title` -> `slotSubTitle`).
pub fn slot_sibling_name(name: &str) -> Option<String> {
    if name.contains('-') {
        Some(camel_case(name))
    } else {
        None
    }
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

pub fn is_slot_name(name: &str) -> bool {
    SLOT_NAME_RE.is_match(name)
}

/// Escapes text for a single-quoted string literal.
pub fn normalize_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_words_and_cases() {
        assert_eq!(words("onClick"), vec!["on", "Click"]);
        assert_eq!(words("XMLHttpRequest"), vec!["XML", "Http", "Request"]);
        assert_eq!(words("slot-sub_title"), vec!["slot", "sub", "title"]);
        assert_eq!(kebab_case("fooBar2"), "foo-bar-2");
        assert_eq!(camel_case("slot-sub-title"), "slotSubTitle");
    }

    #[test]
    fn test_gen_title() {
        assert_eq!(gen_title("value"), "Value");
        assert_eq!(gen_title("onClick"), "On Click");
        assert_eq!(gen_title("slot-sub-title"), "Slot Sub Title");
        assert_eq!(gen_title("Button"), "Button");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(normalize_event_name("click"), "onClick");
        assert_eq!(normalize_event_name("onChange"), "onChange");
        assert_eq!(normalize_event_name("online"), "onOnline");
        assert_eq!(normalize_event_name("on1"), "onOn1");
        assert_eq!(normalize_event_name("on_x"), "onOn_x");
        assert_eq!(normalize_event_name("on$"), "onOn$");
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(normalize_slot_name("default"), "slotDefault");
        assert_eq!(normalize_slot_name("slotTitle"), "slotTitle");
        assert_eq!(normalize_slot_name("sub-title"), "slot-sub-title");
        assert_eq!(normalize_slot_name("slot-item"), "slot-item");
        assert_eq!(normalize_slot_name("slot1"), "slotSlot1");
        assert_eq!(normalize_slot_name("slot_a"), "slotSlot_a");
        assert_eq!(slot_sibling_name("slot-sub-title").as_deref(), Some("slotSubTitle"));
        assert_eq!(slot_sibling_name("slotTitle"), None);
    }

    #[test]
    fn test_kebab_name() {
        assert_eq!(kebab_name("MyButton"), "my-button");
        assert_eq!(kebab_name("table"), "table");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("value"));
        assert!(is_identifier("$item_2"));
        assert!(!is_identifier("2value"));
        assert!(!is_identifier("sub-title"));
        assert!(is_slot_name("slot-sub-title"));
        assert!(!is_slot_name("slot--x"));
    }

    #[test]
    fn test_normalize_string() {
        assert_eq!(normalize_string("it's"), "it\\'s");
    }

    proptest! {
        #[test]
        fn event_normalization_is_idempotent(name in "[A-Za-z][A-Za-z0-9_$]{0,12}") {
            let once = normalize_event_name(&name);
            prop_assert_eq!(normalize_event_name(&once), once);
        }

        #[test]
        fn slot_normalization_is_idempotent(name in "[A-Za-z][A-Za-z0-9]{0,8}(-[a-z0-9]{1,5}){0,2}") {
            let once = normalize_slot_name(&name);
            prop_assert_eq!(normalize_slot_name(&once), once);
        }
    }
}
