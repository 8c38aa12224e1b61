//! Declared-name construction for inferred structs.
use once_cell::sync::Lazy;
use regex::Regex;

static WORD_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static regex"));

pub const DEFAULT_ROOT_NAME: &str = "Root";
const ITEM_SUFFIX: &str = "Item";

/// `user_id` → `UserId`, `display-name` → `DisplayName`, `42` → `42`.
pub fn pascal_case(raw: &str) -> String {
    WORD_BREAK
        .split(raw)
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn root_name(source_name: &str) -> String {
    let name = pascal_case(source_name);
    if name.is_empty() { DEFAULT_ROOT_NAME.to_string() } else { name }
}

/// Name and discriminator of a struct found under `key` of `parent`.
pub fn child_name(parent: &str, key: &str) -> (String, String) {
    let segment = pascal_case(key);
    (format!("{parent}{segment}"), segment)
}

/// Element names get an `Item` suffix unless they already end in one.
pub fn item_name(array_name: &str) -> String {
    let lower = array_name.to_ascii_lowercase();
    if lower.ends_with("item") {
        array_name.to_string()
    } else {
        format!("{array_name}{ITEM_SUFFIX}")
    }
}
