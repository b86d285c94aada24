//! URL slugs for rooms.

use web_time::{SystemTime, UNIX_EPOCH};

use crate::constants::SLUG_SUFFIX_DIGITS;

/// Lowercase `name` and collapse every run of characters outside
/// `[a-z0-9]` into a single `-`. Leading and trailing dashes are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if dash && !slug.is_empty() {
                slug.push('-');
            }
            dash = false;
            slug.push(c);
        } else {
            dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("room");
    }
    slug
}

/// Slug for a new room: the slugified name plus the last digits of the
/// current millisecond timestamp.
pub fn room_slug(name: &str, now_millis: u128) -> String {
    let stamp = now_millis.to_string();
    let suffix = &stamp[stamp.len().saturating_sub(SLUG_SUFFIX_DIGITS)..];
    format!("{}-{}", slugify(name), suffix)
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// First of `base`, `base-2`, `base-3`, ... for which `taken` is false.
pub fn first_free(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
