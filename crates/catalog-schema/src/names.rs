//! Name validation and name-list normalization

use crate::model::NameSet;
use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Characters that delimit structure in downstream artifacts and therefore
/// may not appear inside an entity name.
pub const RESERVED_CHARS: &[char] = &['|', '[', ']', '{', '}', '<', '>', '#'];

/// Matches any [`RESERVED_CHARS`] entry or a control character.
static RESERVED: LazyLock<Regex> = LazyLock::new(|| {
    let class: String = RESERVED_CHARS
        .iter()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    Regex::new(&format!(r"[{class}\p{{Cc}}]")).expect("reserved-character pattern is valid")
});

/// Validate an entity name and return its trimmed form.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] when the name is blank or contains a
/// reserved or control character.
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::invalid_name(raw, "name must not be empty"));
    }
    if let Some(found) = RESERVED.find(name) {
        return Err(Error::invalid_name(
            name,
            format!("contains reserved character {:?}", found.as_str()),
        ));
    }
    Ok(name.to_string())
}

/// Trim every entry, drop blanks and keep only the first occurrence of each
/// name.
pub fn normalize_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for item in items {
        let trimmed = item.as_ref().trim();
        if !trimmed.is_empty() {
            push_unique(&mut out, trimmed);
        }
    }
    out
}

/// Same as [`normalize_list`] but collected into an ordered set.
pub fn normalize_set<I, S>(items: I) -> NameSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Append `name` unless the list already holds it.
pub fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|existing| existing == name) {
        list.push(name.to_string());
    }
}

/// Members of `a` that also appear in `b`, in `a`'s order.
pub fn intersection(a: &NameSet, b: &NameSet) -> Vec<String> {
    a.iter().filter(|name| b.contains(*name)).cloned().collect()
}
