//! Loose version ordering for module versions.
//!
//! Module versions are free-form (`4.6.3`, `10.2.6.038`, `2011.6.233`,
//! `1.4.3-GCC-4.6.3`, `1.2-vSMP`), so strict semantic versioning does not
//! apply. A version is split into runs of digits and runs of letters;
//! separators (`.`, `-`, `_`, ...) only delimit components.

use std::cmp::Ordering;
use std::fmt;

/// One component of a loose version.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Number(u64),
    Text(String),
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Component::Number(a), Component::Number(b)) => a.cmp(b),
            (Component::Text(a), Component::Text(b)) => a.cmp(b),
            // Numbers sort before text.
            (Component::Number(_), Component::Text(_)) => Ordering::Less,
            (Component::Text(_), Component::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A version string compared component-wise.
#[derive(Debug, Clone)]
pub struct LooseVersion {
    raw: String,
    components: Vec<Component>,
}

impl LooseVersion {
    /// Parse a version string. Parsing never fails.
    pub fn parse(s: &str) -> Self {
        let mut components = Vec::new();
        let mut current = String::new();
        let mut in_digits = false;

        for ch in s.chars() {
            let is_digit = ch.is_ascii_digit();
            let is_alpha = ch.is_alphabetic();
            if !is_digit && !is_alpha {
                flush(&mut current, in_digits, &mut components);
                continue;
            }
            if !current.is_empty() && is_digit != in_digits {
                flush(&mut current, in_digits, &mut components);
            }
            in_digits = is_digit;
            current.push(ch);
        }
        flush(&mut current, in_digits, &mut components);

        Self {
            raw: s.to_string(),
            components,
        }
    }

    /// The original version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn flush(current: &mut String, digits: bool, out: &mut Vec<Component>) {
    if current.is_empty() {
        return;
    }
    let token = std::mem::take(current);
    let component = if digits {
        match token.parse::<u64>() {
            Ok(n) => Component::Number(n),
            Err(_) => Component::Text(token),
        }
    } else {
        Component::Text(token)
    };
    out.push(component);
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for LooseVersion {}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Whether `version` sorts strictly before `threshold`.
pub fn is_older_than(version: &str, threshold: &str) -> bool {
    LooseVersion::parse(version) < LooseVersion::parse(threshold)
}
