//! Identifier-safe name cleaning
//!
//! Provides [`NameCleaner`] for turning a raw display name into a name that
//! is legal as a platform identifier.
//!
//! # Rules
//! - Only ASCII letters and digits survive; case is preserved.
//! - In the default mode `_` is the join separator of composite keys: the
//!   input is split on it, each segment is cleaned, empty segments are
//!   dropped and the rest are rejoined with a single `_`.
//! - In strict mode the input is a single, already decomposed part and every
//!   non-alphanumeric character is removed, `_` included.
//!
//! Both modes are idempotent: `clean(clean(x)) == clean(x)`.

/// Separator joining the parts of composite name keys
pub const KEY_SEPARATOR: char = '_';

/// Stateless name cleaner
#[derive(Debug, Clone, Copy, Default)]
pub struct NameCleaner;

impl NameCleaner {
    /// Create new cleaner instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw name
    ///
    /// `strict` selects part-level cleaning (see module docs).
    #[inline]
    #[must_use]
    pub fn clean(&self, raw: &str, strict: bool) -> String {
        if strict {
            clean_strict(raw)
        } else {
            clean(raw)
        }
    }
}

/// Clean a raw name, keeping `_`-separated segments
///
/// # Examples
/// ```
/// use oms_naming::clean;
///
/// assert_eq!(clean("Customer-Data Loader"), "CustomerDataLoader");
/// assert_eq!(clean("Account__Details_English"), "Account_Details_English");
/// ```
#[must_use]
pub fn clean(raw: &str) -> String {
    if is_clean(raw) {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    for segment in raw.split(KEY_SEPARATOR) {
        let before = out.len();
        if before > 0 {
            out.push(KEY_SEPARATOR);
        }
        let start = out.len();
        out.extend(segment.chars().filter(char::is_ascii_alphanumeric));
        if out.len() == start {
            // segment cleaned to nothing: drop it and its separator
            out.truncate(before);
        }
    }
    out
}

/// Clean a single name part, removing every non-alphanumeric character
///
/// # Examples
/// ```
/// use oms_naming::clean_strict;
///
/// assert_eq!(clean_strict("Get_Account-Info"), "GetAccountInfo");
/// ```
#[must_use]
pub fn clean_strict(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Check if a name is already in default-mode clean form
#[must_use]
pub fn is_clean(name: &str) -> bool {
    name.split(KEY_SEPARATOR).all(|segment| {
        !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric())
    }) || name.is_empty()
}

/// Join composite key parts with [`KEY_SEPARATOR`]
///
/// ```
/// use oms_naming::join_key;
///
/// assert_eq!(join_key(&["Account", "Details", "English"]), "Account_Details_English");
/// ```
#[must_use]
pub fn join_key<S: AsRef<str>>(parts: &[S]) -> String {
    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(part.as_ref());
    }
    key
}
