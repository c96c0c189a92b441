//! Per-section key declarations.
//!
//! Each indexed section declares which leaf keys hold integers, which hold
//! booleans, which are stored under a different attribute name, and which
//! attributes start out with a value. Declarations are `static` items built
//! with [`SectionSchema::new`], a `const fn` that rejects a key declared as
//! both integer and boolean while the crate is being compiled.

use crate::error::ValueError;
use crate::value::{Value, ValueKind};

#[derive(Debug)]
pub struct SectionSchema {
    pub name: &'static str,
    pub integer_keys: &'static [&'static str],
    pub boolean_keys: &'static [&'static str],
    pub renames: &'static [(&'static str, &'static str)],
    pub defaults: &'static [(&'static str, &'static str)],
}

const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn contains(haystack: &[&str], needle: &str) -> bool {
    let mut i = 0;
    while i < haystack.len() {
        if str_eq(haystack[i], needle) {
            return true;
        }
        i += 1;
    }
    false
}

impl SectionSchema {
    /// Build a declaration, panicking on conflicting entries.
    ///
    /// Used in a `static`, the panic is a compile error:
    ///
    /// ```compile_fail
    /// use vmx_config::schema::SectionSchema;
    /// static BROKEN: SectionSchema =
    ///     SectionSchema::new("broken", &["present"], &["present"], &[], &[]);
    /// ```
    pub const fn new(
        name: &'static str,
        integer_keys: &'static [&'static str],
        boolean_keys: &'static [&'static str],
        renames: &'static [(&'static str, &'static str)],
        defaults: &'static [(&'static str, &'static str)],
    ) -> Self {
        let mut i = 0;
        while i < integer_keys.len() {
            if contains(boolean_keys, integer_keys[i]) {
                panic!("section key declared both integer and boolean");
            }
            i += 1;
        }

        let mut i = 0;
        while i < renames.len() {
            let mut j = i + 1;
            while j < renames.len() {
                if str_eq(renames[i].0, renames[j].0) || str_eq(renames[i].1, renames[j].1) {
                    panic!("section rename declared twice");
                }
                j += 1;
            }
            i += 1;
        }

        Self {
            name,
            integer_keys,
            boolean_keys,
            renames,
            defaults,
        }
    }

    pub fn kind_of(&self, key: &str) -> ValueKind {
        if self.integer_keys.contains(&key) {
            ValueKind::Integer
        } else if self.boolean_keys.contains(&key) {
            ValueKind::Boolean
        } else {
            ValueKind::Text
        }
    }

    /// Attribute name a leaf key is stored under.
    pub fn field_name<'k>(&self, key: &'k str) -> &'k str {
        self.renames
            .iter()
            .find(|(from, _)| *from == key)
            .map(|(_, to)| *to)
            .unwrap_or(key)
    }

    /// Coerce `raw` for `key` and resolve the attribute name.
    pub fn apply<'k>(&self, key: &'k str, raw: &str) -> Result<(&'k str, Value), ValueError> {
        let value = self.kind_of(key).coerce(key, raw)?;
        Ok((self.field_name(key), value))
    }
}
