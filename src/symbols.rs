//! Label and macro symbol tables.
//!
//! Labels live in one flat map keyed by fully-qualified name: a main
//! label is keyed by its bare name, a sub-label by
//! `"<last main label>/<sub name>"`. The last-declared main label is
//! tracked separately so sub-labels and bare sub-references can resolve
//! against it.

use std::collections::HashMap;

use crate::scanner::Cursor;

/// A declared label: its fixed address, how many times it has been
/// referenced, and (for sub-labels) the main label it is scoped under.
#[derive(Debug, Clone)]
pub struct Label {
    /// Fully-qualified name as stored in the table.
    pub name: String,
    /// Address fixed at declaration time (pass 1).
    pub address: u16,
    /// Number of times this label has been resolved via `get_addr`.
    pub usage_count: u32,
    /// Key of the main label this sub-label is scoped under, if any.
    pub parent: Option<String>,
}

/// Maps fully-qualified label names to their declarations.
#[derive(Debug, Default)]
pub struct LabelTable {
    labels: HashMap<String, Label>,
    last_main_label: Option<String>,
}

impl LabelTable {
    /// Create an empty label table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fully-qualify `name` against the last declared main label, the
    /// way a sub-label reference is resolved. Returns `name` unchanged
    /// if no main label has been declared yet.
    pub fn resolve_name(&self, name: &str) -> String {
        match &self.last_main_label {
            Some(main) => format!("{main}/{name}"),
            None => name.to_string(),
        }
    }

    /// True iff `name` or its sub-label-qualified form is present.
    pub fn exists(&self, name: &str) -> bool {
        self.labels.contains_key(name) || self.labels.contains_key(&self.resolve_name(name))
    }

    /// Declare a label at `address`. If `is_sub` is false this becomes
    /// the new last main label and is keyed by its bare name; otherwise
    /// it is keyed by the sub-label-qualified name and scoped under the
    /// current main label.
    ///
    /// Returns the fully-qualified key the label was stored under.
    pub fn add(&mut self, name: &str, is_sub: bool, address: u16) -> String {
        if is_sub {
            let key = self.resolve_name(name);
            let parent = self.last_main_label.clone();
            self.labels.insert(
                key.clone(),
                Label {
                    name: key.clone(),
                    address,
                    usage_count: 0,
                    parent,
                },
            );
            key
        } else {
            let key = name.to_string();
            self.labels.insert(
                key.clone(),
                Label {
                    name: key.clone(),
                    address,
                    usage_count: 0,
                    parent: None,
                },
            );
            self.last_main_label = Some(key.clone());
            key
        }
    }

    /// Look up `name` directly, then as a sub-label-qualified name. A
    /// leading `&` names a sub-label explicitly scoped under the current
    /// main label (e.g. `&sub` from inside `@main` means `main/sub`) and
    /// is resolved only against that scope, with no bare-name fallback.
    /// Increments the label's usage count (and its parent's, if any)
    /// on success.
    ///
    /// Returns `None` if neither form is present.
    pub fn get_addr(&mut self, name: &str) -> Option<u16> {
        let key = if let Some(sub_name) = name.strip_prefix('&') {
            let qualified = self.resolve_name(sub_name);
            if self.labels.contains_key(&qualified) {
                qualified
            } else {
                return None;
            }
        } else if self.labels.contains_key(name) {
            name.to_string()
        } else {
            let qualified = self.resolve_name(name);
            if self.labels.contains_key(&qualified) {
                qualified
            } else {
                return None;
            }
        };

        let (address, parent) = {
            let label = self.labels.get_mut(&key).unwrap();
            label.usage_count += 1;
            (label.address, label.parent.clone())
        };
        if let Some(parent_key) = parent {
            if let Some(parent_label) = self.labels.get_mut(&parent_key) {
                parent_label.usage_count += 1;
            }
        }
        Some(address)
    }

    /// Borrow a label by its fully-qualified key, without touching its
    /// usage count.
    pub fn get(&self, key: &str) -> Option<&Label> {
        self.labels.get(key)
    }
}

/// A macro definition: the body's start cursor, saved so pass 2 can jump
/// into it at every invocation site.
#[derive(Debug, Clone, Copy)]
pub struct Macro {
    /// Cursor pointing at the first byte after the opening `{`.
    pub body: Cursor,
}

/// Maps macro names to their recorded bodies.
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: HashMap<String, Macro>,
}

impl MacroTable {
    /// Create an empty macro table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a macro body, silently overwriting any prior definition
    /// with the same name.
    pub fn add(&mut self, name: &str, body: Cursor) {
        self.macros.insert(name.to_string(), Macro { body });
    }

    /// Look up a macro by name.
    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    /// Number of distinct macros recorded.
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// Whether any macros have been recorded.
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_cursor() -> Cursor {
        Scanner::new(b"").save()
    }

    use crate::scanner::Scanner;

    #[test]
    fn test_main_label_keyed_by_bare_name() {
        let mut table = LabelTable::new();
        table.add("loop", false, 0x0100);
        assert!(table.exists("loop"));
        assert_eq!(table.get("loop").unwrap().address, 0x0100);
    }

    #[test]
    fn test_sub_label_keyed_under_main() {
        let mut table = LabelTable::new();
        table.add("a", false, 0x0100);
        table.add("b", true, 0x0101);
        assert!(table.get("a/b").is_some());
        assert_eq!(table.get("a/b").unwrap().address, 0x0101);
    }

    #[test]
    fn test_sub_label_without_main_degenerates_to_bare_name() {
        let mut table = LabelTable::new();
        table.add("b", true, 0x0100);
        assert!(table.get("b").is_some());
    }

    #[test]
    fn test_get_addr_resolves_sub_label_from_ampersand_form() {
        let mut table = LabelTable::new();
        table.add("a", false, 0x0100);
        table.add("b", true, 0x0101);
        assert_eq!(table.get_addr("&b"), Some(0x0101));
    }

    #[test]
    fn test_get_addr_resolves_sub_label_from_bare_name() {
        let mut table = LabelTable::new();
        table.add("a", false, 0x0100);
        table.add("b", true, 0x0101);
        assert_eq!(table.get_addr("b"), Some(0x0101));
    }

    #[test]
    fn test_get_addr_missing_returns_none() {
        let mut table = LabelTable::new();
        assert_eq!(table.get_addr("nope"), None);
    }

    #[test]
    fn test_usage_count_bubbles_to_parent() {
        let mut table = LabelTable::new();
        table.add("a", false, 0x0100);
        table.add("b", true, 0x0101);
        table.get_addr("a/b");
        table.get_addr("a/b");
        assert_eq!(table.get("a/b").unwrap().usage_count, 2);
        assert_eq!(table.get("a").unwrap().usage_count, 2);
    }

    #[test]
    fn test_macro_table_overwrite() {
        let mut macros = MacroTable::new();
        macros.add("double", dummy_cursor());
        assert_eq!(macros.len(), 1);
        macros.add("double", dummy_cursor());
        assert_eq!(macros.len(), 1);
    }
}
