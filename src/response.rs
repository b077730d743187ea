//! Console output parsing
//!
//! Two shapes come back from the console:
//!
//! - **Listings** (`group -l`, `mtrouter -l`, ...): the echoed command, a
//!   column header, one row per entity, a `Total ...:` line and the prompt.
//!   Rows start with a `#` marker, a `!` right after it flags a disabled
//!   entity, and reference lists are joined with `", "`, which collides with
//!   the whitespace column separator until it is collapsed.
//! - **Detail blocks** (`user -s`, `smppccm -s`, ...): one attribute per line,
//!   either `key value` or `category subcategory key value`.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Number of decorative lines above the rows of a listing (echo, header)
const TABLE_HEAD: usize = 2;
/// Number of decorative lines below the rows of a listing (total, prompt)
const TABLE_TAIL: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 2 or 4 tokens, found {count} in attribute line {line:?}")]
    TokenCount { line: String, count: usize },
}

/// One data row of a console listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Whitespace-separated columns, markers removed from the first one
    pub columns: Vec<String>,
    /// The row carried the `!` disabled marker
    pub disabled: bool,
}

impl TableRow {
    /// Parse a single row line (already stripped of decoration lines)
    pub fn parse(line: &str) -> Self {
        let normalized = line.replace(", ", ",").replace("(!)", "");
        let mut columns: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();

        let mut disabled = false;
        if let Some(first) = columns.first_mut() {
            let unmarked = first.strip_prefix('#').unwrap_or(first.as_str());
            let (id, flagged) = match unmarked.strip_prefix('!') {
                Some(rest) => (rest.to_string(), true),
                None => (unmarked.to_string(), false),
            };
            *first = id;
            disabled = flagged;
        }

        Self { columns, disabled }
    }

    /// The identifier column
    pub fn id(&self) -> &str {
        self.column(0).unwrap_or_default()
    }

    pub fn column(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Columns `from..` joined back with single spaces
    pub fn rest(&self, from: usize) -> String {
        self.columns.get(from..).unwrap_or_default().join(" ")
    }

    /// Columns `from..` rejoined and re-split on `,` into a reference list
    pub fn list_from(&self, from: usize) -> Vec<String> {
        self.rest(from)
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parse a full listing transcript into rows.
///
/// Replies shorter than three lines mean the console had nothing to list and
/// yield no rows.
pub fn parse_table(raw: &str) -> Vec<TableRow> {
    let cleaned = raw.trim().replace('\r', "");
    let lines: Vec<&str> = cleaned.split('\n').collect();
    if lines.len() < 3 {
        return Vec::new();
    }

    lines
        .get(TABLE_HEAD..lines.len().saturating_sub(TABLE_TAIL))
        .unwrap_or_default()
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| TableRow::parse(line))
        .collect()
}

/// A single line of a detail block, shaped by its token count
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeLine {
    Flat {
        key: String,
        value: String,
    },
    Nested {
        category: String,
        subcategory: String,
        key: String,
        value: String,
    },
}

impl AttributeLine {
    /// `Ok(None)` for blank lines
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Ok(None),
            [key, value] => Ok(Some(AttributeLine::Flat {
                key: key.to_string(),
                value: value.to_string(),
            })),
            [category, subcategory, key, value] => Ok(Some(AttributeLine::Nested {
                category: category.to_string(),
                subcategory: subcategory.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            })),
            other => Err(ParseError::TokenCount {
                line: line.trim().to_string(),
                count: other.len(),
            }),
        }
    }
}

/// Value stored under a top-level attribute key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flat(String),
    /// subcategory -> key -> value
    Section(BTreeMap<String, BTreeMap<String, String>>),
}

/// Attributes of a detail block assembled into a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeTree {
    entries: BTreeMap<String, AttributeValue>,
}

impl AttributeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a line. A later line replaces an earlier one with the same key;
    /// a flat key and a section of the same name replace each other.
    pub fn insert(&mut self, line: AttributeLine) {
        match line {
            AttributeLine::Flat { key, value } => {
                self.entries.insert(key, AttributeValue::Flat(value));
            }
            AttributeLine::Nested {
                category,
                subcategory,
                key,
                value,
            } => {
                let slot = self
                    .entries
                    .entry(category)
                    .or_insert_with(|| AttributeValue::Section(BTreeMap::new()));
                if let AttributeValue::Flat(_) = slot {
                    *slot = AttributeValue::Section(BTreeMap::new());
                }
                if let AttributeValue::Section(section) = slot {
                    section.entry(subcategory).or_default().insert(key, value);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.get(key)
    }

    pub fn flat(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(AttributeValue::Flat(value)) => Some(value),
            _ => None,
        }
    }

    pub fn nested(&self, category: &str, subcategory: &str, key: &str) -> Option<&str> {
        match self.entries.get(category) {
            Some(AttributeValue::Section(section)) => section
                .get(subcategory)
                .and_then(|keys| keys.get(key))
                .map(String::as_str),
            _ => None,
        }
    }

    /// Remove and return a flat attribute
    pub fn take_flat(&mut self, key: &str) -> Option<String> {
        match self.entries.remove(key) {
            Some(AttributeValue::Flat(value)) => Some(value),
            Some(section) => {
                self.entries.insert(key.to_string(), section);
                None
            }
            None => None,
        }
    }

    /// Flat attributes only, sections dropped
    pub fn into_flat(self) -> BTreeMap<String, String> {
        self.entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                AttributeValue::Flat(value) => Some((key, value)),
                AttributeValue::Section(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.entries.iter()
    }
}

/// Build an attribute tree, rejecting any line that is not 2 or 4 tokens
pub fn parse_attribute_block<'a, I>(lines: I) -> Result<AttributeTree, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tree = AttributeTree::new();
    for line in lines {
        if let Some(attribute) = AttributeLine::parse(line)? {
            tree.insert(attribute);
        }
    }
    Ok(tree)
}

/// Build an attribute tree, skipping malformed lines.
///
/// Connector views print unset options as a bare key, which the strict
/// parser would reject.
pub fn parse_attribute_block_lossy<'a, I>(lines: I) -> AttributeTree
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tree = AttributeTree::new();
    for line in lines {
        match AttributeLine::parse(line) {
            Ok(Some(attribute)) => tree.insert(attribute),
            Ok(None) => {}
            Err(e) => warn!("Skipping attribute line: {e}"),
        }
    }
    tree
}

/// Non-empty lines of a detail reply
pub fn detail_lines(captured: &str) -> Vec<&str> {
    captured
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect()
}
