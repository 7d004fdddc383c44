//! Custom tags
//!
//! Hosts plug their own tags into a playlist or a segment by implementing
//! [`CustomTag`]. Tags are keyed by name: setting a tag whose name is already
//! present replaces the old one in place, so a tag keeps the position it was
//! first inserted at.

use std::fmt;
use std::sync::Arc;

/// A tag the encoder does not know about.
pub trait CustomTag: fmt::Debug + Send + Sync {
    /// Tag name, e.g. `#EXT-X-MY-TAG`. Used as the replacement key.
    fn name(&self) -> &str;

    /// Full line to write (without the trailing newline), or `None` to
    /// leave the tag out of the output.
    fn render(&self) -> Option<String>;
}

/// A tag with an optional value, rendered as `NAME` or `NAME:VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTag {
    pub name: String,
    pub value: Option<String>,
}

impl SimpleTag {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl CustomTag for SimpleTag {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> Option<String> {
        Some(match &self.value {
            Some(value) => format!("{}:{}", self.name, value),
            None => self.name.clone(),
        })
    }
}

/// Insertion-ordered, name-keyed set of custom tags
#[derive(Debug, Clone, Default)]
pub struct CustomTags {
    tags: Vec<Arc<dyn CustomTag>>,
}

impl CustomTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, replacing any tag with the same name.
    pub fn set(&mut self, tag: Arc<dyn CustomTag>) {
        match self.tags.iter_mut().find(|t| t.name() == tag.name()) {
            Some(slot) => *slot = tag,
            None => self.tags.push(tag),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CustomTag>> {
        self.tags.iter().find(|t| t.name() == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn CustomTag>> {
        let pos = self.tags.iter().position(|t| t.name() == name)?;
        Some(self.tags.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CustomTag>> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Append every rendered tag as its own line.
    pub(crate) fn write_to(&self, output: &mut String) {
        for tag in &self.tags {
            if let Some(line) = tag.render() {
                output.push_str(&line);
                output.push('\n');
            }
        }
    }
}
