//! Topic membership.
//!
//! Topics are stored as free-form strings (comma lists on chapters and responses, tag lists on
//! questions). Everything that compares topics goes through [`TopicSet`], which matches on a
//! normalised key: trimmed, inner whitespace collapsed, lowercased.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

pub fn normalize_topic(raw: &str) -> Option<String> {
    let key = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Splits a comma list into display names, dropping blanks and case-insensitive repeats.
pub fn split_topic_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| normalize_topic(t).is_some_and(|key| seen.insert(key)))
        .map(ToOwned::to_owned)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopicSet(BTreeSet<String>);

impl TopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_list(raw: &str) -> Self {
        Self::from_names(raw.split(','))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.extend(names);
        set
    }

    pub fn insert(&mut self, raw: &str) -> bool {
        match normalize_topic(raw) {
            Some(key) => self.0.insert(key),
            None => false,
        }
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.insert(name.as_ref());
        }
    }

    pub fn union(&mut self, other: &TopicSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn contains(&self, raw: &str) -> bool {
        normalize_topic(raw).is_some_and(|key| self.0.contains(&key))
    }

    /// True if any of `tags` is in the set.
    pub fn intersects<I, S>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter().any(|tag| self.contains(tag.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
