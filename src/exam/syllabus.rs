use std::collections::HashSet;

use serde::Serialize;

use crate::exam::topics::{normalize_topic, TopicSet};
use crate::store::operations::chapters::Chapter;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusChapter {
    pub id: String,
    pub name: String,
    pub weightage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSyllabus {
    pub subject: String,
    pub chapters: Vec<SyllabusChapter>,
    /// Display names, first-seen spelling, no duplicates.
    pub topics: Vec<String>,
}

/// Union of every chapter's topic list with the explicit topic filters.
pub fn merge_topics<S: AsRef<str>>(chapters: &[Chapter], explicit_topics: &[S]) -> TopicSet {
    let mut topics = TopicSet::from_names(explicit_topics);
    for chapter in chapters {
        topics.union(&chapter.topic_set());
    }
    topics
}

/// Loads the referenced chapters in one batch and merges their topics with `explicit_topics`.
/// Unknown or malformed chapter ids are skipped. An empty result is returned as-is; callers
/// decide whether that is fatal.
pub fn resolve_topics<S: AsRef<str>>(
    store: &Store,
    chapter_ids: &[String],
    explicit_topics: &[S],
    chapter_limit: usize,
) -> Result<TopicSet, StoreError> {
    let chapters = if chapter_ids.is_empty() {
        Vec::new()
    } else {
        store.get_chapters_by_ids(chapter_ids, chapter_limit)?
    };
    if chapters.len() < chapter_ids.len() {
        tracing::debug!(
            requested = chapter_ids.len(),
            resolved = chapters.len(),
            "Some chapter filters did not resolve"
        );
    }
    Ok(merge_topics(&chapters, explicit_topics))
}

/// Groups chapters by subject in first-seen order, deduplicating topics within a subject.
pub fn group_by_subject(chapters: &[Chapter]) -> Vec<SubjectSyllabus> {
    let mut groups: Vec<(SubjectSyllabus, HashSet<String>)> = Vec::new();
    for chapter in chapters {
        let subject = chapter.subject.trim();
        let idx = match groups
            .iter()
            .position(|(g, _)| g.subject.eq_ignore_ascii_case(subject))
        {
            Some(idx) => idx,
            None => {
                groups.push((
                    SubjectSyllabus {
                        subject: subject.to_string(),
                        chapters: Vec::new(),
                        topics: Vec::new(),
                    },
                    HashSet::new(),
                ));
                groups.len() - 1
            }
        };

        let (group, seen) = &mut groups[idx];
        group.chapters.push(SyllabusChapter {
            id: chapter.id.clone(),
            name: chapter.name.clone(),
            weightage: chapter.weightage,
        });
        for topic in chapter.topic_names() {
            if let Some(key) = normalize_topic(&topic) {
                if seen.insert(key) {
                    group.topics.push(topic);
                }
            }
        }
    }
    groups.into_iter().map(|(group, _)| group).collect()
}
