use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exam::topics::{split_topic_list, TopicSet};
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStatus {
    #[default]
    Active,
    Draft,
    Archived,
}

/// A syllabus unit. `topics` is the comma-separated list editors maintain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub institute_id: String,
    pub exam_category_id: String,
    pub subject: String,
    /// Chapter (syllabus) name.
    pub name: String,
    pub topics: String,
    /// 0-100, feeds the recommendation score.
    pub weightage: Option<f64>,
    #[serde(default)]
    pub status: ChapterStatus,
    pub created_at: DateTime<Utc>,
}

impl Chapter {
    pub fn topic_names(&self) -> Vec<String> {
        split_topic_list(&self.topics)
    }

    pub fn topic_set(&self) -> TopicSet {
        TopicSet::from_list(&self.topics)
    }
}

impl Store {
    pub fn upsert_chapter(&self, chapter: &Chapter) -> Result<(), StoreError> {
        if let Some(weightage) = chapter.weightage {
            if !(0.0..=100.0).contains(&weightage) {
                return Err(StoreError::Validation(format!(
                    "chapter weightage must be within 0-100, got {weightage}"
                )));
            }
        }
        let key = keys::chapter_key(&chapter.id)?;
        self.chapters.insert(key.as_bytes(), Self::serialize(chapter)?)?;
        Ok(())
    }

    pub fn get_chapter(&self, chapter_id: &str) -> Result<Option<Chapter>, StoreError> {
        let key = keys::chapter_key(chapter_id)?;
        match self.chapters.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// 批量获取章节：无效或不存在的 id 直接跳过，结果按请求顺序、去重，最多 `limit` 条
    pub fn get_chapters_by_ids(
        &self,
        chapter_ids: &[String],
        limit: usize,
    ) -> Result<Vec<Chapter>, StoreError> {
        let mut seen = HashSet::new();
        let mut chapters = Vec::new();
        for chapter_id in chapter_ids {
            if chapters.len() >= limit {
                break;
            }
            if !seen.insert(chapter_id.as_str()) {
                continue;
            }
            let key = match keys::chapter_key(chapter_id) {
                Ok(key) => key,
                Err(e) => {
                    tracing::debug!(chapter_id = %chapter_id, error = %e, "Skipping invalid chapter id");
                    continue;
                }
            };
            if let Some(raw) = self.chapters.get(key.as_bytes())? {
                chapters.push(Self::deserialize::<Chapter>(&raw)?);
            }
        }
        Ok(chapters)
    }

    /// Resolves the chapter a response or resume row refers to: by id first, then by subject + name.
    pub fn find_chapter(&self, subject: &str, chapter: &str) -> Result<Option<Chapter>, StoreError> {
        if keys::chapter_key(chapter).is_ok() {
            if let Some(found) = self.get_chapter(chapter)? {
                return Ok(Some(found));
            }
        }
        for item in self.chapters.iter() {
            let (_, value) = item?;
            let candidate: Chapter = Self::deserialize(&value)?;
            if candidate.subject.eq_ignore_ascii_case(subject)
                && candidate.name.trim().eq_ignore_ascii_case(chapter.trim())
            {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    pub fn list_chapters_by_exam_category(
        &self,
        exam_category_id: &str,
        status: ChapterStatus,
        limit: usize,
    ) -> Result<Vec<Chapter>, StoreError> {
        let mut chapters = Vec::new();
        for item in self.chapters.iter() {
            let (_, value) = item?;
            let chapter: Chapter = Self::deserialize(&value)?;
            if chapter.exam_category_id == exam_category_id && chapter.status == status {
                chapters.push(chapter);
                if chapters.len() >= limit {
                    break;
                }
            }
        }
        chapters.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(chapters)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn sample_chapter(id: &str, name: &str, topics: &str) -> Chapter {
        Chapter {
            id: id.to_string(),
            institute_id: "inst-1".to_string(),
            exam_category_id: "jee".to_string(),
            subject: "Physics".to_string(),
            name: name.to_string(),
            topics: topics.to_string(),
            weightage: Some(8.0),
            status: ChapterStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn batch_lookup_skips_missing_and_invalid_ids() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("chapters-db").to_str().unwrap()).unwrap();
        store
            .upsert_chapter(&sample_chapter("c1", "Kinematics", "speed, velocity"))
            .unwrap();

        let ids = vec![
            "c1".to_string(),
            "missing".to_string(),
            "bad:id".to_string(),
            "c1".to_string(),
        ];
        let found = store.get_chapters_by_ids(&ids, 100).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].topic_names(), vec!["speed", "velocity"]);
    }

    #[test]
    fn weightage_out_of_range_is_rejected() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("chapters-db2").to_str().unwrap()).unwrap();
        let mut chapter = sample_chapter("c1", "Optics", "lenses");
        chapter.weightage = Some(140.0);
        let err = store.upsert_chapter(&chapter).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn find_by_subject_and_name_when_id_unknown() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("chapters-db3").to_str().unwrap()).unwrap();
        store
            .upsert_chapter(&sample_chapter("c9", "Laws of Motion", "inertia"))
            .unwrap();

        let by_name = store.find_chapter("physics", "laws of motion").unwrap();
        assert_eq!(by_name.map(|c| c.id), Some("c9".to_string()));
        let by_id = store.find_chapter("Chemistry", "c9").unwrap();
        assert!(by_id.is_some());
        assert!(store.find_chapter("Physics", "Optics").unwrap().is_none());
    }
}
