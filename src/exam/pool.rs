use crate::exam::topics::TopicSet;
use crate::exam::types::Difficulty;
use crate::store::operations::questions::{Question, QuestionQuery};
use crate::store::{Store, StoreError};

/// Difficulty goes to the store index; topic membership is checked per question during the
/// same scan because question tags are free-form. A question matches on any shared tag.
pub fn filter_pool(
    store: &Store,
    topics: &TopicSet,
    difficulties: &[Difficulty],
    fetch_limit: usize,
) -> Result<Vec<Question>, StoreError> {
    if difficulties.is_empty() || topics.is_empty() {
        return Ok(Vec::new());
    }
    let pool = store.find_questions(&QuestionQuery {
        difficulties: difficulties.to_vec(),
        topics: Some(topics.clone()),
        limit: fetch_limit,
        ..Default::default()
    })?;
    tracing::debug!(topics = topics.len(), matched = pool.len(), "Question pool filtered");
    Ok(pool)
}
