use serde::Serialize;

use crate::exam::types::{Difficulty, DifficultyDistribution};
use crate::store::operations::question_sets::QuestionSetItem;
use crate::store::operations::questions::Question;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketFill {
    pub difficulty: Difficulty,
    pub requested: u32,
    pub selected: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub items: Vec<QuestionSetItem>,
    pub per_bucket: Vec<BucketFill>,
}

impl Allocation {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fills each requested bucket with the first matching candidates, in bucket order.
///
/// Deterministic: the same candidate order always yields the same paper. A short pool yields a
/// short bucket. Each question is used at most once.
pub fn allocate(
    candidates: &[Question],
    distribution: &DifficultyDistribution,
    marks: f64,
    negative_marks: f64,
) -> Allocation {
    let mut allocation = Allocation::default();
    let mut used = std::collections::HashSet::new();

    for (difficulty, requested) in distribution.buckets() {
        let mut selected = 0_u32;
        for question in candidates {
            if selected >= requested {
                break;
            }
            if question.difficulty != difficulty || !used.insert(question.id.as_str()) {
                continue;
            }
            selected += 1;
            allocation.items.push(QuestionSetItem {
                question_id: question.id.clone(),
                order: allocation.items.len() as u32 + 1,
                marks,
                negative_marks,
            });
        }
        allocation.per_bucket.push(BucketFill {
            difficulty,
            requested,
            selected,
        });
    }

    allocation
}
