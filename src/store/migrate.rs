use crate::store::operations::question_sets::QuestionSet;
use crate::store::operations::questions::Question;
use crate::store::{keys, Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_question_difficulty_index", m002_question_difficulty_index),
        ("003_question_set_test_index", m003_question_set_test_index),
    ]
}

/// 执行所有未应用的数据库迁移。
///
/// - 每个迁移必须幂等：进程可能在迁移完成后、写版本号前崩溃，重启会再跑一次。
/// - 版本号在每个迁移成功后立即持久化。
/// - 仅向前，拒绝降级。
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.config_versions.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("corrupt version marker ({} bytes)", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {current} to {version}"),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

fn m002_question_difficulty_index(store: &Store) -> Result<(), StoreError> {
    for item in store.questions.iter() {
        let (_, value) = item?;
        let question: Question = Store::deserialize(&value)?;
        let index_key =
            keys::question_difficulty_index_key(question.difficulty.as_str(), &question.id)?;
        store
            .questions_by_difficulty
            .insert(index_key.as_bytes(), &[])?;
    }
    Ok(())
}

/// 多个题组指向同一考试时保留最早创建的那个
fn m003_question_set_test_index(store: &Store) -> Result<(), StoreError> {
    let mut sets = Vec::new();
    for item in store.question_sets.iter() {
        let (_, value) = item?;
        sets.push(Store::deserialize::<QuestionSet>(&value)?);
    }
    sets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    for set in sets {
        let index_key = keys::question_set_test_index_key(&set.mocktest_id)?;
        let claimed = store
            .question_sets_by_test
            .compare_and_swap(
                index_key.as_bytes(),
                None::<&[u8]>,
                Some(set.id.as_bytes().to_vec()),
            )
            .map_err(StoreError::Sled)?;
        if claimed.is_err() {
            tracing::warn!(
                mocktest_id = %set.mocktest_id,
                question_set_id = %set.id,
                "Duplicate question set for test left unindexed"
            );
        }
    }
    Ok(())
}
