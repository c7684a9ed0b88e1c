use crate::store::StoreError;

const SEP: char = ':';

/// 校验键片段：非空、不含分隔符，避免前缀扫描串到其他用户/实体
fn segment<'a>(field: &str, value: &'a str) -> Result<&'a str, StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    if value.contains(SEP) {
        return Err(StoreError::Validation(format!(
            "{field} must not contain '{SEP}'"
        )));
    }
    Ok(value)
}

fn reverse_ts(timestamp_ms: i64) -> u64 {
    u64::MAX - timestamp_ms.max(0) as u64
}

pub fn user_key(user_id: &str) -> Result<String, StoreError> {
    Ok(segment("user_id", user_id)?.to_string())
}

/// 邮箱索引与用户记录共用 users 树，靠 `email:` 前缀区分
pub fn user_email_index_key(email: &str) -> Result<String, StoreError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(StoreError::Validation("email must not be empty".to_string()));
    }
    Ok(format!("email:{email}"))
}

pub fn institute_key(institute_id: &str) -> Result<String, StoreError> {
    Ok(segment("institute_id", institute_id)?.to_string())
}

pub fn chapter_key(chapter_id: &str) -> Result<String, StoreError> {
    Ok(segment("chapter_id", chapter_id)?.to_string())
}

pub fn question_key(question_id: &str) -> Result<String, StoreError> {
    Ok(segment("question_id", question_id)?.to_string())
}

pub fn question_difficulty_index_key(
    difficulty: &str,
    question_id: &str,
) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{}",
        segment("difficulty", difficulty)?,
        segment("question_id", question_id)?
    ))
}

pub fn question_difficulty_prefix(difficulty: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", segment("difficulty", difficulty)?))
}

pub fn mock_test_key(test_id: &str) -> Result<String, StoreError> {
    Ok(segment("mocktest_id", test_id)?.to_string())
}

pub fn question_set_key(set_id: &str) -> Result<String, StoreError> {
    Ok(segment("question_set_id", set_id)?.to_string())
}

pub fn question_set_test_index_key(test_id: &str) -> Result<String, StoreError> {
    Ok(segment("mocktest_id", test_id)?.to_string())
}

pub fn response_key(
    user_id: &str,
    timestamp_ms: i64,
    response_id: &str,
) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{:020}:{}",
        segment("user_id", user_id)?,
        reverse_ts(timestamp_ms),
        segment("response_id", response_id)?
    ))
}

pub fn response_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", segment("user_id", user_id)?))
}

/// Chapter names are free text, so only the user segment is validated; the chapter is the key tail.
pub fn learning_resume_key(user_id: &str, chapter: &str) -> Result<String, StoreError> {
    if chapter.is_empty() {
        return Err(StoreError::Validation("chapter must not be empty".to_string()));
    }
    Ok(format!("{}:{}", segment("user_id", user_id)?, chapter))
}

pub fn learning_resume_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", segment("user_id", user_id)?))
}
