use crate::errors::AppError;

pub const MAX_MESSAGE_CHARS: usize = 1000;
const MAX_USER_ID_CHARS: usize = 128;

/// Substrings that mark a message as unsafe to forward into a prompt.
const UNSAFE_PATTERNS: &[&str] = &["http://", "https://", "www.", "<", ">", "javascript:"];

pub fn validate_user_id(user_id: &str) -> Result<(), AppError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("userId는 필수입니다.".to_string()));
    }
    if user_id.chars().count() > MAX_USER_ID_CHARS {
        return Err(AppError::Validation(
            "userId가 너무 깁니다.".to_string(),
        ));
    }
    Ok(())
}

/// Checks a free-text message. An empty message is allowed: the profile may
/// come entirely from session hints.
pub fn validate_message(message: &str) -> Result<(), AppError> {
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "메시지가 너무 깁니다. {MAX_MESSAGE_CHARS}자 이내로 작성해주세요."
        )));
    }

    let lower = message.to_lowercase();
    if UNSAFE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Err(AppError::Validation(
            "안전하지 않은 내용이 포함되어 있습니다.".to_string(),
        ));
    }

    Ok(())
}
