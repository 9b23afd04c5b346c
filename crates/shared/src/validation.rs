use crate::constants::*;

pub fn validate_send_payload(text: Option<&str>, media_url: Option<&str>) -> Result<(), String> {
    let has_text = text.map(|t| !t.trim().is_empty()).unwrap_or(false);
    let has_media = media_url.map(|u| !u.trim().is_empty()).unwrap_or(false);
    if !has_text && !has_media {
        return Err("Message text or media is required".into());
    }
    if let Some(t) = text {
        if t.len() > MAX_MESSAGE_LENGTH {
            return Err(format!(
                "Message must be at most {} characters",
                MAX_MESSAGE_LENGTH
            ));
        }
    }
    Ok(())
}

pub fn validate_participants(from_user: &str, to_user: &str) -> Result<(), String> {
    if to_user.trim().is_empty() {
        return Err("Recipient is required".into());
    }
    if from_user == to_user {
        return Err("Cannot send a message to yourself".into());
    }
    Ok(())
}
