use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProfilePayload {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 40))]
    pub phone: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub ministry_focus: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub resume_url: Option<String>,
    #[validate(url)]
    pub video_url: Option<String>,
}

/// Content edits only; status changes go through the lifecycle engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 40))]
    pub phone: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub ministry_focus: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub resume_url: Option<String>,
    #[validate(url)]
    pub video_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateProfilePayload {
        CreateProfilePayload {
            full_name: "Ruth Okafor".into(),
            email: "ruth@example.org".into(),
            phone: Some("555-0101".into()),
            city: Some("Tulsa".into()),
            region: Some("OK".into()),
            ministry_focus: Some("Youth".into()),
            bio: None,
            resume_url: Some("https://files.example.org/ruth.pdf".into()),
            video_url: None,
        }
    }

    #[test]
    fn accepts_complete_payload() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn rejects_bad_email_and_blank_name() {
        let mut bad = payload();
        bad.email = "not-an-email".into();
        bad.full_name = String::new();
        let errors = bad.validate().expect_err("payload is invalid");
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("full_name"));
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateProfilePayload::default().validate().is_ok());
    }
}
