use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobListingPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub position_type: Option<String>,
    pub location: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 5000))]
    pub requirements: Option<String>,
    pub compensation: Option<String>,
}

/// Content edits by the owning church. Listing status is never part of an edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateJobListingPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub position_type: Option<String>,
    pub location: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 5000))]
    pub requirements: Option<String>,
    pub compensation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_required() {
        let payload = CreateJobListingPayload {
            title: String::new(),
            position_type: Some("Full-time".into()),
            location: None,
            description: Some("Lead worship".into()),
            requirements: None,
            compensation: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn update_ignores_unknown_status_field() {
        let payload: UpdateJobListingPayload =
            serde_json::from_str(r#"{"title":"Associate Pastor","status":"approved"}"#)
                .expect("payload parses");
        assert_eq!(payload.title.as_deref(), Some("Associate Pastor"));
        assert!(payload.validate().is_ok());
    }
}
