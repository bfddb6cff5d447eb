use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Church {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub denomination: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}
