use serde::{Deserialize, Serialize};
use time::{Date, Time};
use uuid::Uuid;
use validator::Validate;

// Events carry wall-clock times as "HH:MM".
time::serde::format_description!(clock_time, Time, "[hour]:[minute]");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ClubEvent {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub date: Date,
    #[serde(with = "clock_time")]
    pub time: Time,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    pub date: Date,
    #[serde(with = "clock_time")]
    pub time: Time,
    #[serde(default)]
    pub description: String,
}
