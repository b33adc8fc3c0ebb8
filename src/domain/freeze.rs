//! Usage: Freeze request payload, listing item schema, and the exclusion list.

use crate::shared::error::{AppError, AppResult, ErrorCode};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezeReason {
    Other,
    /// The freeze service spells this value `personnal`; both spellings are accepted.
    #[serde(rename = "personnal", alias = "personal")]
    Personal,
    Professional,
    Medical,
}

impl FreezeReason {
    pub const ALL: [FreezeReason; 4] = [
        FreezeReason::Other,
        FreezeReason::Personal,
        FreezeReason::Professional,
        FreezeReason::Medical,
    ];

    /// Value sent to the freeze service.
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::Personal => "personnal",
            Self::Professional => "professional",
            Self::Medical => "medical",
        }
    }
}

impl fmt::Display for FreezeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for FreezeReason {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "other" => Ok(Self::Other),
            "personal" | "personnal" => Ok(Self::Personal),
            "professional" => Ok(Self::Professional),
            "medical" => Ok(Self::Medical),
            _ => Err(AppError::with_code(
                ErrorCode::Validation,
                "invalid reason; choose from: other, personal, professional, medical",
            )),
        }
    }
}

/// Body of `POST /freezes/compensation/bulk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeRequest {
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(
        rename = "excluded_user_ids",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub excluded_ids: Vec<String>,
    pub begin_date: NaiveDate,
    pub expected_end_date: NaiveDate,
    pub reason: FreezeReason,
    pub is_free_freeze: bool,
    pub student_description: String,
    pub staff_description: String,
}

impl FreezeRequest {
    pub fn exclusions(&self) -> ExclusionList {
        ExclusionList::new(self.excluded_ids.iter().map(String::as_str))
    }

    pub fn with_users(mut self, logins: Vec<String>) -> Self {
        self.user_ids = logins;
        self
    }

    /// Copy sent to the freeze service: the exclusion list only drives collection.
    pub fn for_submission(&self) -> Self {
        Self {
            excluded_ids: Vec::new(),
            ..self.clone()
        }
    }

    pub fn render_review(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            AppError::with_code(
                ErrorCode::Internal,
                format!("failed to render freeze request: {e}"),
            )
        })
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteUser {
    pub id: i64,
    pub login: String,
    #[serde(rename = "active?", default, deserialize_with = "null_as_false")]
    pub is_active: bool,
    #[serde(rename = "staff?", default, deserialize_with = "null_as_false")]
    pub is_staff: bool,
}

/// One listing item; the user record is nested under `user`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestUser {
    pub user: RemoteUser,
}

/// Logins and numeric IDs that must never end up in a freeze request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    logins: HashSet<String>,
    ids: HashSet<i64>,
}

impl ExclusionList {
    pub fn new<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let mut list = Self::default();
        for entry in entries {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            if let Ok(id) = entry.parse::<i64>() {
                list.ids.insert(id);
            }
            list.logins.insert(entry.to_string());
        }
        list
    }

    pub fn matches_id(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn matches_login(&self, login: &str) -> bool {
        self.logins.contains(login)
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }
}
