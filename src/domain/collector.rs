//! Usage: Paginated listing fetch -> dedup -> exclusion filter, producing freeze targets.
//!
//! Pages are requested strictly in order: the stop condition (a page shorter than the page
//! size) depends on the previous page. A page that cannot be parsed aborts the whole run, since
//! a partial list would understate how many learners the freeze hits.

use super::freeze::{ExclusionList, QuestUser, RemoteUser};
use crate::api::client::ApiClient;
use crate::shared::error::{AppError, AppResult, ErrorCode};
use serde::Deserialize;
use std::collections::HashSet;

pub const DEFAULT_LISTING_PATH: &str = "/quests/37/quests_users";
pub const DEFAULT_CAMPUS_ID: u64 = 41;
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_FIRST_PAGE: u32 = 0;
const BODY_SNIPPET_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    pub listing_path: String,
    pub campus_id: u64,
    pub page_size: u32,
    pub first_page: u32,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            listing_path: DEFAULT_LISTING_PATH.to_string(),
            campus_id: DEFAULT_CAMPUS_ID,
            page_size: DEFAULT_PAGE_SIZE,
            first_page: DEFAULT_FIRST_PAGE,
        }
    }
}

impl CollectorSettings {
    pub fn validate(&self) -> AppResult<()> {
        if self.listing_path.trim().is_empty() {
            return Err(AppError::with_code(
                ErrorCode::Config,
                "collector.listing_path must not be empty",
            ));
        }
        if self.page_size == 0 {
            return Err(AppError::with_code(
                ErrorCode::Config,
                "collector.page_size must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    ExcludedById,
    ExcludedByLogin,
    Staff,
    Inactive,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExcludedById => "excluded_by_id",
            Self::ExcludedByLogin => "excluded_by_login",
            Self::Staff => "staff",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUser {
    pub id: i64,
    pub login: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectOutcome {
    /// Unique logins in first-seen order.
    pub logins: Vec<String>,
    pub skipped: Vec<SkippedUser>,
    pub pages_fetched: u32,
}

/// Running dedup/filter state across pages.
#[derive(Debug, Default)]
pub(crate) struct Selection {
    seen: HashSet<String>,
    logins: Vec<String>,
    skipped: Vec<SkippedUser>,
}

impl Selection {
    fn skip_reason(user: &RemoteUser, excluded: &ExclusionList) -> Option<SkipReason> {
        if excluded.matches_id(user.id) {
            Some(SkipReason::ExcludedById)
        } else if excluded.matches_login(&user.login) {
            Some(SkipReason::ExcludedByLogin)
        } else if user.is_staff {
            Some(SkipReason::Staff)
        } else if !user.is_active {
            Some(SkipReason::Inactive)
        } else {
            None
        }
    }

    pub(crate) fn offer(&mut self, user: &RemoteUser, excluded: &ExclusionList) {
        if let Some(reason) = Self::skip_reason(user, excluded) {
            if reason == SkipReason::Inactive {
                tracing::debug!(id = user.id, login = %user.login, "inactive user ignored");
            } else {
                tracing::info!(
                    id = user.id,
                    login = %user.login,
                    reason = reason.as_str(),
                    "{} is excluded",
                    user.login
                );
            }
            self.skipped.push(SkippedUser {
                id: user.id,
                login: user.login.clone(),
                reason,
            });
            return;
        }

        if self.seen.insert(user.login.clone()) {
            self.logins.push(user.login.clone());
        }
    }

    fn finish(self, pages_fetched: u32) -> CollectOutcome {
        CollectOutcome {
            logins: self.logins,
            skipped: self.skipped,
            pages_fetched,
        }
    }
}

pub struct Collector<'a> {
    client: &'a ApiClient,
    settings: &'a CollectorSettings,
}

impl<'a> Collector<'a> {
    pub fn new(client: &'a ApiClient, settings: &'a CollectorSettings) -> Self {
        Self { client, settings }
    }

    pub fn page_path(&self, page: u32) -> String {
        format!(
            "{}?filter[campus_id]={}&filter[validated]=false&page[size]={}&page[number]={}",
            self.settings.listing_path.trim(),
            self.settings.campus_id,
            self.settings.page_size,
            page
        )
    }

    pub async fn collect(&self, excluded: &ExclusionList) -> AppResult<CollectOutcome> {
        self.settings.validate()?;
        let page_size = self.settings.page_size as usize;
        let mut selection = Selection::default();
        let mut page = self.settings.first_page;
        let mut pages_fetched: u32 = 0;

        loop {
            let users = self.fetch_page(page).await?;
            pages_fetched += 1;
            for item in &users {
                selection.offer(&item.user, excluded);
            }

            tracing::info!(
                service = %self.client.name(),
                page,
                count = users.len(),
                "found {} users on page {}",
                users.len(),
                page
            );
            if users.len() < page_size {
                break;
            }
            page = page.checked_add(1).ok_or_else(|| {
                AppError::with_code(ErrorCode::Fetch, "page number overflowed")
            })?;
        }

        let outcome = selection.finish(pages_fetched);
        tracing::info!(
            users = outcome.logins.len(),
            skipped = outcome.skipped.len(),
            pages = outcome.pages_fetched,
            "found {} users",
            outcome.logins.len()
        );
        Ok(outcome)
    }

    async fn fetch_page(&self, page: u32) -> AppResult<Vec<QuestUser>> {
        let fetch_error = |detail: String| {
            AppError::with_code(
                ErrorCode::Fetch,
                format!("service={} page={page} {detail}", self.client.name()),
            )
        };

        let response = self.client.get(&self.page_path(page)).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(format!("body read failed: {e}")))?;

        if !status.is_success() {
            return Err(fetch_error(format!(
                "listing returned status={} body={}",
                status.as_u16(),
                body.chars().take(BODY_SNIPPET_CHARS).collect::<String>()
            )));
        }

        serde_json::from_str::<Vec<QuestUser>>(&body)
            .map_err(|e| fetch_error(format!("malformed listing body: {e}")))
    }
}
