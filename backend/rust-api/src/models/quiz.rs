use serde::{Deserialize, Serialize};

use super::gating::TaskGateStatus;
use super::task::{GamePrompt, GameType};

/// Client-side route a navigation decision points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Quiz(u32),
    Score,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Quiz(page) => format!("/quiz/{}", page),
            Route::Score => "/score".to_string(),
        }
    }
}

impl Serialize for Route {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path())
    }
}

/// Redirect plus the transient message shown to the player.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationNotice {
    pub redirect_to: Route,
    pub message: String,
}

impl NavigationNotice {
    pub fn new(redirect_to: Route, message: impl Into<String>) -> Self {
        Self {
            redirect_to,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationOutcome {
    pub route: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub game_type: GameType,
    pub status: TaskGateStatus,
    pub prompt: GamePrompt,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: u32,
    pub total_pages: u32,
    pub tasks: Vec<TaskView>,
    pub completed_count: usize,
    pub all_completed: bool,
    pub has_adblock: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    pub score: String,
    pub session_id: String,
    pub minutes_taken: i64,
    pub share_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub page: u32,
    pub tasks: Vec<CatalogTask>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub game_type: GameType,
    pub prompt: GamePrompt,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOverview {
    pub total_pages: u32,
    pub pages: Vec<CatalogPage>,
}

#[derive(Debug, Deserialize)]
pub struct AdblockReport {
    pub detected: bool,
}
