use serde::{Deserialize, Serialize};

/// Per-user side panel shown next to the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidePanel {
    pub user: PanelUser,
    #[serde(default)]
    pub weather: Option<serde_json::Value>,
    #[serde(default)]
    pub almanac: Option<Almanac>,
    #[serde(default)]
    pub quote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Almanac {
    pub date: String,
    pub weekday: String,
    pub lunar_text: String,
    #[serde(default)]
    pub yi: Vec<String>,
    #[serde(default)]
    pub ji: Vec<String>,
}
