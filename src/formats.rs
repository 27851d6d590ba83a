use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `content/events-config.json`: poster filename → event metadata.
pub type EventsConfig = BTreeMap<String, EventRecord>;

/// `content/officers-config.json`: profile picture filename → officer metadata.
pub type OfficersConfig = BTreeMap<String, OfficerRecord>;

/// `content/photos-config.json`: photo filename → caption.
pub type PhotosConfig = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfficerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
