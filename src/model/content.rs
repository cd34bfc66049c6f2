use serde::{Deserialize, Serialize};

use crate::globals::FALLBACK_BANNERS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub src: String,
    pub link: String,
}

impl Banner {
    pub fn fallback() -> Vec<Banner> {
        FALLBACK_BANNERS.iter().map(|(src, link)| Banner { src: src.to_string(), link: link.to_string() }).collect()
    }
}

/// Sent by the backend as its integer discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NewsKind {
    #[default]
    Default,
    New,
}

impl TryFrom<u8> for NewsKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Default),
            1 => Ok(Self::New),
            other => Err(format!("unknown message kind {other}")),
        }
    }
}

impl From<NewsKind> for u8 {
    fn from(kind: NewsKind) -> Self {
        kind as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsMessage {
    pub message: String,
    pub date: i64,
    pub link: String,
    #[serde(default)]
    pub kind: NewsKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub name: String,
    pub link: String,
    pub icon: String,
}

/// Per-endpoint content returned by `set_current_endpoint`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointContent {
    pub banners: Vec<Banner>,
    pub messages: Vec<NewsMessage>,
    pub links: Vec<Link>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagesPayload {
    pub messages: Vec<NewsMessage>,
}
