//! Content records shared by the fetch and generate stages.
//!
//! These types mirror the projections the content queries return and are
//! serialized unchanged into `props.json` between stages. Field names follow
//! the backend's camelCase convention on the wire.

use crate::rich_text::RichText;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One blog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default = "untitled")]
    pub title: String,
    /// Empty when the document has no slug yet. Such posts cannot be routed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// ISO-8601 date or datetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: RichText,
}

fn untitled() -> String {
    "Untitled".to_string()
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Post {
    /// Whether the post has a URL.
    pub fn is_routable(&self) -> bool {
        !self.slug.is_empty()
    }

    /// The post date as an instant. Plain dates are midnight UTC; an
    /// unparseable date is `None`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default = "anonymous")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<Image>,
}

fn anonymous() -> String {
    "Anonymous".to_string()
}

/// A resolved image asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Site-wide settings document.
///
/// A backend without a settings document yields [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub title: String,
    pub description: RichText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<OgImage>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Blog.".to_string(),
            description: RichText::new(),
            og_image: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OgImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A post together with the stories listed below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAndMore {
    pub post: Post,
    #[serde(default)]
    pub more_posts: Vec<Post>,
}
