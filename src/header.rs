//! Blog header rendering.
//!
//! Every page opens with one of two header shapes:
//!
//! - **Primary** (level 1): the site title as a large `h1` next to the
//!   rich-text site description. Columns stack on narrow viewports and sit
//!   side by side from the `md` breakpoint up.
//! - **Secondary** (level 2): a smaller `h2` whose title links back to `/`.
//!
//! [`HeadingLevel`] is a closed enum, so [`render_header`] cannot fail.
//! Untyped input (CLI arguments, JSON) goes through
//! [`HeadingLevel::from_value`], which rejects anything but `1` or `2`.

use crate::rich_text::{self, Block};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Carries the offending value's JSON form, or its type name when it has none.
    #[error("Invalid level: {0}, only 1 or 2 are allowed")]
    InvalidHeadingLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "u8")]
pub enum HeadingLevel {
    /// Level 1: site title with description.
    Primary,
    /// Level 2: compact title linking home.
    Secondary,
}

impl HeadingLevel {
    /// Validate an untyped level. Integral `1` and `2` are accepted, in any
    /// numeric representation (`1`, `1.0`).
    pub fn from_value(value: &Value) -> Result<Self, HeaderError> {
        match value.as_f64() {
            Some(n) if n == 1.0 => Ok(Self::Primary),
            Some(n) if n == 2.0 => Ok(Self::Secondary),
            _ => Err(HeaderError::InvalidHeadingLevel(value.to_string())),
        }
    }

    /// Like [`from_value`](Self::from_value), treating a missing value as
    /// type `undefined`.
    pub fn from_optional(value: Option<&Value>) -> Result<Self, HeaderError> {
        match value {
            Some(value) => Self::from_value(value),
            None => Err(HeaderError::InvalidHeadingLevel("undefined".to_string())),
        }
    }
}

impl TryFrom<Value> for HeadingLevel {
    type Error = HeaderError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = HeaderError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::from_value(&Value::from(level))
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        match level {
            HeadingLevel::Primary => 1,
            HeadingLevel::Secondary => 2,
        }
    }
}

/// Render a blog header.
///
/// `description` only appears in the primary shape; an absent description
/// renders as an empty rich-text block.
pub fn render_header(title: &str, description: Option<&[Block]>, level: HeadingLevel) -> Markup {
    match level {
        HeadingLevel::Primary => html! {
            header class="mb-10 mt-16 flex flex-col items-center md:mb-12 md:flex-row md:justify-between text-pretty" {
                h1 class="text-6xl font-bold leading-tight tracking-tighter md:pr-8 md:text-8xl" {
                    (title)
                }
                h4 class="mt-5 text-center text-lg md:pl-8 md:text-left portable-text" {
                    (rich_text::render(description.unwrap_or_default()))
                }
            }
        },
        HeadingLevel::Secondary => html! {
            header {
                h2 class="mb-20 mt-8 text-2xl font-bold leading-tight tracking-tight md:text-4xl md:tracking-tighter text-pretty" {
                    a href="/" class="hover:underline" { (title) }
                }
            }
        },
    }
}

/// Render a header from an unvalidated level.
pub fn render_header_checked(
    title: &str,
    description: Option<&[Block]>,
    level: &Value,
) -> Result<Markup, HeaderError> {
    let level = HeadingLevel::from_value(level)?;
    Ok(render_header(title, description, level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::paragraph;
    use serde_json::json;

    #[test]
    fn primary_header_has_title_and_description() {
        let description = paragraph("Hello world");
        let html = render_header("My Blog", Some(description.as_slice()), HeadingLevel::Primary).into_string();

        assert!(html.starts_with("<header"));
        assert!(html.contains(">My Blog</h1>"));
        assert!(html.contains("<p>Hello world</p></h4>"));
        assert!(html.contains("portable-text"));
        assert!(!html.contains("<a "));
    }

    #[test]
    fn primary_header_is_responsive() {
        let html = render_header("T", None, HeadingLevel::Primary).into_string();
        assert!(html.contains("flex-col"));
        assert!(html.contains("md:flex-row"));
    }

    #[test]
    fn primary_header_without_description_renders_empty_block() {
        let html = render_header("My Blog", None, HeadingLevel::Primary).into_string();
        assert!(html.contains("portable-text\"></h4>"));
    }

    #[test]
    fn secondary_header_links_home() {
        let html = render_header("My Blog", None, HeadingLevel::Secondary).into_string();

        assert!(html.contains("<h2"));
        assert!(html.contains(r#"<a href="/" class="hover:underline">My Blog</a>"#));
        assert!(!html.contains("<h1"));
    }

    #[test]
    fn secondary_header_ignores_description() {
        let description = paragraph("Hidden");
        let html =
            render_header("My Blog", Some(description.as_slice()), HeadingLevel::Secondary).into_string();
        assert!(!html.contains("Hidden"));
    }

    #[test]
    fn title_is_escaped() {
        let html = render_header("<b>x</b>", None, HeadingLevel::Secondary).into_string();
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let description = paragraph("Same");
        for level in [HeadingLevel::Primary, HeadingLevel::Secondary] {
            let a = render_header("T", Some(description.as_slice()), level).into_string();
            let b = render_header("T", Some(description.as_slice()), level).into_string();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn from_value_accepts_one_and_two() {
        assert_eq!(HeadingLevel::from_value(&json!(1)), Ok(HeadingLevel::Primary));
        assert_eq!(HeadingLevel::from_value(&json!(2)), Ok(HeadingLevel::Secondary));
        assert_eq!(HeadingLevel::from_value(&json!(2.0)), Ok(HeadingLevel::Secondary));
    }

    #[test]
    fn from_value_rejects_everything_else() {
        let cases = [
            (json!(0), "0"),
            (json!(3), "3"),
            (json!(1.5), "1.5"),
            (json!("a"), "\"a\""),
            (json!("1"), "\"1\""),
            (json!(null), "null"),
            (json!([1]), "[1]"),
        ];
        for (value, repr) in cases {
            let err = HeadingLevel::from_value(&value).unwrap_err();
            assert_eq!(err, HeaderError::InvalidHeadingLevel(repr.to_string()));
        }
    }

    #[test]
    fn missing_level_reports_type_name() {
        let err = HeadingLevel::from_optional(None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid level: undefined, only 1 or 2 are allowed"
        );
    }

    #[test]
    fn checked_render_fails_on_level_three() {
        let err = render_header_checked("X", Some(&[][..]), &json!(3)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid level: 3, only 1 or 2 are allowed");
    }

    #[test]
    fn checked_render_matches_typed_render() {
        let checked = render_header_checked("My Blog", None, &json!(2))
            .unwrap()
            .into_string();
        let typed = render_header("My Blog", None, HeadingLevel::Secondary).into_string();
        assert_eq!(checked, typed);
    }

    #[test]
    fn level_deserializes_through_validation() {
        let level: HeadingLevel = serde_json::from_str("1").unwrap();
        assert_eq!(level, HeadingLevel::Primary);
        assert!(serde_json::from_str::<HeadingLevel>("3").is_err());
        assert_eq!(serde_json::to_string(&HeadingLevel::Secondary).unwrap(), "2");
    }

    #[test]
    fn try_from_u8() {
        assert_eq!(HeadingLevel::try_from(1u8), Ok(HeadingLevel::Primary));
        assert!(HeadingLevel::try_from(4u8).is_err());
    }
}
