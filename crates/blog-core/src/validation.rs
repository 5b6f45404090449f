//! Post form validation.
//!
//! Turns raw submitted fields into either a [`CleanedPost`] or a set of
//! field-level [`FieldErrors`]. Every persisted field comes out of
//! [`validate_post`]; handlers never read raw input past this point.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::Post;

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 200;

const REQUIRED: &str = "This field is required.";
const INVALID_DATE: &str = "Enter a valid date/time.";
const INVALID_IMAGE: &str = "Enter a valid image URL or path.";

/// Format used to pre-fill `<input type="datetime-local">`.
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Raw post fields as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostInput {
    pub title: String,
    pub article: String,
    pub date: String,
    pub image: String,
}

impl From<&Post> for PostInput {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            article: post.article.clone(),
            date: post.date.format(DATE_INPUT_FORMAT).to_string(),
            image: post.image.clone().unwrap_or_default(),
        }
    }
}

/// Validated post fields, ready to be applied to a [`Post`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub title: String,
    pub article: String,
    pub date: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

/// Field name to error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    /// Messages for one field, empty if the field is valid.
    pub fn for_field(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.for_field(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the fields that failed.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().copied()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Transient form state for one request: the values shown in the form and
/// any errors attached to them.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub values: PostInput,
    pub errors: FieldErrors,
}

impl PostForm {
    /// An empty creation form.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A form pre-filled from an existing post.
    pub fn prefilled(post: &Post) -> Self {
        Self {
            values: PostInput::from(post),
            errors: FieldErrors::default(),
        }
    }

    /// The user's rejected input with its errors.
    pub fn rejected(values: PostInput, errors: FieldErrors) -> Self {
        Self { values, errors }
    }
}

/// Validate raw post fields.
pub fn validate_post(input: &PostInput) -> Result<CleanedPost, FieldErrors> {
    let mut errors = FieldErrors::default();

    let title = input.title.trim();
    if title.is_empty() {
        errors.add("title", REQUIRED);
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("Ensure this value has at most {TITLE_MAX_CHARS} characters."),
        );
    }

    let article = input.article.trim();
    if article.is_empty() {
        errors.add("article", REQUIRED);
    }

    let date = match input.date.trim() {
        "" => None,
        raw => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                errors.add("date", INVALID_DATE);
            }
            parsed
        }
    };

    let image = match input.image.trim() {
        "" => None,
        raw if is_valid_image_ref(raw) => Some(raw.to_string()),
        _ => {
            errors.add("image", INVALID_IMAGE);
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CleanedPost {
        title: title.to_string(),
        article: article.to_string(),
        date,
        image,
    })
}

/// Parse a submitted date. Naive values are taken as UTC.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn is_valid_image_ref(raw: &str) -> bool {
    if raw.starts_with('/') {
        return !raw.starts_with("//")
            && !raw.starts_with("/\\")
            && !raw.contains(|c: char| c.is_whitespace() || c.is_ascii_control());
    }

    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(title: &str, article: &str) -> PostInput {
        PostInput {
            title: title.to_string(),
            article: article.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_input_is_trimmed() {
        let cleaned = validate_post(&input("  Hello ", "World\n")).unwrap();

        assert_eq!(cleaned.title, "Hello");
        assert_eq!(cleaned.article, "World");
        assert_eq!(cleaned.date, None);
        assert_eq!(cleaned.image, None);
    }

    #[test]
    fn test_missing_required_fields_reported_together() {
        let errors = validate_post(&input("", "   ")).unwrap_err();

        assert_eq!(errors.for_field("title"), ["This field is required."]);
        assert_eq!(errors.for_field("article"), ["This field is required."]);
        assert!(errors.for_field("date").is_empty());
    }

    #[test]
    fn test_title_too_long() {
        let long = "x".repeat(TITLE_MAX_CHARS + 1);
        let errors = validate_post(&input(&long, "Body")).unwrap_err();

        assert!(errors.has("title"));
        assert!(!errors.has("article"));
    }

    #[test]
    fn test_title_at_limit_counts_chars_not_bytes() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert!(validate_post(&input(&title, "Body")).is_ok());
    }

    #[test]
    fn test_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();

        for raw in [
            "2024-03-09T14:30",
            "2024-03-09T14:30:00",
            "2024-03-09 14:30",
            "2024-03-09 14:30:00",
            "2024-03-09T15:30:00+01:00",
        ] {
            let mut form = input("T", "A");
            form.date = raw.to_string();
            assert_eq!(validate_post(&form).unwrap().date, Some(expected), "{raw}");
        }

        let mut form = input("T", "A");
        form.date = "2024-03-09".to_string();
        assert_eq!(
            validate_post(&form).unwrap().date,
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        let mut form = input("T", "A");
        form.date = "next tuesday".to_string();

        let errors = validate_post(&form).unwrap_err();
        assert_eq!(errors.for_field("date"), ["Enter a valid date/time."]);
    }

    #[test]
    fn test_image_references() {
        for ok in ["https://example.com/a.png", "http://cdn.test/x.jpg", "/media/a.png"] {
            let mut form = input("T", "A");
            form.image = ok.to_string();
            assert_eq!(validate_post(&form).unwrap().image.as_deref(), Some(ok));
        }

        for bad in [
            "javascript:alert(1)",
            "//evil.test/a.png",
            "/\\evil.test/a.png",
            "ftp://host/a.png",
            "a.png",
        ] {
            let mut form = input("T", "A");
            form.image = bad.to_string();
            assert!(validate_post(&form).unwrap_err().has("image"), "{bad}");
        }
    }

    #[test]
    fn test_prefilled_form_round_trips_through_validator() {
        let date = Utc.with_ymd_and_hms(2023, 12, 24, 18, 5, 0).unwrap();
        let post = Post::new("Title".into(), "Body".into(), date, None);

        let form = PostForm::prefilled(&post);
        assert_eq!(form.values.date, "2023-12-24T18:05");

        let cleaned = validate_post(&form.values).unwrap();
        assert_eq!(cleaned.date, Some(date));
        assert_eq!(cleaned.title, "Title");
    }

    #[test]
    fn test_field_errors_display() {
        let errors = validate_post(&input("", "")).unwrap_err();
        assert_eq!(errors.to_string(), "invalid fields: article, title");
    }
}
