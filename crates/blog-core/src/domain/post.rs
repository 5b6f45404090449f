use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::CleanedPost;

/// Post entity - a single blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub article: String,
    /// Publication date. Defaults to creation time, editors may move it freely.
    pub date: DateTime<Utc>,
    /// Reference to an attached image (URL or site-relative path).
    pub image: Option<String>,
}

impl Post {
    /// Create a new post with a freshly assigned id.
    pub fn new(title: String, article: String, date: DateTime<Utc>, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            article,
            date,
            image,
        }
    }

    /// Build a new post from validated form output.
    ///
    /// A missing date falls back to `now`.
    pub fn from_cleaned(cleaned: CleanedPost, now: DateTime<Utc>) -> Self {
        Self::new(
            cleaned.title,
            cleaned.article,
            cleaned.date.unwrap_or(now),
            cleaned.image,
        )
    }

    /// Apply an edit. The id never changes; a blank date keeps the current one.
    pub fn apply(&mut self, cleaned: CleanedPost) {
        self.title = cleaned.title;
        self.article = cleaned.article;
        self.image = cleaned.image;
        if let Some(date) = cleaned.date {
            self.date = date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cleaned(title: &str, date: Option<DateTime<Utc>>) -> CleanedPost {
        CleanedPost {
            title: title.to_string(),
            article: "Body".to_string(),
            date,
            image: None,
        }
    }

    #[test]
    fn test_from_cleaned_defaults_date_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let post = Post::from_cleaned(cleaned("Hello", None), now);

        assert_eq!(post.title, "Hello");
        assert_eq!(post.date, now);
    }

    #[test]
    fn test_apply_keeps_id_and_date_when_blank() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut post = Post::from_cleaned(cleaned("Hello", None), now);
        let id = post.id;

        post.apply(cleaned("Renamed", None));

        assert_eq!(post.id, id);
        assert_eq!(post.title, "Renamed");
        assert_eq!(post.date, now);
    }

    #[test]
    fn test_apply_overwrites_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut post = Post::from_cleaned(cleaned("Hello", None), now);

        post.apply(cleaned("Hello", Some(earlier)));

        assert_eq!(post.date, earlier);
    }
}
