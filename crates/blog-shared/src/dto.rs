//! Form payloads submitted by the browser.

use serde::{Deserialize, Serialize};

/// Body of `POST /blog/delete/{post_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletePostForm {
    /// Page to return to once the post is gone.
    #[serde(default)]
    pub current_page: Option<String>,
}

/// Sign-in form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Query string of `GET /login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}
