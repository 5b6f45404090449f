//! Page templates and the helpers that turn them into responses.

use actix_web::{HttpResponse, http::StatusCode, http::header};
use askama::Template;

use blog_core::authz::Requester;
use blog_core::domain::Post;
use blog_core::validation::PostForm;
use blog_shared::StatusMessage;

use crate::flash::Flash;
use crate::middleware::error::AppResult;

/// Navigation state of whoever is looking at the page.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub signed_in: bool,
    pub is_admin: bool,
}

impl From<&Requester> for Viewer {
    fn from(requester: &Requester) -> Self {
        Self {
            signed_in: requester.is_authenticated(),
            is_admin: requester.is_elevated(),
        }
    }
}

/// A post as shown on a page.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub article: String,
    pub date: String,
    pub image_src: String,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            article: post.article.clone(),
            date: post.date.format("%B %-d, %Y %H:%M").to_string(),
            image_src: post.image.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogPage {
    pub viewer: Viewer,
    pub messages: Vec<StatusMessage>,
    pub posts: Vec<PostView>,
    pub form: PostForm,
}

#[derive(Template)]
#[template(path = "edit_post.html")]
pub struct EditPostPage {
    pub viewer: Viewer,
    pub messages: Vec<StatusMessage>,
    pub post: PostView,
    pub form: PostForm,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub viewer: Viewer,
    pub messages: Vec<StatusMessage>,
    pub email: String,
    pub next: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub viewer: Viewer,
    pub messages: Vec<StatusMessage>,
}

/// Error responses are built without the request, so the page leaves out
/// the sign-in and sign-out links rather than guess who is looking.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub viewer: Viewer,
    pub messages: Vec<StatusMessage>,
    pub status: u16,
    pub title: String,
    pub detail: String,
}

impl ErrorPage {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            viewer: Viewer::default(),
            messages: Vec::new(),
            status: status.as_u16(),
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// Render `page` with `status`, clearing messages the page has shown.
pub fn render<T: Template>(page: T, status: StatusCode, flash: &Flash) -> AppResult<HttpResponse> {
    let html = page.render()?;
    let mut builder = HttpResponse::build(status);
    flash.attach(&mut builder);
    Ok(builder.content_type("text/html; charset=utf-8").body(html))
}

/// 303 redirect carrying any pending messages.
pub fn redirect(location: &str, flash: &Flash) -> HttpResponse {
    let mut builder = HttpResponse::SeeOther();
    flash.attach(&mut builder);
    builder
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// `target` when it stays on this site, otherwise `fallback`.
pub fn same_site_path<'a>(target: Option<&'a str>, fallback: &'a str) -> &'a str {
    match target.map(str::trim) {
        Some(path) if is_site_relative(path) => path,
        _ => fallback,
    }
}

/// One leading `/` not followed by another separator, and no control
/// characters (browsers drop tabs, header values refuse the rest).
fn is_site_relative(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !path.chars().any(|c| c.is_ascii_control())
}
