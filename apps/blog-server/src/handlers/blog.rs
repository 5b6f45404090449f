//! Blog handlers: list and create, edit, delete.

use actix_web::{HttpResponse, http::StatusCode, web};
use uuid::Uuid;

use blog_core::DomainError;
use blog_core::authz::ElevatedOnly;
use blog_core::domain::Post;
use blog_core::validation::{PostForm, PostInput, validate_post};
use blog_shared::dto::DeletePostForm;

use crate::flash::Flash;
use crate::middleware::auth::{CurrentUser, guard};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{self, BlogPage, EditPostPage, PostView, Viewer};

/// The post list page.
pub const BLOG: &str = "/blog";

const PUBLISHED: &str = "Congrats, your Post was published!";
const PUBLISH_FAILED: &str = "Post failed to be published. Please check your form inputs.";
const UPDATED: &str = "Post Updated";
const UPDATE_FAILED: &str = "Updating post failed. Please check your form inputs.";
const DELETED: &str = "Post deleted";

async fn render_blog(
    state: &AppState,
    user: &CurrentUser,
    mut flash: Flash,
    form: PostForm,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_newest_first().await?;

    let page = BlogPage {
        viewer: Viewer::from(user.requester()),
        messages: flash.drain(),
        posts: posts.iter().map(PostView::from).collect(),
        form,
    };
    views::render(page, StatusCode::OK, &flash)
}

fn render_edit(
    user: &CurrentUser,
    mut flash: Flash,
    post: &Post,
    form: PostForm,
) -> AppResult<HttpResponse> {
    let page = EditPostPage {
        viewer: Viewer::from(user.requester()),
        messages: flash.drain(),
        post: PostView::from(post),
        form,
    };
    views::render(page, StatusCode::OK, &flash)
}

/// Load a post by its raw path identifier. Malformed ids are simply not found.
async fn find_post(state: &AppState, raw_id: &str) -> Result<Post, DomainError> {
    let not_found = || DomainError::NotFound {
        entity_type: "Post",
        id: raw_id.to_string(),
    };

    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    state.posts.find_by_id(id).await?.ok_or_else(not_found)
}

/// GET /blog
pub async fn view_blog(
    state: web::Data<AppState>,
    user: CurrentUser,
    flash: Flash,
) -> AppResult<HttpResponse> {
    render_blog(&state, &user, flash, PostForm::empty()).await
}

/// POST /blog
pub async fn create_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    mut flash: Flash,
    body: web::Form<PostInput>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner();

    match validate_post(&input) {
        Ok(cleaned) => {
            let post = state
                .posts
                .create(Post::from_cleaned(cleaned, chrono::Utc::now()))
                .await?;
            tracing::info!(post_id = %post.id, "Post published");

            flash.success(PUBLISHED);
            Ok(views::redirect(BLOG, &flash))
        }
        Err(errors) => {
            tracing::debug!(%errors, "Rejected new post");
            flash.error(PUBLISH_FAILED);
            render_blog(&state, &user, flash, PostForm::rejected(input, errors)).await
        }
    }
}

/// GET /blog/edit/{post_id}
pub async fn edit_post_page(
    state: web::Data<AppState>,
    user: CurrentUser,
    mut flash: Flash,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    if let Err(denied) = guard(&ElevatedOnly, &user, &mut flash, "edit_post") {
        return Ok(denied);
    }

    let post = find_post(&state, &path).await?;

    flash.info(format!("Warning you are editing {}", post.title));
    render_edit(&user, flash, &post, PostForm::prefilled(&post))
}

/// POST /blog/edit/{post_id}
pub async fn update_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    mut flash: Flash,
    path: web::Path<String>,
    body: web::Form<PostInput>,
) -> AppResult<HttpResponse> {
    if let Err(denied) = guard(&ElevatedOnly, &user, &mut flash, "update_post") {
        return Ok(denied);
    }

    let mut post = find_post(&state, &path).await?;
    let input = body.into_inner();

    match validate_post(&input) {
        Ok(cleaned) => {
            post.apply(cleaned);
            let post = state.posts.update(post).await?;
            tracing::info!(post_id = %post.id, "Post updated");

            flash.success(UPDATED);
            Ok(views::redirect(BLOG, &flash))
        }
        Err(errors) => {
            tracing::debug!(post_id = %post.id, %errors, "Rejected post update");
            flash.error(UPDATE_FAILED);
            render_edit(&user, flash, &post, PostForm::rejected(input, errors))
        }
    }
}

/// POST /blog/delete/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    mut flash: Flash,
    path: web::Path<String>,
    body: Option<web::Form<DeletePostForm>>,
) -> AppResult<HttpResponse> {
    if let Err(denied) = guard(&ElevatedOnly, &user, &mut flash, "delete_post") {
        return Ok(denied);
    }

    let current_page = body.as_ref().and_then(|form| form.current_page.as_deref());
    let target = views::same_site_path(current_page, BLOG);

    let post = find_post(&state, &path).await?;
    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    flash.success(DELETED);
    Ok(views::redirect(target, &flash))
}
