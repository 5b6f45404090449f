//! Sign-in and sign-out.

use actix_web::{HttpResponse, http::StatusCode, web};

use blog_core::domain::User;
use blog_core::ports::AuthError;
use blog_shared::dto::{LoginForm, LoginQuery};

use crate::flash::Flash;
use crate::middleware::auth::{CurrentUser, session_cookie, session_removal_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{self, LoginPage, Viewer};

use super::blog::BLOG;

const BAD_CREDENTIALS: &str = "Invalid email or password.";

fn render_login(
    user: &CurrentUser,
    mut flash: Flash,
    email: String,
    next: Option<String>,
) -> AppResult<HttpResponse> {
    let page = LoginPage {
        viewer: Viewer::from(user.requester()),
        messages: flash.drain(),
        email,
        next: next.unwrap_or_default(),
    };
    views::render(page, StatusCode::OK, &flash)
}

/// Look up the account and check its password.
async fn authenticate(state: &AppState, email: &str, password: &str) -> AppResult<User> {
    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or(AppError::Unauthenticated(AuthError::InvalidCredentials))?;

    let valid = state
        .passwords
        .verify(password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthenticated(AuthError::InvalidCredentials));
    }

    Ok(user)
}

/// GET /login
pub async fn login_page(
    user: CurrentUser,
    flash: Flash,
    query: web::Query<LoginQuery>,
) -> AppResult<HttpResponse> {
    render_login(&user, flash, String::new(), query.into_inner().next)
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    user: CurrentUser,
    mut flash: Flash,
    body: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    let email = form.email.trim().to_string();

    let account = match authenticate(&state, &email, &form.password).await {
        Ok(account) => account,
        Err(AppError::Unauthenticated(e)) => {
            tracing::info!(reason = %e, "Sign-in refused");
            flash.error(BAD_CREDENTIALS);
            return render_login(&user, flash, email, form.next);
        }
        Err(e) => return Err(e),
    };

    let token = state
        .tokens
        .generate_token(account.id, &account.email, account.roles())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!(user_id = %account.id, is_admin = account.is_admin, "Signed in");

    flash.success(format!("Signed in as {}", account.email));
    let target = views::same_site_path(form.next.as_deref(), BLOG);
    let mut response = views::redirect(target, &flash);
    response
        .add_cookie(&session_cookie(
            token,
            state.tokens.expiration_seconds(),
            state.session_cookie_secure,
        ))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// POST /logout
pub async fn logout(mut flash: Flash) -> AppResult<HttpResponse> {
    flash.info("You have been signed out.");
    let mut response = views::redirect(BLOG, &flash);
    response
        .add_cookie(&session_removal_cookie())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}
