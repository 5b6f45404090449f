//! Home page.

use actix_web::{HttpResponse, http::StatusCode};

use crate::flash::Flash;
use crate::middleware::auth::CurrentUser;
use crate::middleware::error::AppResult;
use crate::views::{self, HomePage, Viewer};

/// GET /
pub async fn index(user: CurrentUser, mut flash: Flash) -> AppResult<HttpResponse> {
    let page = HomePage {
        viewer: Viewer::from(user.requester()),
        messages: flash.drain(),
    };
    views::render(page, StatusCode::OK, &flash)
}
