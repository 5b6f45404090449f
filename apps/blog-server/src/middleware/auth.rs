//! Requester identity and the authorization guard for gated handlers.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};

use blog_core::authz::{self, Policy, Requester};

use crate::flash::Flash;
use crate::state::AppState;
use crate::views::redirect;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "blog_session";

/// Shown when a gated action is refused.
pub const ACCESS_DENIED: &str = "Access Denied. Site Admins Only";

/// Where refused requesters are sent.
pub const HOME: &str = "/";

/// The requester behind the current request.
///
/// Never fails: a missing, expired or forged token yields an anonymous
/// requester.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Requester);

impl CurrentUser {
    pub fn requester(&self) -> &Requester {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(token) = bearer_token(req) else {
            return ready(Ok(CurrentUser(Requester::Anonymous)));
        };

        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Ok(CurrentUser(Requester::Anonymous)));
        };

        let requester = match state.tokens.validate_token(&token) {
            Ok(claims) => Requester::User {
                user_id: claims.user_id,
                roles: claims.roles,
            },
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session token");
                Requester::Anonymous
            }
        };

        ready(Ok(CurrentUser(requester)))
    }
}

/// Run `policy` before a gated operation.
///
/// On refusal the access-denied message is queued and the returned redirect
/// to the home page must be sent as-is; the store has not been touched.
pub fn guard(
    policy: &dyn Policy,
    user: &CurrentUser,
    flash: &mut Flash,
    action: &'static str,
) -> Result<(), HttpResponse> {
    match authz::authorize(policy, user.requester()) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(action, reason = %e, "Gated action refused");
            flash.error(ACCESS_DENIED);
            Err(redirect(HOME, flash))
        }
    }
}

/// Session cookie carrying `token`.
pub fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

/// Cookie that clears the session.
pub fn session_removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use blog_infra::JwtConfig;
    use uuid::Uuid;

    fn state() -> AppState {
        AppState::in_memory(JwtConfig {
            secret: "auth-test".to_string(),
            ..JwtConfig::default()
        })
    }

    fn extract(req: &HttpRequest) -> Requester {
        CurrentUser::from_request(req, &mut Payload::None)
            .into_inner()
            .unwrap()
            .0
    }

    #[test]
    fn test_no_token_is_anonymous() {
        let req = TestRequest::default()
            .app_data(web::Data::new(state()))
            .to_http_request();
        assert_eq!(extract(&req), Requester::Anonymous);
    }

    #[test]
    fn test_session_cookie_identifies_admin() {
        let state = state();
        let user_id = Uuid::new_v4();
        let token = state
            .tokens
            .generate_token(user_id, "admin@example.com", vec!["admin".into()])
            .unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(state))
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_http_request();

        let requester = extract(&req);
        assert!(requester.is_elevated());
        assert_eq!(
            requester,
            Requester::User {
                user_id,
                roles: vec!["admin".to_string()]
            }
        );
    }

    #[test]
    fn test_bearer_header_is_accepted() {
        let state = state();
        let token = state
            .tokens
            .generate_token(Uuid::new_v4(), "u@example.com", vec!["user".into()])
            .unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(state))
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_http_request();

        let requester = extract(&req);
        assert!(requester.is_authenticated());
        assert!(!requester.is_elevated());
    }

    #[test]
    fn test_forged_token_is_anonymous() {
        let other = AppState::in_memory(JwtConfig {
            secret: "someone-else".to_string(),
            ..JwtConfig::default()
        });
        let token = other
            .tokens
            .generate_token(Uuid::new_v4(), "x@example.com", vec!["admin".into()])
            .unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(state()))
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_http_request();

        assert_eq!(extract(&req), Requester::Anonymous);
    }
}
