//! Status message transport.
//!
//! Pending messages ride along with a redirect in the `blog_messages`
//! cookie and are drained by the next rendered page.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, HttpResponseBuilder, dev::Payload};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use blog_shared::{StatusMessage, StatusMessages};

/// Cookie carrying pending status messages between requests.
pub const FLASH_COOKIE: &str = "blog_messages";

/// The request's status message queue.
#[derive(Debug, Default)]
pub struct Flash {
    pending: StatusMessages,
    had_cookie: bool,
}

impl Flash {
    pub fn success(&mut self, text: impl Into<String>) {
        self.pending.success(text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.pending.error(text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.pending.info(text);
    }

    /// Take every pending message for display on the page being rendered.
    pub fn drain(&mut self) -> Vec<StatusMessage> {
        self.pending.drain()
    }

    /// Persist what is still pending onto the response, or clear the cookie
    /// once everything has been shown.
    pub fn attach(&self, builder: &mut HttpResponseBuilder) {
        if !self.pending.is_empty() {
            match encode(&self.pending) {
                Some(value) => {
                    builder.cookie(
                        Cookie::build(FLASH_COOKIE, value)
                            .path("/")
                            .http_only(true)
                            .same_site(SameSite::Lax)
                            .finish(),
                    );
                }
                None => tracing::warn!("Dropping status messages that failed to encode"),
            }
        } else if self.had_cookie {
            let mut removal = Cookie::build(FLASH_COOKIE, "").path("/").finish();
            removal.make_removal();
            builder.cookie(removal);
        }
    }
}

impl FromRequest for Flash {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let flash = match req.cookie(FLASH_COOKIE) {
            Some(cookie) => Flash {
                pending: decode(cookie.value()).unwrap_or_else(|| {
                    tracing::debug!("Ignoring malformed status message cookie");
                    StatusMessages::new()
                }),
                had_cookie: true,
            },
            None => Flash::default(),
        };

        ready(Ok(flash))
    }
}

fn encode(messages: &StatusMessages) -> Option<String> {
    serde_json::to_vec(messages)
        .ok()
        .map(|json| URL_SAFE_NO_PAD.encode(json))
}

/// Decode a cookie value back into messages.
pub(crate) fn decode(value: &str) -> Option<StatusMessages> {
    let json = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&json).ok()
}
