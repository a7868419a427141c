//! One-shot flash messages.
//!
//! Messages pushed while handling a request are shown by the page that the
//! same request renders. When the response is a redirect (or has no page at
//! all) they are parked in a short-lived cookie and shown, then cleared, by
//! the next page that renders.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::Response,
};

pub const FLASH_COOKIE: &str = "fyyur_flash";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    messages: Vec<String>,
    from_cookie: bool,
}

impl Flash {
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.clone()
    }

    /// Messages were displayed by this response; drop the cookie if one came in.
    pub fn consumed(self, mut response: Response) -> Response {
        if self.from_cookie {
            if let Ok(value) = HeaderValue::from_str(&expired_cookie()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }

    /// Messages were not displayed; carry them to the next rendered page.
    pub fn deferred(self, mut response: Response) -> Response {
        let cookie = if self.messages.is_empty() {
            if !self.from_cookie {
                return response;
            }
            expired_cookie()
        } else {
            build_flash_cookie(&self.messages)
        };

        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }

    fn from_headers(headers: &HeaderMap) -> Self {
        match extract_messages_from_cookie(headers) {
            Some(messages) => Flash {
                messages,
                from_cookie: true,
            },
            None => Flash::default(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Flash::from_headers(&parts.headers))
    }
}

fn extract_messages_from_cookie(headers: &HeaderMap) -> Option<Vec<String>> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = cookie_header.to_str() else {
            continue;
        };

        for cookie_str in cookie_header.split(';') {
            if let Ok(cookie) = cookie::Cookie::parse(cookie_str.trim()) {
                if cookie.name() == FLASH_COOKIE {
                    let decoded = urlencoding::decode(cookie.value()).ok()?;
                    return serde_json::from_str(&decoded).ok();
                }
            }
        }
    }

    None
}

/// Build the cookie string that parks `messages` until the next page.
pub fn build_flash_cookie(messages: &[String]) -> String {
    let payload = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age=300",
        FLASH_COOKIE,
        urlencoding::encode(&payload)
    )
}

fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", FLASH_COOKIE)
}
