//! One-shot notices carried across redirects in a signed cookie
//!
//! Cookie value: `base64url(json(notices)) "." base64url(HMAC-SHA256(key, payload))`.
//! A rendered page shows and clears pending notices; a redirect re-signs
//! pending plus newly raised notices for the next request.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::LOCATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

/// Name of the notice cookie
pub const COOKIE_NAME: &str = "itemdesk_flash";

type HmacSha256 = Hmac<Sha256>;

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A message shown once to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Failure to seal notices into a cookie value
#[derive(Debug, Error)]
pub enum SealError {
    #[error("failed to encode notices: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid signing key: {0}")]
    Key(#[from] InvalidLength),
}

/// Key signing the notice cookie
#[derive(Clone)]
pub struct FlashKey(Arc<[u8]>);

impl FlashKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }

    /// Random 32-byte key for processes started without a configured secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::new(bytes)
    }

    fn mac(&self) -> Result<HmacSha256, InvalidLength> {
        HmacSha256::new_from_slice(&self.0)
    }

    /// Encode and sign notices into a cookie value.
    pub fn seal(&self, notices: &[Notice]) -> Result<String, SealError> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(notices)?);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify and decode a cookie value. `None` if tampered or malformed.
    pub fn open(&self, value: &str) -> Option<Vec<Notice>> {
        let (payload, signature) = value.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

impl std::fmt::Debug for FlashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FlashKey(<redacted>)")
    }
}

/// Notices pending from the previous response, plus the key to re-sign them.
///
/// Extracting never fails: a missing, tampered or malformed cookie yields no
/// notices.
#[derive(Debug)]
pub struct Flash {
    key: FlashKey,
    jar: CookieJar,
    pending: Vec<Notice>,
}

impl Flash {
    pub fn new(key: FlashKey, headers: &HeaderMap) -> Self {
        let jar = CookieJar::from_headers(headers);
        let pending = jar
            .get(COOKIE_NAME)
            .and_then(|cookie| {
                let opened = key.open(cookie.value());
                if opened.is_none() {
                    tracing::debug!("ignoring invalid notice cookie");
                }
                opened
            })
            .unwrap_or_default();

        Self { key, jar, pending }
    }

    /// Jar with the notice cookie cleared. Adds nothing if none was sent.
    fn cleared(jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(COOKIE_NAME).path("/"))
    }

    /// Render a page showing pending notices followed by `raised`, and clear
    /// the cookie if one was sent.
    pub fn render<F>(self, status: StatusCode, raised: Vec<Notice>, page: F) -> Response
    where
        F: FnOnce(&[Notice]) -> String,
    {
        let mut shown = self.pending;
        shown.extend(raised);

        (status, Self::cleared(self.jar), Html(page(&shown))).into_response()
    }

    /// Redirect with `302 Found`, carrying pending notices followed by
    /// `raised` to the next request.
    pub fn redirect(self, to: &'static str, raised: Vec<Notice>) -> Response {
        let mut carried = self.pending;
        carried.extend(raised);

        let jar = if carried.is_empty() {
            Self::cleared(self.jar)
        } else {
            match self.key.seal(&carried) {
                Ok(value) => self.jar.add(
                    Cookie::build((COOKIE_NAME, value))
                        .path("/")
                        .http_only(true)
                        .same_site(SameSite::Lax),
                ),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping notices, cookie could not be built");
                    self.jar
                }
            }
        };

        (StatusCode::FOUND, jar, [(LOCATION, to)]).into_response()
    }
}

impl<S> FromRequestParts<S> for Flash
where
    FlashKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(FlashKey::from_ref(state), &parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn set_cookie(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }

    #[test]
    fn sealed_value_is_cookie_safe() {
        let value = FlashKey::new("k")
            .seal(&[Notice::error("quote \" and ; semicolon")])
            .unwrap();
        assert!(value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));
    }

    #[test]
    fn long_keys_sign_and_verify() {
        let key = FlashKey::new([7u8; 200]);
        let value = key.seal(&[Notice::success("ok")]).unwrap();
        assert_eq!(key.open(&value), Some(vec![Notice::success("ok")]));
        assert!(FlashKey::new([7u8; 199]).open(&value).is_none());
    }

    #[test]
    fn sealed_notices_open_with_same_key() {
        let key = FlashKey::new("secret");
        let notices = vec![Notice::success("saved"), Notice::error("oops")];
        let value = key.seal(&notices).unwrap();
        assert_eq!(key.open(&value), Some(notices));
    }

    #[test]
    fn rejects_other_key_and_tampering() {
        let value = FlashKey::new("secret").seal(&[Notice::success("hi")]).unwrap();
        assert!(FlashKey::new("other").open(&value).is_none());

        let (payload, signature) = value.rsplit_once('.').unwrap();
        let forged = URL_SAFE_NO_PAD.encode(br#"[{"level":"success","message":"forged"}]"#);
        assert!(FlashKey::new("secret")
            .open(&format!("{}.{}", forged, signature))
            .is_none());
        assert!(FlashKey::new("secret").open(payload).is_none());

        let truncated = &value[..value.len() - 2];
        assert!(FlashKey::new("secret").open(truncated).is_none());
    }

    #[test]
    fn finds_cookie_among_others() {
        let key = FlashKey::new("k");
        let value = key.seal(&[Notice::error("bad")]).unwrap();
        let headers = headers_with_cookie(&format!("theme=dark; {}={}", COOKIE_NAME, value));

        let flash = Flash::new(key, &headers);
        assert_eq!(flash.pending, vec![Notice::error("bad")]);
    }

    #[test]
    fn garbage_cookie_yields_no_notices_but_is_cleared() {
        let headers = headers_with_cookie(&format!("{}=not-a-cookie", COOKIE_NAME));
        let flash = Flash::new(FlashKey::new("k"), &headers);
        assert!(flash.pending.is_empty());

        let response = flash.render(StatusCode::OK, vec![], |_| String::new());
        assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn redirect_sets_signed_cookie() {
        let key = FlashKey::new("k");
        let flash = Flash::new(key.clone(), &HeaderMap::new());
        let response = flash.redirect("/", vec![Notice::success("done")]);

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");

        let cookie = set_cookie(&response).unwrap();
        let value = cookie
            .strip_prefix("itemdesk_flash=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert_eq!(key.open(value), Some(vec![Notice::success("done")]));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn redirect_keeps_unconsumed_notices() {
        let key = FlashKey::new("k");
        let earlier = key.seal(&[Notice::error("first")]).unwrap();
        let headers = headers_with_cookie(&format!("{}={}", COOKIE_NAME, earlier));

        let response = Flash::new(key.clone(), &headers).redirect("/", vec![Notice::error("second")]);
        let cookie = set_cookie(&response).unwrap();
        let value = cookie["itemdesk_flash=".len()..].split(';').next().unwrap();
        assert_eq!(
            key.open(value),
            Some(vec![Notice::error("first"), Notice::error("second")])
        );
    }

    #[test]
    fn render_without_cookie_sets_nothing() {
        let flash = Flash::new(FlashKey::new("k"), &HeaderMap::new());
        let response = flash.render(StatusCode::OK, vec![Notice::error("now")], |notices| {
            assert_eq!(notices.len(), 1);
            String::new()
        });
        assert!(set_cookie(&response).is_none());
    }
}
