//! Local persistence of the single signed-in identity.
//!
//! The store holds at most one entry. Reads never fail: a missing or corrupt
//! entry is reported as "not signed in". The cookie-backed store is built from
//! the request headers of one page load and collects the `Set-Cookie` header
//! the response has to carry.

use super::{error::RelayError, identity::IdentityRecord};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use tracing::{debug, error, warn};

/// Name of the cookie holding the serialized identity.
pub const SESSION_COOKIE_NAME: &str = "relay_user";

// Browser storage has no expiry; a year is the closest cookie equivalent.
const SESSION_MAX_AGE_SECONDS: u64 = 60 * 60 * 24 * 365;

/// Browsers drop larger `Set-Cookie` headers without telling anyone.
pub const MAX_SESSION_COOKIE_BYTES: usize = 4096;

pub trait SessionStore {
    /// Persist the record, replacing any previous entry.
    ///
    /// # Errors
    /// Returns `Provider` when the record cannot be kept; the previous entry
    /// is left in place.
    fn save(&mut self, record: &IdentityRecord) -> Result<(), RelayError>;

    /// The stored record, or `None` when absent or unreadable.
    fn load(&self) -> Option<IdentityRecord>;

    /// Remove the entry. Safe to call when nothing is stored.
    fn clear(&mut self);
}

/// Serialize a record into the text stored in the session entry.
#[must_use]
pub fn encode_entry(record: &IdentityRecord) -> Option<String> {
    match serde_json::to_vec(record) {
        Ok(json) => Some(URL_SAFE_NO_PAD.encode(json)),
        Err(err) => {
            error!("Failed to serialize identity record: {err}");
            None
        }
    }
}

/// Parse a session entry; anything unreadable degrades to `None`.
#[must_use]
pub fn decode_entry(entry: &str) -> Option<IdentityRecord> {
    let bytes = URL_SAFE_NO_PAD.decode(entry.trim()).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!("Ignoring unreadable session entry: {err}");
            None
        }
    }
}

/// In-memory store holding the serialized entry, mainly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entry: Option<String>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw entry text, as if left behind by an earlier visit.
    #[must_use]
    pub fn with_raw_entry(entry: impl Into<String>) -> Self {
        Self {
            entry: Some(entry.into()),
        }
    }

    #[must_use]
    pub fn raw_entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&mut self, record: &IdentityRecord) -> Result<(), RelayError> {
        self.entry = Some(encode_entry(record).ok_or_else(unstorable)?);
        Ok(())
    }

    fn load(&self) -> Option<IdentityRecord> {
        self.entry.as_deref().and_then(decode_entry)
    }

    fn clear(&mut self) {
        self.entry = None;
    }
}

/// Store backed by the `relay_user` browser cookie.
#[derive(Debug, Clone)]
pub struct CookieSessionStore {
    entry: Option<String>,
    secure: bool,
    pending: Option<HeaderValue>,
}

impl CookieSessionStore {
    /// Read the current entry from the request `Cookie` headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        Self {
            entry: extract_cookie(headers, SESSION_COOKIE_NAME),
            secure,
            pending: None,
        }
    }

    /// `Set-Cookie` value reflecting the last `save` or `clear`, if any.
    #[must_use]
    pub fn set_cookie(&self) -> Option<&HeaderValue> {
        self.pending.as_ref()
    }

    fn stage(&mut self, cookie: Result<HeaderValue, InvalidHeaderValue>) {
        match cookie {
            Ok(cookie) => self.pending = Some(cookie),
            Err(err) => error!("Failed to build session cookie: {err}"),
        }
    }
}

impl SessionStore for CookieSessionStore {
    fn save(&mut self, record: &IdentityRecord) -> Result<(), RelayError> {
        let entry = encode_entry(record).ok_or_else(unstorable)?;
        let (entry, cookie) = match session_cookie(&entry, self.secure) {
            Ok(cookie) if cookie.len() <= MAX_SESSION_COOKIE_BYTES => (entry, cookie),
            Ok(cookie) => {
                warn!(
                    bytes = cookie.len(),
                    "Session cookie too large, keeping name, email and avatar only"
                );
                let entry = encode_entry(&record.without_extra()).ok_or_else(unstorable)?;
                let cookie = session_cookie(&entry, self.secure).map_err(|err| {
                    error!("Failed to build session cookie: {err}");
                    unstorable()
                })?;
                if cookie.len() > MAX_SESSION_COOKIE_BYTES {
                    error!(bytes = cookie.len(), "Session cookie too large to store");
                    return Err(unstorable());
                }
                (entry, cookie)
            }
            Err(err) => {
                error!("Failed to build session cookie: {err}");
                return Err(unstorable());
            }
        };

        self.pending = Some(cookie);
        self.entry = Some(entry);
        Ok(())
    }

    fn load(&self) -> Option<IdentityRecord> {
        self.entry.as_deref().and_then(decode_entry)
    }

    fn clear(&mut self) {
        let cookie = clear_session_cookie(self.secure);
        self.stage(cookie);
        self.entry = None;
    }
}

fn unstorable() -> RelayError {
    RelayError::Provider("Your profile is too large to keep you signed in.".to_string())
}

fn session_cookie(entry: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={entry}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?.trim();
            let val = parts.next()?.trim();
            (!key.is_empty()).then_some((key, val))
        })
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    cookie_pairs(headers)
        .find(|(key, val)| *key == name && !val.is_empty())
        .map(|(_, val)| val.to_string())
}

/// The request cookies without the relay's own session entry, for forwarding
/// to the authentication backend.
#[must_use]
pub fn forwardable_cookies(headers: &HeaderMap) -> Option<HeaderValue> {
    let cookies = cookie_pairs(headers)
        .filter(|(key, _)| *key != SESSION_COOKIE_NAME)
        .map(|(key, val)| format!("{key}={val}"))
        .collect::<Vec<_>>();

    if cookies.is_empty() {
        return None;
    }

    HeaderValue::from_str(&cookies.join("; ")).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ann() -> IdentityRecord {
        IdentityRecord::new("Ann Lee", "ann@x.com")
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemorySessionStore::new();
        assert_eq!(store.load(), None);

        store.save(&ann()).unwrap();
        assert_eq!(store.load(), Some(ann()));

        // same record twice leaves the same entry
        let first = store.raw_entry().map(ToString::to_string);
        store.save(&ann()).unwrap();
        assert_eq!(store.raw_entry().map(ToString::to_string), first);
    }

    #[test]
    fn new_login_overwrites_entry() {
        let mut store = MemorySessionStore::new();
        store.save(&ann()).unwrap();
        store.save(&IdentityRecord::new("Bo", "bo@x.com")).unwrap();
        assert_eq!(store.load(), Some(IdentityRecord::new("Bo", "bo@x.com")));
    }

    #[test]
    fn corrupt_entry_is_absent() {
        assert_eq!(MemorySessionStore::with_raw_entry("%%%not-base64").load(), None);

        let not_json = URL_SAFE_NO_PAD.encode("{name:");
        assert_eq!(MemorySessionStore::with_raw_entry(not_json).load(), None);
    }

    #[test]
    fn clear_twice_is_noop() {
        let mut store = MemorySessionStore::new();
        store.save(&ann()).unwrap();
        store.clear();
        assert_eq!(store.load(), None);
        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn cookie_store_reads_request_cookie() {
        let entry = encode_entry(&ann()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE_NAME}={entry}")).unwrap(),
        );

        let store = CookieSessionStore::from_headers(&headers, false);
        assert_eq!(store.load(), Some(ann()));
        assert!(store.set_cookie().is_none());
    }

    #[test]
    fn cookie_store_stages_set_cookie() {
        let mut store = CookieSessionStore::from_headers(&HeaderMap::new(), true);
        assert_eq!(store.load(), None);

        store.save(&ann()).unwrap();
        let cookie = store.set_cookie().unwrap().to_str().unwrap().to_string();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert_eq!(store.load(), Some(ann()));

        store.clear();
        let cookie = store.set_cookie().unwrap().to_str().unwrap().to_string();
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(store.load(), None);
    }

    fn with_roles(count: usize) -> IdentityRecord {
        let mut record = ann().with_avatar("https://cdn.example/ann.png");
        let roles = (0..count).map(|i| format!("role-{i}")).collect::<Vec<_>>();
        record.extra.insert("roles".to_string(), serde_json::json!(roles));
        record
    }

    #[test]
    fn oversized_record_keeps_identity_fields() {
        let mut store = CookieSessionStore::from_headers(&HeaderMap::new(), false);
        store.save(&with_roles(600)).unwrap();

        let cookie = store.set_cookie().unwrap();
        assert!(cookie.len() <= MAX_SESSION_COOKIE_BYTES);
        assert_eq!(
            store.load(),
            Some(ann().with_avatar("https://cdn.example/ann.png"))
        );
    }

    #[test]
    fn small_record_is_stored_whole() {
        let mut store = CookieSessionStore::from_headers(&HeaderMap::new(), false);
        store.save(&with_roles(3)).unwrap();
        assert_eq!(store.load(), Some(with_roles(3)));
    }

    #[test]
    fn record_too_large_to_store_fails() {
        let mut store = CookieSessionStore::from_headers(&HeaderMap::new(), false);
        store.save(&ann()).unwrap();
        let previous = store.set_cookie().cloned();

        let huge = IdentityRecord::new("Ann Lee", "ann@x.com")
            .with_avatar(format!("data:image/png;base64,{}", "A".repeat(5000)));
        let err = store.save(&huge).unwrap_err();

        assert!(matches!(err, RelayError::Provider(_)));
        assert_eq!(store.set_cookie().cloned(), previous);
        assert_eq!(store.load(), Some(ann()));
    }

    #[test]
    fn forwardable_cookies_drop_session_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("sid=abc; relay_user=xyz; lang=en"),
        );
        assert_eq!(
            forwardable_cookies(&headers),
            Some(HeaderValue::from_static("sid=abc; lang=en"))
        );

        let mut only_session = HeaderMap::new();
        only_session.insert(COOKIE, HeaderValue::from_static("relay_user=xyz"));
        assert_eq!(forwardable_cookies(&only_session), None);
    }
}
