//! Server-side dashboard sessions.
//!
//! The browser only holds a random session id in the `afkar_session` cookie;
//! the backend token stays in memory on the server.

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::config::SESSION_TTL_RANGE;

const DEFAULT_TTL_MINUTES: i64 = 720;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "afkar_session";

/// Kind of one-shot message shown after a dashboard action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot message shown on the next dashboard page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash { kind: FlashKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Flash { kind: FlashKind::Error, message: message.into() }
    }
}

/// A logged-in administrator
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token issued by the backend
    pub token: String,
    /// When the session was opened
    pub created_at: DateTime<Utc>,
    /// Message waiting to be shown
    pub flash: Option<Flash>,
}

/// Tokens the backend sometimes returns instead of a real one
pub fn is_usable_token(token: &str) -> bool {
    let token = token.trim();
    !token.is_empty() && token != "undefined" && token != "null"
}

/// Concurrent session table with a fixed lifetime
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        let ttl = Some(ttl_minutes)
            .filter(|minutes| SESSION_TTL_RANGE.contains(minutes))
            .and_then(Duration::try_minutes)
            .unwrap_or_else(|| {
                warn!("Session lifetime of {} minutes is out of range, using {}", ttl_minutes, DEFAULT_TTL_MINUTES);
                Duration::minutes(DEFAULT_TTL_MINUTES)
            });
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Open a session for a backend token and return its id.
    ///
    /// Returns `None` when the token is empty or a placeholder value.
    pub fn create(&self, token: &str) -> Option<String> {
        if !is_usable_token(token) {
            return None;
        }

        let id = Uuid::new_v4().to_string();
        self.sessions.insert(
            id.clone(),
            Session {
                token: token.trim().to_string(),
                created_at: Utc::now(),
                flash: None,
            },
        );
        info!("Dashboard session opened ({} active)", self.sessions.len());
        Some(id)
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.created_at > self.ttl
    }

    /// Token of a live session; expired sessions are dropped on access
    pub fn token(&self, id: &str) -> Option<String> {
        let now = Utc::now();
        let expired = match self.sessions.get(id) {
            Some(session) if !self.is_expired(&session, now) => return Some(session.token.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!("Dashboard session expired");
            self.sessions.remove(id);
        }
        None
    }

    pub fn remove(&self, id: &str) {
        if self.sessions.remove(id).is_some() {
            info!("Dashboard session closed");
        }
    }

    pub fn set_flash(&self, id: &str, flash: Flash) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.flash = Some(flash);
        }
    }

    /// Take the pending message, leaving none behind
    pub fn take_flash(&self, id: &str) -> Option<Flash> {
        self.sessions.get_mut(id).and_then(|mut session| session.flash.take())
    }

    /// Drop every expired session and return how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| now - session.created_at <= self.ttl);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[cfg(test)]
    fn backdate(&self, id: &str, by: Duration) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.created_at = session.created_at - by;
        }
    }
}

/// Session id from the request cookie, if any
pub fn session_id(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(id: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// Cookie that makes the browser forget the session
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_tokens_are_rejected() {
        let store = SessionStore::new(60);
        assert!(store.create("").is_none());
        assert!(store.create("undefined").is_none());
        assert!(store.create("null").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_and_lookup() {
        let store = SessionStore::new(60);
        let id = store.create("tok-1").unwrap();
        assert_eq!(store.token(&id).as_deref(), Some("tok-1"));
        assert!(store.token("unknown").is_none());

        store.remove(&id);
        assert!(store.token(&id).is_none());
    }

    // Sessions past their lifetime disappear on the next lookup
    #[test]
    fn test_expired_session_is_dropped() {
        let store = SessionStore::new(30);
        let id = store.create("tok").unwrap();
        store.backdate(&id, Duration::minutes(31));

        assert!(store.token(&id).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_out_of_range_lifetime_uses_default() {
        for minutes in [i64::MAX, 0, -10] {
            let store = SessionStore::new(minutes);
            let id = store.create("jwt").unwrap();
            store.backdate(&id, Duration::minutes(700));
            assert!(store.token(&id).is_some());
            store.backdate(&id, Duration::minutes(30));
            assert!(store.token(&id).is_none());
        }
    }

    #[test]
    fn test_purge_expired() {
        let store = SessionStore::new(30);
        let old = store.create("old").unwrap();
        let _fresh = store.create("fresh").unwrap();
        store.backdate(&old, Duration::minutes(45));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_flash_is_shown_once() {
        let store = SessionStore::new(30);
        let id = store.create("tok").unwrap();
        store.set_flash(&id, Flash::success("Saved"));

        assert_eq!(store.take_flash(&id), Some(Flash::success("Saved")));
        assert_eq!(store.take_flash(&id), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("abc");
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(expired_session_cookie().max_age(), Some(time::Duration::ZERO));
    }
}
