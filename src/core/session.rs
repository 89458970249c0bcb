//! Signed-cookie sessions.
//!
//! The whole session map travels with the client as an HS256 token, so the
//! server keeps no session table. Middleware loads the map before the handler
//! runs and writes the cookie back only when the handler changed it.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::core::config::SessionConfig;
use crate::core::error::AppError;

pub const AUTH_USER_ID_KEY: &str = "_auth_user_id";
pub const AUTH_USERNAME_KEY: &str = "_auth_username";

/// Key/value state of one browser session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionData {
    values: Map<String, Value>,
    modified: bool,
}

impl SessionData {
    pub fn from_values(values: Map<String, Value>) -> Self {
        Self {
            values,
            modified: false,
        }
    }

    /// Typed read; values that do not deserialize as `T` read as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
        self.modified = true;
    }

    /// Drop every key, including the login
    pub fn flush(&mut self) {
        self.values.clear();
        self.modified = true;
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn login(&mut self, user_id: Uuid, username: &str) {
        // A different account must not inherit the previous visitor's state
        if self.user_id().is_some_and(|current| current != user_id) {
            self.flush();
        }
        self.insert(AUTH_USER_ID_KEY, user_id.to_string());
        self.insert(AUTH_USERNAME_KEY, username);
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.get::<String>(AUTH_USER_ID_KEY)
            .and_then(|s| Uuid::parse_str(&s).ok())
    }

    pub fn username(&self) -> Option<String> {
        self.get(AUTH_USERNAME_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }
}

/// Handle to the current request's session, shared with the session middleware
#[derive(Clone)]
pub struct Session(Arc<Mutex<SessionData>>);

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self(Arc::new(Mutex::new(data)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.0.lock().await
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session middleware is not installed".to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    data: Map<String, Value>,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session cookies
pub struct SessionStore {
    cookie_name: String,
    ttl_secs: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            cookie_name: config.cookie_name.clone(),
            ttl_secs: config.ttl.as_secs() as i64,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn encode(&self, data: &SessionData) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            data: data.values().clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session: {}", e)))
    }

    /// Verify a cookie value; anything tampered, expired or malformed is an empty session
    pub fn decode(&self, token: &str) -> SessionData {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(token_data) => SessionData::from_values(token_data.claims.data),
            Err(e) => {
                tracing::debug!("Discarding invalid session cookie: {}", e);
                SessionData::default()
            }
        }
    }

    pub fn load(&self, jar: &CookieJar) -> SessionData {
        jar.get(&self.cookie_name)
            .map(|cookie| self.decode(cookie.value()))
            .unwrap_or_default()
    }

    /// `Cookie` header value carrying the given session
    pub fn cookie_header(&self, data: &SessionData) -> Result<String, AppError> {
        Ok(format!("{}={}", self.cookie_name, self.encode(data)?))
    }

    fn session_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Write the session back onto the outgoing cookie jar when needed
    pub fn persist(&self, jar: CookieJar, data: &SessionData) -> Result<CookieJar, AppError> {
        if !data.is_modified() {
            return Ok(jar);
        }

        if data.is_empty() {
            return Ok(jar.remove(self.session_cookie(String::new())));
        }

        let token = self.encode(data)?;
        Ok(jar.add(self.session_cookie(token)))
    }
}

/// Load the session into request extensions and persist it after the handler ran
pub async fn session_middleware(
    State(store): State<Arc<SessionStore>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(req.headers());
    let session = Session::new(store.load(&jar));
    req.extensions_mut().insert(session.clone());

    let response = next.run(req).await;

    let data = session.lock().await.clone();
    let jar = store.persist(jar, &data)?;
    Ok((jar, response).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig {
            secret: "test-secret-that-is-long-enough-0123456789".to_string(),
            cookie_name: "rango_session".to_string(),
            ttl: Duration::from_secs(3600),
        })
    }

    #[test]
    fn test_encode_decode_preserves_values() {
        let store = store();
        let mut data = SessionData::default();
        data.insert("visits", 3);
        data.insert("last_visit", "2024-01-01T00:00:00+00:00");

        let token = store.encode(&data).unwrap();
        let decoded = store.decode(&token);

        assert_eq!(decoded.get::<i64>("visits"), Some(3));
        assert_eq!(
            decoded.get::<String>("last_visit").as_deref(),
            Some("2024-01-01T00:00:00+00:00")
        );
        assert!(!decoded.is_modified());
    }

    #[test]
    fn test_tampered_cookie_is_empty_session() {
        let store = store();
        let mut data = SessionData::default();
        data.insert("visits", 3);
        let token = store.encode(&data).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');

        assert!(store.decode(&tampered).is_empty());
        assert!(store.decode("not-a-token").is_empty());
    }

    #[test]
    fn test_cookie_signed_with_other_secret_is_rejected() {
        let other = SessionStore::new(&SessionConfig {
            secret: "another-secret-that-is-long-enough-987654".to_string(),
            cookie_name: "rango_session".to_string(),
            ttl: Duration::from_secs(3600),
        });
        let mut data = SessionData::default();
        data.insert("visits", 9);

        let token = other.encode(&data).unwrap();
        assert!(store().decode(&token).is_empty());
    }

    #[test]
    fn test_login_sets_identity() {
        let mut data = SessionData::default();
        let id = Uuid::now_v7();
        data.login(id, "alice");

        assert!(data.is_authenticated());
        assert_eq!(data.user_id(), Some(id));
        assert_eq!(data.username().as_deref(), Some("alice"));
    }

    #[test]
    fn test_login_as_other_user_drops_previous_state() {
        let mut data = SessionData::default();
        data.login(Uuid::now_v7(), "alice");
        data.insert("visits", 4);

        data.login(Uuid::now_v7(), "bob");

        assert_eq!(data.get::<i64>("visits"), None);
        assert_eq!(data.username().as_deref(), Some("bob"));
    }

    #[test]
    fn test_flush_clears_everything() {
        let mut data = SessionData::default();
        data.login(Uuid::now_v7(), "alice");
        data.flush();

        assert!(data.is_empty());
        assert!(data.is_modified());
        assert!(!data.is_authenticated());
    }

    #[test]
    fn test_wrong_type_reads_as_absent() {
        let mut data = SessionData::default();
        data.insert("visits", "many");
        assert_eq!(data.get::<i64>("visits"), None);
    }

    #[test]
    fn test_unmodified_session_sets_no_cookie() {
        let store = store();
        let jar = store.persist(CookieJar::new(), &SessionData::default()).unwrap();
        assert!(jar.get("rango_session").is_none());
    }

    #[test]
    fn test_modified_session_sets_cookie() {
        let store = store();
        let mut data = SessionData::default();
        data.insert("visits", 1);

        let jar = store.persist(CookieJar::new(), &data).unwrap();
        let cookie = jar.get("rango_session").unwrap();
        assert_eq!(store.decode(cookie.value()).get::<i64>("visits"), Some(1));
    }
}
