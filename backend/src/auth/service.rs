//! Core business logic for the authentication system.
//!
//! This service handles user creation, password hashing, session management,
//! token issuance, and validation. It orchestrates interactions between the
//! handlers and the database.

use std::time::Duration;

use adapters::{
    models::{NewUser, Session, User},
    AdapterError,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    errors::AuthError,
    models::{Claims, TokenKind, TokenPair},
};
use crate::state::AppState;

const BCRYPT_COST: u32 = 10;

/// HS256 signing material plus token lifetimes.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: u64,
    refresh_ttl: u64,
}

impl JwtKeys {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl: access_ttl.as_secs(),
            refresh_ttl: refresh_ttl.as_secs(),
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    pub fn issue(
        &self,
        user_id: i64,
        email: &str,
        kind: TokenKind,
        jti: Option<Uuid>,
    ) -> Result<(String, Claims), AuthError> {
        let iat = get_current_timestamp();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            kind,
            jti,
            iat,
            exp: iat + ttl,
        };

        Ok((self.sign(&claims)?, claims))
    }

    /// Checks signature, expiry and that the token is of the `expected` kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                debug!("Rejected token: {e}");
                AuthError::InvalidToken
            })?
            .claims;

        if claims.kind != expected {
            debug!("Rejected {:?} token where {expected:?} was required", claims.kind);
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

pub async fn hash_password(password: String) -> Result<String, AuthError> {
    Ok(spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST)).await??)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    Ok(spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}

pub async fn register(
    state: &AppState,
    email: String,
    username: String,
    password: String,
) -> Result<User, AuthError> {
    if state.db.find_user_by_email(&email).await?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let new_user = NewUser {
        email,
        username,
        password: hash_password(password).await?,
    };

    // A concurrent registration can still win between the lookup and the insert.
    match state.db.insert_user(new_user).await {
        Ok(user) => {
            info!("Registered user {}", user.id);
            Ok(user)
        }
        Err(AdapterError::Conflict(_)) => Err(AuthError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

pub async fn login(state: &AppState, email: &str, password: String) -> Result<TokenPair, AuthError> {
    let user = state
        .db
        .find_user_by_email(email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, user.password.clone()).await? {
        return Err(AuthError::InvalidCredentials);
    }

    info!("User {} logged in", user.id);
    purge_expired_sessions(state).await;
    start_session(state, user.id, &user.email).await
}

/// Best effort; a failed purge never blocks a login.
async fn purge_expired_sessions(state: &AppState) {
    match state.db.delete_expired_sessions(Utc::now()).await {
        Ok(0) => {}
        Ok(purged) => debug!("Purged {purged} expired session(s)"),
        Err(e) => warn!("Failed to purge expired sessions: {e}"),
    }
}

/// Exchanges a refresh token for a new pair. The presented session is
/// consumed, so each refresh token works once.
pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<TokenPair, AuthError> {
    let claims = state.keys.verify(refresh_token, TokenKind::Refresh)?;
    let session_id = claims.jti.ok_or(AuthError::InvalidToken)?;

    let session = state
        .db
        .find_session(session_id)
        .await?
        .filter(|session| session.id_user == claims.sub)
        .ok_or(AuthError::SessionRevoked)?;

    if !state.db.delete_session(session.id).await? {
        return Err(AuthError::SessionRevoked);
    }

    let user = state
        .db
        .find_user_by_id(claims.sub)
        .await?
        .ok_or(AuthError::SessionRevoked)?;

    start_session(state, user.id, &user.email).await
}

/// Revokes the session behind a refresh token. Revoking twice is not an error.
pub async fn logout(state: &AppState, refresh_token: &str) -> Result<(), AuthError> {
    let claims = state.keys.verify(refresh_token, TokenKind::Refresh)?;
    let session_id = claims.jti.ok_or(AuthError::InvalidToken)?;

    if state.db.delete_session(session_id).await? {
        info!("User {} logged out", claims.sub);
    }

    Ok(())
}

async fn start_session(state: &AppState, user_id: i64, email: &str) -> Result<TokenPair, AuthError> {
    let (access_token, _) = state.keys.issue(user_id, email, TokenKind::Access, None)?;

    let session_id = Uuid::new_v4();
    let (refresh_token, claims) =
        state
            .keys
            .issue(user_id, email, TokenKind::Refresh, Some(session_id))?;

    let expires_at =
        DateTime::<Utc>::from_timestamp(claims.exp as i64, 0).ok_or(AuthError::InvalidToken)?;

    state
        .db
        .insert_session(Session {
            id: session_id,
            id_user: user_id,
            expires_at,
        })
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
