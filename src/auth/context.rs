// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Session context: token, current user and the login state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::AuthError;
use crate::graphql::UniversityApi;
use crate::models::{LoginInput, UpdateProfileInput, User};
use crate::session::{StoredSession, TokenStore};
use crate::wallet::{ConnectionState, WalletConnection, WalletEvent, WalletSigner};

/// Avatar applied to users that have none.
pub const DEFAULT_AVATAR_URL: &str =
    "https://assets.mikasa-ackerman.vip/uPic/202512071111001765077060.png";

const LOGIN_MESSAGE_PREFIX: &str = "Login to Web3 University:";

/// The message signed at login.
pub fn login_message(timestamp_millis: i64) -> String {
    format!("{LOGIN_MESSAGE_PREFIX}{timestamp_millis}")
}

/// Result of a [`AuthContext::login`] attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum LoginOutcome {
    LoggedIn,
    /// Another login was already running; nothing was done.
    InProgress,
    NotConnected,
    /// The wallet disconnected, switched account or logged out while the
    /// login was in flight. The returned token was discarded.
    Superseded,
    /// The backend accepted the request but returned no token.
    NoToken,
    /// Signing or the login request failed.
    Failed(String),
}

impl LoginOutcome {
    /// `Ok` only for [`LoginOutcome::LoggedIn`].
    pub fn into_result(self) -> Result<(), AuthError> {
        let reason = match self {
            LoginOutcome::LoggedIn => return Ok(()),
            LoginOutcome::InProgress => "another login is in progress".to_string(),
            LoginOutcome::NotConnected => "no wallet connected".to_string(),
            LoginOutcome::Superseded => "wallet changed during login".to_string(),
            LoginOutcome::NoToken => "no token returned".to_string(),
            LoginOutcome::Failed(reason) => reason,
        };
        Err(AuthError::LoginFailed(reason))
    }
}

/// Forget the persisted token and detach it from the API client.
///
/// Used by [`AuthContext::logout`]; callers without a context (no wallet
/// configured) can call it directly.
pub async fn end_session(store: &dyn TokenStore, api: &UniversityApi) {
    if let Err(e) = store.clear() {
        warn!(error = %e, "Failed to remove persisted session token");
    }
    api.clear_auth_token().await;
}

#[derive(Debug, Default)]
struct AuthState {
    token: Option<String>,
    user: Option<User>,
    /// Bumped by every logout.
    epoch: u64,
}

/// Clears the login flag on every exit path.
struct LoginGuard<'a>(&'a AtomicBool);

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AuthContext {
    api: UniversityApi,
    store: Arc<dyn TokenStore>,
    signer: Arc<dyn WalletSigner>,
    connection: WalletConnection,
    state: RwLock<AuthState>,
    logging_in: AtomicBool,
}

impl AuthContext {
    pub fn new(
        api: UniversityApi,
        store: Arc<dyn TokenStore>,
        signer: Arc<dyn WalletSigner>,
        connection: WalletConnection,
    ) -> Self {
        Self {
            api,
            store,
            signer,
            connection,
            state: RwLock::new(AuthState::default()),
            logging_in: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &UniversityApi {
        &self.api
    }

    pub fn connection(&self) -> &WalletConnection {
        &self.connection
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Sign in with the connected wallet.
    ///
    /// Requests exactly one signature. Failures are logged and reported in
    /// the outcome, never retried.
    pub async fn login(&self) -> LoginOutcome {
        let Some(address) = self.connection.address() else {
            debug!("Login skipped: no wallet connected");
            return LoginOutcome::NotConnected;
        };

        if self
            .logging_in
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(address = %address, "Login already in progress");
            return LoginOutcome::InProgress;
        }
        let _guard = LoginGuard(&self.logging_in);
        let epoch = self.state.read().await.epoch;

        let message = login_message(Utc::now().timestamp_millis());
        let signature = match self.signer.sign_message(&message).await {
            Ok(signature) => signature,
            Err(e) => {
                warn!(address = %address, error = %e, "Login signature failed");
                return LoginOutcome::Failed(e.to_string());
            }
        };

        let input = LoginInput {
            wallet_address: address.clone(),
            message,
            signature,
        };
        let token = match self.api.login(&input).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!(address = %address, "Login returned no token");
                return LoginOutcome::NoToken;
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Login request failed");
                return LoginOutcome::Failed(e.short_message());
            }
        };

        {
            // Held until the token is attached so a logout cannot interleave.
            let mut state = self.state.write().await;
            if state.epoch != epoch || self.connection.address().as_ref() != Some(&address) {
                info!(address = %address, "Login superseded; discarding token");
                return LoginOutcome::Superseded;
            }
            state.token = Some(token.clone());
            if let Err(e) = self.store.save(&StoredSession::new(token.as_str())) {
                warn!(error = %e, "Failed to persist session token");
            }
            self.api.set_auth_token(&token).await;
        }

        if let Err(e) = self.fetch_user().await {
            warn!(address = %address, error = %e, "Failed to load user after login");
        }

        info!(address = %address, "Logged in");
        LoginOutcome::LoggedIn
    }

    /// Drop the session everywhere it is held.
    pub async fn logout(&self) {
        {
            let mut state = self.state.write().await;
            state.token = None;
            state.user = None;
            state.epoch += 1;
            end_session(self.store.as_ref(), &self.api).await;
        }
        info!("Logged out");
    }

    /// Resume a persisted session. Returns whether a token was found.
    ///
    /// The token is kept even when loading the user fails.
    pub async fn restore(&self) -> Result<bool, AuthError> {
        let Some(session) = self.store.load()? else {
            return Ok(false);
        };

        self.state.write().await.token = Some(session.token.clone());
        self.api.set_auth_token(&session.token).await;
        info!(saved_at = %session.saved_at, "Restored session");

        if let Err(e) = self.fetch_user().await {
            warn!(error = %e, "Failed to load user for restored session");
        }
        Ok(true)
    }

    /// Load the current user from the backend.
    pub async fn fetch_user(&self) -> Result<Option<User>, AuthError> {
        if !self.is_authenticated().await {
            return Err(AuthError::NotAuthenticated);
        }

        let user = self.api.me().await?.map(with_default_avatar);
        let mut state = self.state.write().await;
        if state.token.is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        state.user = user.clone();
        Ok(user)
    }

    /// Update the profile and merge the returned fields into the current
    /// user.
    pub async fn update_profile(&self, input: &UpdateProfileInput) -> Result<User, AuthError> {
        if !self.is_authenticated().await {
            return Err(AuthError::NotAuthenticated);
        }

        let updated = self.api.update_profile(input).await?;
        let mut state = self.state.write().await;
        let user = match state.user.take() {
            Some(mut current) => {
                current.merge(updated);
                current
            }
            None => with_default_avatar(updated),
        };
        state.user = Some(user.clone());
        info!(address = %user.wallet_address, "Profile updated");
        Ok(user)
    }

    /// React to a wallet connectivity change.
    pub async fn handle_wallet_event(&self, event: &WalletEvent) {
        match event {
            WalletEvent::Connected(_) => {
                if !self.is_authenticated().await {
                    self.login().await;
                }
            }
            WalletEvent::Disconnected => {
                if self.is_authenticated().await {
                    self.logout().await;
                }
            }
        }
    }

    /// Apply every connection change to the session until `shutdown` fires.
    ///
    /// A wallet already connected when the watcher starts is logged in; an
    /// initial disconnected state leaves a restored session alone.
    pub async fn watch_wallet(
        self: Arc<Self>,
        mut changes: watch::Receiver<ConnectionState>,
        shutdown: CancellationToken,
    ) {
        let initial = changes.borrow_and_update().clone();
        if initial.is_connected() {
            self.handle_wallet_event(&WalletEvent::from(&initial)).await;
        }

        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        debug!("Wallet connection closed");
                        return;
                    }
                    let event = WalletEvent::from(&*changes.borrow_and_update());
                    self.handle_wallet_event(&event).await;
                }
                _ = shutdown.cancelled() => {
                    debug!("Wallet watcher shutting down");
                    return;
                }
            }
        }
    }
}

fn with_default_avatar(mut user: User) -> User {
    if user.avatar_url.is_none() {
        user.avatar_url = Some(DEFAULT_AVATAR_URL.to_string());
    }
    user
}
