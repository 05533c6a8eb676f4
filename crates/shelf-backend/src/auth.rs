use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shelf_types::{
    is_valid_email, AuthErrorCode, AuthProvider, FederatedIdentity, User, MIN_PASSWORD_LEN,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::Result;
use crate::persist;

#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub session_ttl: Duration,
    pub max_failed_attempts: u32,
    pub lockout: Duration,
    pub enabled_providers: Vec<AuthProvider>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::days(7),
            max_failed_attempts: 5,
            lockout: Duration::minutes(15),
            enabled_providers: vec![AuthProvider::Google, AuthProvider::GitHub],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    fn new(password: &str) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = digest(&salt, password);
        Self { salt, digest }
    }

    fn verify(&self, password: &str) -> bool {
        constant_time_eq(digest(&self.salt, password).as_bytes(), self.digest.as_bytes())
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compares without an early exit, so timing does not reveal the matching prefix.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Lookup key for password accounts. Full Unicode case folding, so the stored
/// address and a typed one compare alike.
fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Account {
    user: User,
    #[serde(default)]
    password: Option<PasswordHash>,
    #[serde(default)]
    subject: Option<String>,
}

struct SessionEntry {
    uid: String,
    expires_at: DateTime<Utc>,
}

struct FailedAttempts {
    count: u32,
    window_start: DateTime<Utc>,
}

#[derive(Default)]
struct AuthState {
    accounts: Vec<Account>,
    sessions: HashMap<String, SessionEntry>,
    failures: HashMap<String, FailedAttempts>,
}

impl AuthState {
    fn find_by_email(&self, email: &str) -> Option<&Account> {
        let key = email_key(email);
        self.accounts.iter().find(|a| {
            a.user.provider == AuthProvider::Password
                && a.user.email.as_deref().is_some_and(|e| email_key(e) == key)
        })
    }

    /// Drops expired sessions and throttle windows that have run out.
    fn prune(&mut self, now: DateTime<Utc>, lockout: Duration) {
        self.sessions.retain(|_, entry| entry.expires_at > now);
        self.failures.retain(|_, failures| now - failures.window_start < lockout);
    }

    fn user(&self, uid: &str) -> Option<&User> {
        self.accounts.iter().map(|a| &a.user).find(|u| u.uid == uid)
    }
}

/// Account registry and session issuer.
pub struct AuthService {
    settings: AuthSettings,
    state: RwLock<AuthState>,
    path: Option<PathBuf>,
}

impl AuthService {
    pub fn in_memory(settings: AuthSettings) -> Self {
        Self {
            settings,
            state: RwLock::new(AuthState::default()),
            path: None,
        }
    }

    pub async fn open(settings: AuthSettings, path: PathBuf) -> Result<Self> {
        let accounts: Vec<Account> = persist::load(&path).await?.unwrap_or_default();
        info!("loaded {} accounts from {}", accounts.len(), path.display());
        Ok(Self {
            settings,
            state: RwLock::new(AuthState {
                accounts,
                ..AuthState::default()
            }),
            path: Some(path),
        })
    }

    pub fn enabled_providers(&self) -> &[AuthProvider] {
        &self.settings.enabled_providers
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AuthErrorCode::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthErrorCode::WeakPassword.into());
        }

        let now = Utc::now();
        let mut state = self.state.write().await;
        state.prune(now, self.settings.lockout);
        if state.find_by_email(email).is_some() {
            warn!("sign-up rejected: email already registered");
            return Err(AuthErrorCode::EmailAlreadyInUse.into());
        }

        let account = Account {
            user: User {
                uid: uuid::Uuid::new_v4().to_string(),
                email: Some(email.to_string()),
                display_name: None,
                provider: AuthProvider::Password,
            },
            password: Some(PasswordHash::new(password)),
            subject: None,
        };
        self.add_account(&mut state, account.clone()).await?;

        info!(uid = %account.user.uid, "account created");
        Ok(issue_session(&mut state, account.user, now, self.settings.session_ttl))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.sign_in_at(email, password, Utc::now()).await
    }

    pub(crate) async fn sign_in_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let key = email_key(email);
        let mut state = self.state.write().await;
        state.prune(now, self.settings.lockout);

        if let Some(failures) = state.failures.get(&key) {
            if failures.count >= self.settings.max_failed_attempts {
                warn!("sign-in throttled after {} failures", failures.count);
                return Err(AuthErrorCode::TooManyRequests.into());
            }
        }

        let verified = match state.find_by_email(&key) {
            None => Err(AuthErrorCode::UserNotFound),
            Some(account) => match &account.password {
                Some(hash) if hash.verify(password) => Ok(account.user.clone()),
                _ => Err(AuthErrorCode::WrongPassword),
            },
        };

        match verified {
            Ok(user) => {
                state.failures.remove(&key);
                info!(uid = %user.uid, "signed in");
                Ok(issue_session(&mut state, user, now, self.settings.session_ttl))
            }
            Err(AuthErrorCode::UserNotFound) => {
                warn!(code = AuthErrorCode::UserNotFound.code(), "sign-in failed");
                Err(AuthErrorCode::UserNotFound.into())
            }
            Err(code) => {
                let entry = state.failures.entry(key).or_insert(FailedAttempts {
                    count: 0,
                    window_start: now,
                });
                entry.count += 1;
                warn!(code = code.code(), attempts = entry.count, "sign-in failed");
                Err(code.into())
            }
        }
    }

    /// Signs in through an external provider. `None` means the user abandoned the provider flow.
    pub async fn sign_in_with_provider(
        &self,
        provider: AuthProvider,
        identity: Option<FederatedIdentity>,
    ) -> Result<Session> {
        if !provider.is_federated() || !self.settings.enabled_providers.contains(&provider) {
            return Err(AuthErrorCode::ProviderDisabled.into());
        }
        let identity = identity.ok_or(AuthErrorCode::PopupClosedByUser)?;

        let now = Utc::now();
        let mut state = self.state.write().await;
        state.prune(now, self.settings.lockout);
        let existing = state
            .accounts
            .iter()
            .find(|a| {
                a.user.provider == provider && a.subject.as_deref() == Some(identity.subject.as_str())
            })
            .map(|a| a.user.clone());

        let user = match existing {
            Some(user) => user,
            None => {
                let account = Account {
                    user: User {
                        uid: uuid::Uuid::new_v4().to_string(),
                        email: identity.email,
                        display_name: identity.display_name,
                        provider,
                    },
                    password: None,
                    subject: Some(identity.subject),
                };
                self.add_account(&mut state, account.clone()).await?;
                info!(uid = %account.user.uid, provider = provider.as_str(), "federated account created");
                account.user
            }
        };

        info!(uid = %user.uid, provider = provider.as_str(), "signed in");
        Ok(issue_session(&mut state, user, now, self.settings.session_ttl))
    }

    /// Revokes a session. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) {
        if let Some(entry) = self.state.write().await.sessions.remove(token) {
            info!(uid = %entry.uid, "signed out");
        }
    }

    pub async fn resolve(&self, token: &str) -> Option<User> {
        self.resolve_at(token, Utc::now()).await
    }

    pub(crate) async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<User> {
        {
            let state = self.state.read().await;
            let entry = state.sessions.get(token)?;
            if entry.expires_at > now {
                return state.user(&entry.uid).cloned();
            }
        }

        self.state.write().await.sessions.remove(token);
        None
    }

    async fn add_account(&self, state: &mut AuthState, account: Account) -> Result<()> {
        let mut next = state.accounts.clone();
        next.push(account);
        if let Some(path) = &self.path {
            persist::save(path, &next).await?;
        }
        state.accounts = next;
        Ok(())
    }
}

fn issue_session(state: &mut AuthState, user: User, now: DateTime<Utc>, ttl: Duration) -> Session {
    let token = uuid::Uuid::new_v4().simple().to_string();
    let expiresAt = now + ttl;
    state.sessions.insert(
        token.clone(),
        SessionEntry {
            uid: user.uid.clone(),
            expires_at: expiresAt,
        },
    );
    Session {
        token,
        user,
        expires_at: expiresAt,
    }
}
