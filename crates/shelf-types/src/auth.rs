use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Password,
    Google,
    #[serde(rename = "github")]
    GitHub,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Password => "password",
            AuthProvider::Google => "google",
            AuthProvider::GitHub => "github",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthProvider::Password => "Email",
            AuthProvider::Google => "Google",
            AuthProvider::GitHub => "GitHub",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "password" => Some(AuthProvider::Password),
            "google" => Some(AuthProvider::Google),
            "github" => Some(AuthProvider::GitHub),
            _ => None,
        }
    }

    pub fn is_federated(&self) -> bool {
        !matches!(self, AuthProvider::Password)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider: AuthProvider,
}

impl User {
    /// Email when known, otherwise the display name, otherwise the uid.
    pub fn handle(&self) -> &str {
        self.email
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or(&self.uid)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Identity asserted by an external sign-in provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Error codes reported by the auth provider. Each has a fixed user-facing message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Error)]
pub enum AuthErrorCode {
    #[error("Email is already in use. Please use a different email.")]
    EmailAlreadyInUse,
    #[error("Invalid email address. Please enter a valid email.")]
    InvalidEmail,
    #[error("Password is too weak. Please use at least 6 characters.")]
    WeakPassword,
    #[error("User not found. Please check your email or sign up.")]
    UserNotFound,
    #[error("Incorrect password. Please try again.")]
    WrongPassword,
    #[error("Too many attempts. Please try again later.")]
    TooManyRequests,
    #[error("Login popup was closed. Please try again.")]
    PopupClosedByUser,
    #[error("This sign-in method is not enabled.")]
    ProviderDisabled,
    #[error("An error occurred. Please try again.")]
    Unknown,
}

impl AuthErrorCode {
    pub const ALL: [AuthErrorCode; 9] = [
        Self::EmailAlreadyInUse,
        Self::InvalidEmail,
        Self::WeakPassword,
        Self::UserNotFound,
        Self::WrongPassword,
        Self::TooManyRequests,
        Self::PopupClosedByUser,
        Self::ProviderDisabled,
        Self::Unknown,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::UserNotFound => "auth/user-not-found",
            AuthErrorCode::WrongPassword => "auth/wrong-password",
            AuthErrorCode::TooManyRequests => "auth/too-many-requests",
            AuthErrorCode::PopupClosedByUser => "auth/popup-closed-by-user",
            AuthErrorCode::ProviderDisabled => "auth/provider-disabled",
            AuthErrorCode::Unknown => "auth/unknown",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "auth/invalid-email" => AuthErrorCode::InvalidEmail,
            "auth/weak-password" => AuthErrorCode::WeakPassword,
            "auth/user-not-found" => AuthErrorCode::UserNotFound,
            "auth/wrong-password" => AuthErrorCode::WrongPassword,
            "auth/too-many-requests" => AuthErrorCode::TooManyRequests,
            "auth/popup-closed-by-user" => AuthErrorCode::PopupClosedByUser,
            "auth/provider-disabled" => AuthErrorCode::ProviderDisabled,
            _ => AuthErrorCode::Unknown,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => {
                "Email is already in use. Please use a different email."
            }
            AuthErrorCode::InvalidEmail => "Invalid email address. Please enter a valid email.",
            AuthErrorCode::WeakPassword => {
                "Password is too weak. Please use at least 6 characters."
            }
            AuthErrorCode::UserNotFound => "User not found. Please check your email or sign up.",
            AuthErrorCode::WrongPassword => "Incorrect password. Please try again.",
            AuthErrorCode::TooManyRequests => "Too many attempts. Please try again later.",
            AuthErrorCode::PopupClosedByUser => "Login popup was closed. Please try again.",
            AuthErrorCode::ProviderDisabled => "This sign-in method is not enabled.",
            AuthErrorCode::Unknown => "An error occurred. Please try again.",
        }
    }
}

pub const MIN_PASSWORD_LEN: usize = 6;

/// Loose syntax check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty() && !tail.ends_with('.'))
}
