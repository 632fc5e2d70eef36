use base64::Engine;

/// Username/password pair used for HTTP Basic auth.
///
/// Auth is only applied when both fields are non-empty; a half-filled pair
/// behaves like no credentials at all.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Anonymous credentials
    pub fn none() -> Self {
        Self::default()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_authenticated(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Value for the `Authorization` header, or `None` when unauthenticated.
    pub fn basic_auth_header(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        let credentials = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        Some(format!("Basic {}", encoded))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
