//! Bearer-token credentials and where they come from
//!
//! The core only needs [`CredentialSource::get_credential`]. Hosts pick a
//! source: a token typed by the user ([`StaticCredentialSource`]), an
//! environment variable ([`EnvCredentialSource`]), the system keyring
//! ([`KeyringCredentialSource`]), or a [`CredentialChain`] trying several in
//! order.
//!
//! A [`Credential`] never prints its token: both `Debug` and `Display`
//! redact it, so it is safe to pass to `tracing` macros by accident.

use std::fmt;

use crate::error::Result;

/// A bearer token authorizing requests to the completion endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    bearer_token: String,
}

impl Credential {
    /// Wrap a bearer token; surrounding whitespace is removed
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::credentials::Credential;
    ///
    /// let credential = Credential::new("  sk-or-123  ");
    /// assert_eq!(credential.bearer_token(), "sk-or-123");
    /// assert_eq!(format!("{:?}", credential), "Credential(<redacted>)");
    /// ```
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into().trim().to_string(),
        }
    }

    /// The raw token, for building the `Authorization` header
    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    /// True when no token text is present
    pub fn is_empty(&self) -> bool {
        self.bearer_token.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Supplies the credential for a session, if one is available
pub trait CredentialSource: Send + Sync {
    /// Returns the credential, or `None` when this source has none
    ///
    /// Empty tokens are reported as `None`.
    fn get_credential(&self) -> Option<Credential>;
}

/// A credential entered directly by the user
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialSource {
    credential: Option<Credential>,
}

impl StaticCredentialSource {
    /// Source holding `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Some(Credential::new(token)),
        }
    }

    /// Source with nothing entered yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the held token
    pub fn set(&mut self, token: impl Into<String>) {
        self.credential = Some(Credential::new(token));
    }

    /// Forget the held token
    pub fn clear(&mut self) {
        self.credential = None;
    }
}

impl CredentialSource for StaticCredentialSource {
    fn get_credential(&self) -> Option<Credential> {
        self.credential.clone().filter(|c| !c.is_empty())
    }
}

/// Reads the token from an environment variable at lookup time
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    var: String,
}

impl EnvCredentialSource {
    /// Source reading `var` (e.g. `OPENROUTER_API_KEY`)
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable consulted
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl CredentialSource for EnvCredentialSource {
    fn get_credential(&self) -> Option<Credential> {
        let credential = std::env::var(&self.var).ok().map(Credential::new)?;
        if credential.is_empty() {
            return None;
        }
        tracing::debug!("Using credential from environment variable {}", self.var);
        Some(credential)
    }
}

/// Token stored in the operating system keyring
#[derive(Debug, Clone)]
pub struct KeyringCredentialSource {
    service: String,
    user: String,
}

impl KeyringCredentialSource {
    /// Source for the keyring entry `service`/`user`
    pub fn new(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    /// Keyring service name
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Keyring user name
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Save `credential` to the keyring
    ///
    /// # Errors
    ///
    /// Returns a keyring error if the platform store is unavailable.
    pub fn store(&self, credential: &Credential) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, &self.user)?;
        entry.set_password(credential.bearer_token())?;
        tracing::info!("Stored credential in keyring ({}/{})", self.service, self.user);
        Ok(())
    }

    /// Remove the stored token (best-effort)
    pub fn clear(&self) {
        match keyring::Entry::new(&self.service, &self.user) {
            Ok(entry) => {
                if let Err(e) = entry.delete_password() {
                    tracing::warn!("Failed to clear keyring credential: {}", e);
                } else {
                    tracing::info!("Cleared keyring credential ({}/{})", self.service, self.user);
                }
            }
            Err(e) => {
                tracing::warn!("Keyring not available while clearing credential: {}", e);
            }
        }
    }
}

impl CredentialSource for KeyringCredentialSource {
    fn get_credential(&self) -> Option<Credential> {
        let entry = match keyring::Entry::new(&self.service, &self.user) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Keyring unavailable: {}", e);
                return None;
            }
        };

        match entry.get_password() {
            Ok(token) => Some(Credential::new(token)).filter(|c| !c.is_empty()),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                tracing::warn!("Failed to read keyring credential: {}", e);
                None
            }
        }
    }
}

/// Tries each source in order and returns the first credential found
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    /// Empty chain (always yields `None`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; earlier sources win
    pub fn with(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl CredentialSource for CredentialChain {
    fn get_credential(&self) -> Option<Credential> {
        self.sources.iter().find_map(|s| s.get_credential())
    }
}
