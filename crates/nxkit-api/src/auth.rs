use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Username and password for HTTP basic auth against NX-API.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// `(username, password)` pair for `reqwest::RequestBuilder::basic_auth`.
    pub(crate) fn basic_auth(&self) -> (&str, &str) {
        (&self.username, self.password.expose_secret())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Source of credentials supplied by the caller.
///
/// The transport never looks at the environment or the home directory on
/// its own; anything of that kind is an implementation of this trait that
/// the caller chooses to pass in.
pub trait CredentialsProvider: Send + Sync {
    /// Credentials for `host`, or `None` if this source has nothing.
    fn credentials(&self, host: &str) -> Option<Credentials>;
}

impl CredentialsProvider for Credentials {
    fn credentials(&self, _host: &str) -> Option<Credentials> {
        Some(self.clone())
    }
}

/// Pick credentials for `host`: explicit ones first, then each provider in
/// order.
pub fn resolve_credentials(
    host: &str,
    explicit: Option<Credentials>,
    providers: &[&dyn CredentialsProvider],
) -> Result<Credentials, Error> {
    if let Some(creds) = explicit {
        return Ok(creds);
    }
    providers
        .iter()
        .find_map(|p| p.credentials(host))
        .ok_or_else(|| Error::input(format!("no credentials available for {host}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl CredentialsProvider for Fixed {
        fn credentials(&self, _host: &str) -> Option<Credentials> {
            self.0
                .map(|user| Credentials::new(user, SecretString::from("pw".to_string())))
        }
    }

    #[test]
    fn explicit_credentials_win() {
        let explicit = Credentials::new("admin", SecretString::from("x".to_string()));
        let provider = Fixed(Some("netauth"));
        let creds = resolve_credentials("sw1", Some(explicit), &[&provider]).unwrap();
        assert_eq!(creds.username(), "admin");
    }

    #[test]
    fn first_provider_with_an_answer_wins() {
        let empty = Fixed(None);
        let file = Fixed(Some("ops"));
        let creds = resolve_credentials("sw1", None, &[&empty, &file]).unwrap();
        assert_eq!(creds.username(), "ops");
    }

    #[test]
    fn nothing_available_is_an_input_error() {
        let err = resolve_credentials("sw1", None, &[&Fixed(None)]).unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("admin", SecretString::from("hunter2".to_string()));
        let shown = format!("{creds:?}");
        assert!(shown.contains("admin"));
        assert!(!shown.contains("hunter2"));
    }
}
