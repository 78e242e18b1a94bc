//! Sender settings in a form that can be loaded from configuration files

use std::{fmt, time::Duration};

use crate::{sender::MailSenderBuilder, Error, MailSender};

/// Construction parameters of a [`MailSender`]
///
/// With the `serde` feature this can be deserialized, for example from the
/// station's TOML configuration:
///
/// ```toml
/// server = "smtp.example.com"
/// username = "m1@example.com"
/// password = "secret"
/// port = 465
/// ```
///
/// `port` defaults to 587 and `sender` to `username`.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct SenderConfig {
    pub server: String,
    pub username: String,
    pub password: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sender: Option<String>,
    #[cfg_attr(feature = "serde", serde(default = "default_port"))]
    pub port: u16,
    /// Per-command timeout in seconds, 60 when unset
    #[cfg_attr(feature = "serde", serde(default))]
    pub timeout_secs: Option<u64>,
}

#[cfg(feature = "serde")]
fn default_port() -> u16 {
    lettre::transport::smtp::SUBMISSION_PORT
}

impl SenderConfig {
    /// A builder preloaded with these settings
    pub fn builder(&self) -> MailSenderBuilder {
        let mut builder = MailSender::builder(&*self.server, &*self.username, &*self.password)
            .port(self.port);
        if let Some(ref sender) = self.sender {
            builder = builder.sender(&**sender);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Some(Duration::from_secs(secs)));
        }
        builder
    }
}

impl fmt::Debug for SenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("sender", &self.sender)
            .field("port", &self.port)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl MailSender {
    /// Creates a sender from loaded settings
    pub fn from_config(config: &SenderConfig) -> Result<MailSender, Error> {
        config.builder().build()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Port;

    fn config() -> SenderConfig {
        SenderConfig {
            server: "smtp.example.com".to_owned(),
            username: "m1@example.com".to_owned(),
            password: "secret".to_owned(),
            sender: None,
            port: 465,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn sender_from_config() {
        let mailer = MailSender::from_config(&config()).unwrap();
        assert_eq!(mailer.server(), "smtp.example.com");
        assert_eq!(mailer.port(), Port::Submissions);
        assert_eq!(mailer.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(mailer.sender().to_string(), "m1@example.com");
    }

    #[test]
    fn config_port_is_checked() {
        let config = SenderConfig {
            port: 25,
            ..config()
        };
        assert!(MailSender::from_config(&config)
            .unwrap_err()
            .is_invalid_configuration());
    }

    #[test]
    fn debug_hides_password() {
        assert!(!format!("{:?}", config()).contains("secret"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_with_defaults() {
        let config: SenderConfig = serde_json::from_str(
            r#"{"server": "smtp.example.com", "username": "m1@example.com", "password": "pw"}"#,
        )
        .unwrap();

        assert_eq!(config.port, 587);
        assert_eq!(config.sender, None);
        assert_eq!(config.timeout_secs, None);

        let mailer = MailSender::from_config(&config).unwrap();
        assert_eq!(mailer.port(), Port::Submission);
        assert_eq!(mailer.timeout(), Some(crate::DEFAULT_TIMEOUT));
    }
}
