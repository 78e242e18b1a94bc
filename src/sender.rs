use std::{fmt, path::Path, time::Duration};

use lettre::{
    message::Mailbox,
    transport::smtp::{
        authentication::Credentials, extension::ClientId, SUBMISSIONS_PORT, SUBMISSION_PORT,
    },
};

use crate::{
    error::{self, Error},
    message::{subject_line, Draft},
    session::{smtp::SmtpConnector, Connector, Endpoint, Session, SessionGuard},
};

/// Default timeout for every SMTP command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The submission ports a [`MailSender`] can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Port {
    /// Port 587, plaintext connection upgraded with `STARTTLS`
    #[default]
    Submission,
    /// Port 465, TLS from the first byte
    Submissions,
}

impl Port {
    /// The TCP port number
    pub fn number(self) -> u16 {
        match self {
            Port::Submission => SUBMISSION_PORT,
            Port::Submissions => SUBMISSIONS_PORT,
        }
    }

    /// Returns true if TLS is negotiated before any SMTP traffic
    pub fn is_implicit_tls(self) -> bool {
        matches!(self, Port::Submissions)
    }
}

impl TryFrom<u16> for Port {
    type Error = Error;

    fn try_from(port: u16) -> Result<Self, Self::Error> {
        match port {
            SUBMISSION_PORT => Ok(Port::Submission),
            SUBMISSIONS_PORT => Ok(Port::Submissions),
            _ => Err(error::invalid_configuration(format!(
                "port must be either 587 (STARTTLS) or 465 (TLS), not {port}"
            ))),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Composes one email at a time and sends it over SMTP
///
/// Every [`send`](MailSender::send) opens a new connection, authenticates,
/// transmits the current message and closes the connection again, whether
/// the transaction succeeded or not.
///
/// ```rust,no_run
/// use panthyr_email::MailSender;
///
/// # fn main() -> Result<(), panthyr_email::Error> {
/// let mut sender = MailSender::new("smtp.example.com", "station@example.com", "secret", None, 587)?;
///
/// sender.create("operator@example.com", "Pump failure", "Pump 2 stopped.", "M1")?;
/// sender.add_attachment("/var/log/panthyr/pump.log")?;
/// sender.send()?;
/// # Ok(())
/// # }
/// ```
pub struct MailSender<C = SmtpConnector> {
    server: String,
    username: String,
    credentials: Credentials,
    sender: Mailbox,
    port: Port,
    timeout: Option<Duration>,
    hello_name: ClientId,
    connector: C,
    draft: Option<Draft>,
}

impl MailSender {
    /// Creates a sender for `server`
    ///
    /// When `sender` is `None` or empty, `username` is used as the `From`
    /// address. `port` must be 587 (STARTTLS) or 465 (implicit TLS).
    pub fn new(
        server: &str,
        username: &str,
        password: &str,
        sender: Option<&str>,
        port: u16,
    ) -> Result<MailSender, Error> {
        let mut builder = MailSender::builder(server, username, password).port(port);
        if let Some(sender) = sender {
            builder = builder.sender(sender);
        }
        builder.build()
    }

    /// Creates a builder with the defaults
    ///
    /// * port 587 with STARTTLS
    /// * `username` as sender
    /// * a 60-seconds timeout for SMTP commands
    /// * the local hostname in `EHLO`
    pub fn builder<S, U, P>(server: S, username: U, password: P) -> MailSenderBuilder
    where
        S: Into<String>,
        U: Into<String>,
        P: Into<String>,
    {
        MailSenderBuilder::new(server.into(), username.into(), password.into())
    }
}

impl<C: Connector> MailSender<C> {
    /// Replaces the connector used to open sessions
    pub fn with_connector<D: Connector>(self, connector: D) -> MailSender<D> {
        MailSender {
            server: self.server,
            username: self.username,
            credentials: self.credentials,
            sender: self.sender,
            port: self.port,
            timeout: self.timeout,
            hello_name: self.hello_name,
            connector,
            draft: self.draft,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The `From` mailbox and envelope sender
    pub fn sender(&self) -> &Mailbox {
        &self.sender
    }

    pub fn port(&self) -> Port {
        self.port
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// The message being composed, if [`create`](MailSender::create) was called
    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Starts a new message, discarding the previous one
    ///
    /// The subject is prefixed with `[PANTHYR <station_id>]` and `text`
    /// becomes the first `text/plain` part. If `to` is not a valid mailbox
    /// the previous message is kept.
    pub fn create(
        &mut self,
        to: &str,
        subject: &str,
        text: &str,
        station_id: &str,
    ) -> Result<(), Error> {
        let to: Mailbox = to.parse().map_err(error::address)?;

        self.draft = Some(Draft::new(
            self.sender.clone(),
            to,
            subject_line(station_id, subject),
            text.to_owned(),
        ));
        Ok(())
    }

    /// Appends another `text/plain` part to the current message
    pub fn add_text(&mut self, text: &str) -> Result<(), Error> {
        self.draft_mut()?.push_text(text.to_owned());
        Ok(())
    }

    /// Attaches a file to the current message
    ///
    /// The whole file is read into memory and sent base64 encoded as
    /// `application/octet-stream`, named after the last path component.
    pub fn add_attachment<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        self.draft_mut()?.push_attachment(path.as_ref())
    }

    /// Sends the current message over a new SMTP session
    pub fn send(&self) -> Result<(), Error> {
        let draft = self.draft.as_ref().ok_or_else(error::no_message)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("sending email message to {}", draft.to());

        let message = draft.message()?;
        let email = message.formatted();

        let endpoint = Endpoint {
            server: &self.server,
            port: self.port.number(),
            hello_name: &self.hello_name,
            timeout: self.timeout,
        };

        let mut session = match self.port {
            Port::Submissions => {
                #[cfg(feature = "tracing")]
                tracing::debug!("starting connection over TLS to {}:{}", self.server, self.port);
                SessionGuard::new(self.connector.connect_tls(&endpoint)?)
            }
            Port::Submission => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "starting connection using STARTTLS to {}:{}",
                    self.server,
                    self.port
                );
                let mut session = SessionGuard::new(self.connector.connect_plain(&endpoint)?);
                session.starttls()?;
                session
            }
        };

        session.auth(&self.credentials)?;
        session.send(message.envelope(), &email)?;
        session.quit()?;

        #[cfg(feature = "tracing")]
        tracing::debug!("email message sent");
        Ok(())
    }

    fn draft_mut(&mut self) -> Result<&mut Draft, Error> {
        self.draft.as_mut().ok_or_else(error::no_message)
    }
}

impl<C: fmt::Debug> fmt::Debug for MailSender<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSender")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("sender", &self.sender)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("hello_name", &self.hello_name)
            .field("connector", &self.connector)
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

/// Contains sender configuration.
/// Instances of this struct can be created using [`MailSender::builder`].
#[derive(Clone)]
pub struct MailSenderBuilder {
    server: String,
    username: String,
    password: String,
    sender: Option<String>,
    port: u16,
    timeout: Option<Duration>,
    hello_name: ClientId,
}

impl MailSenderBuilder {
    fn new(server: String, username: String, password: String) -> Self {
        Self {
            server,
            username,
            password,
            sender: None,
            port: SUBMISSION_PORT,
            timeout: Some(DEFAULT_TIMEOUT),
            hello_name: ClientId::default(),
        }
    }

    /// Set the `From` address, `username` is used when empty
    pub fn sender<T: Into<String>>(mut self, sender: T) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Set the port to use, either 587 or 465
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the timeout duration
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the name used during EHLO
    pub fn hello_name(mut self, name: ClientId) -> Self {
        self.hello_name = name;
        self
    }

    /// Build the sender
    ///
    /// Fails if the port is not a submission port or if the effective
    /// sender is not a valid mailbox.
    pub fn build(self) -> Result<MailSender, Error> {
        let port = Port::try_from(self.port)?;

        let sender = match self.sender {
            Some(sender) if !sender.is_empty() => sender,
            _ => self.username.clone(),
        };
        let sender: Mailbox = sender.parse().map_err(|e| {
            error::invalid_configuration(format!("sender {sender:?} is not a valid mailbox: {e}"))
        })?;

        Ok(MailSender {
            credentials: Credentials::new(self.username.clone(), self.password),
            server: self.server,
            username: self.username,
            sender,
            port,
            timeout: self.timeout,
            hello_name: self.hello_name,
            connector: SmtpConnector,
            draft: None,
        })
    }
}
