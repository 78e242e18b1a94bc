//! SMTP sessions
//!
//! A [`Connector`] opens a greeted [`Session`] either over implicit TLS or
//! in plaintext (to be upgraded with STARTTLS). Sessions are short-lived:
//! the sender wraps each one in a [`SessionGuard`] that closes it when the
//! `send` call ends, whatever the outcome.

use std::{
    ops::{Deref, DerefMut},
    time::Duration,
};

use lettre::{
    address::Envelope,
    transport::smtp::{authentication::Credentials, extension::ClientId},
};

use crate::Error;

pub mod smtp;
pub mod stub;

/// Where and how to reach the SMTP relay
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    /// Relay host, also used as the TLS server name
    pub server: &'a str,
    pub port: u16,
    /// Name announced in `EHLO`
    pub hello_name: &'a ClientId,
    /// Timeout applied to every read and write
    pub timeout: Option<Duration>,
}

/// Opens sessions to an SMTP relay
pub trait Connector {
    type Session: Session;

    /// Connects with TLS negotiated before any SMTP traffic, then sends `EHLO`
    fn connect_tls(&self, endpoint: &Endpoint<'_>) -> Result<Self::Session, Error>;

    /// Connects in plaintext, then sends `EHLO`
    fn connect_plain(&self, endpoint: &Endpoint<'_>) -> Result<Self::Session, Error>;
}

/// A greeted SMTP session
pub trait Session {
    /// Sends `STARTTLS`, upgrades the stream and sends `EHLO` again
    fn starttls(&mut self) -> Result<(), Error>;

    fn auth(&mut self, credentials: &Credentials) -> Result<(), Error>;

    /// Runs one `MAIL FROM`/`RCPT TO`/`DATA` transaction
    fn send(&mut self, envelope: &Envelope, email: &[u8]) -> Result<(), Error>;

    /// Sends `QUIT`
    fn quit(&mut self) -> Result<(), Error>;

    /// Releases the connection
    ///
    /// Sends `QUIT` if it was not sent yet, ignoring errors, and shuts the
    /// stream down. Must be safe to call after [`Session::quit`].
    fn close(&mut self);
}

/// Owns a session and closes it on drop
pub struct SessionGuard<S: Session> {
    session: S,
}

impl<S: Session> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: Session> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: Session> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("closing smtp session");
        self.session.close();
    }
}

#[cfg(test)]
mod tests {
    use super::{stub::StubConnector, *};

    #[test]
    fn guard_closes_on_drop() {
        let connector = StubConnector::new();
        let hello_name = ClientId::Domain("station.local".to_owned());
        let endpoint = Endpoint {
            server: "smtp.example.com",
            port: 465,
            hello_name: &hello_name,
            timeout: None,
        };

        {
            let _guard = SessionGuard::new(connector.connect_tls(&endpoint).unwrap());
            assert!(connector.is_open());
        }

        assert!(!connector.is_open());
    }
}
