//! Sessions backed by lettre's blocking SMTP client

use lettre::{
    address::Envelope,
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{SmtpConnection, TlsParameters},
        extension::ClientId,
    },
};

use super::{Connector, Endpoint, Session};
use crate::error::{self, Error};

/// Mechanisms tried in order during `AUTH`
const MECHANISMS: &[Mechanism] = &[Mechanism::Plain, Mechanism::Login];

/// Connects to real SMTP relays
///
/// TLS uses the platform's default verification against the relay host name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpConnector;

impl SmtpConnector {
    fn open(endpoint: &Endpoint<'_>, wrapper: bool) -> Result<SmtpSession, Error> {
        let tls_parameters =
            TlsParameters::new(endpoint.server.to_owned()).map_err(error::transport)?;

        let conn = SmtpConnection::connect::<(&str, u16)>(
            (endpoint.server, endpoint.port),
            endpoint.timeout,
            endpoint.hello_name,
            wrapper.then_some(&tls_parameters),
            None,
        )
        .map_err(error::transport)?;

        Ok(SmtpSession {
            conn,
            tls_parameters,
            hello_name: endpoint.hello_name.clone(),
        })
    }
}

impl Connector for SmtpConnector {
    type Session = SmtpSession;

    fn connect_tls(&self, endpoint: &Endpoint<'_>) -> Result<SmtpSession, Error> {
        Self::open(endpoint, true)
    }

    fn connect_plain(&self, endpoint: &Endpoint<'_>) -> Result<SmtpSession, Error> {
        Self::open(endpoint, false)
    }
}

/// A live connection to an SMTP relay
pub struct SmtpSession {
    conn: SmtpConnection,
    tls_parameters: TlsParameters,
    hello_name: ClientId,
}

impl SmtpSession {
    /// Tells if the underlying stream is currently encrypted
    pub fn is_encrypted(&self) -> bool {
        self.conn.is_encrypted()
    }
}

impl Session for SmtpSession {
    fn starttls(&mut self) -> Result<(), Error> {
        self.conn
            .starttls(&self.tls_parameters, &self.hello_name)
            .map_err(error::transport)
    }

    fn auth(&mut self, credentials: &Credentials) -> Result<(), Error> {
        self.conn
            .auth(MECHANISMS, credentials)
            .map(drop)
            .map_err(error::transport)
    }

    fn send(&mut self, envelope: &Envelope, email: &[u8]) -> Result<(), Error> {
        self.conn
            .send(envelope, email)
            .map(drop)
            .map_err(error::transport)
    }

    fn quit(&mut self) -> Result<(), Error> {
        self.conn.quit().map(drop).map_err(error::transport)
    }

    fn close(&mut self) {
        self.conn.abort();
    }
}
