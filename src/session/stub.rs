//! The stub connector records the SMTP dialogue instead of performing it.
//! It can be useful for testing purposes.
//!
//! Every [`StubSession`] it hands out writes to a shared log, so a test can
//! keep a clone of the connector and inspect what a `send` did after the
//! fact. A single step can be made to fail to exercise error paths.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use lettre::{address::Envelope, transport::smtp::authentication::Credentials};

use super::{Connector, Endpoint, Session};
use crate::error::{self, Error};

/// A step of the dialogue as seen by the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// TCP connection, `tls` is true for implicit TLS
    Connect {
        server: String,
        port: u16,
        tls: bool,
    },
    /// Greeting with the announced client name
    Ehlo(String),
    StartTls,
    Auth,
    /// A complete mail transaction
    Mail { from: Option<String>, to: Vec<String> },
    Quit,
    /// Stream shut down
    Close,
}

/// The step a [`StubConnector`] can be told to reject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connect,
    StartTls,
    Auth,
    Send,
    Quit,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Connect => "connect",
            Step::StartTls => "STARTTLS",
            Step::Auth => "AUTH",
            Step::Send => "DATA",
            Step::Quit => "QUIT",
        })
    }
}

#[derive(Debug, Default)]
struct Log {
    commands: Vec<Command>,
    messages: Vec<Vec<u8>>,
    open: usize,
}

/// Hands out sessions that only record what they are asked to do
#[derive(Debug, Clone, Default)]
pub struct StubConnector {
    log: Arc<Mutex<Log>>,
    fail_on: Option<Step>,
}

impl StubConnector {
    /// Creates a connector whose sessions accept everything
    pub fn new() -> StubConnector {
        StubConnector::default()
    }

    /// Creates a connector whose sessions reject `step`
    pub fn failing_on(step: Step) -> StubConnector {
        StubConnector {
            fail_on: Some(step),
            ..StubConnector::default()
        }
    }

    /// Commands recorded so far, across all sessions
    pub fn commands(&self) -> Vec<Command> {
        self.log().commands.clone()
    }

    /// Message contents received through `DATA`
    pub fn messages(&self) -> Vec<Vec<u8>> {
        self.log().messages.clone()
    }

    /// Returns true while any session is still open
    pub fn is_open(&self) -> bool {
        self.log().open > 0
    }

    fn log(&self) -> MutexGuard<'_, Log> {
        lock(&self.log)
    }

    fn connect(&self, endpoint: &Endpoint<'_>, tls: bool) -> Result<StubSession, Error> {
        check(self.fail_on, Step::Connect)?;

        let mut log = self.log();
        log.commands.push(Command::Connect {
            server: endpoint.server.to_owned(),
            port: endpoint.port,
            tls,
        });
        log.commands.push(Command::Ehlo(endpoint.hello_name.to_string()));
        log.open += 1;

        Ok(StubSession {
            log: Arc::clone(&self.log),
            fail_on: self.fail_on,
            hello_name: endpoint.hello_name.to_string(),
            sent_quit: false,
            closed: false,
        })
    }
}

impl Connector for StubConnector {
    type Session = StubSession;

    fn connect_tls(&self, endpoint: &Endpoint<'_>) -> Result<StubSession, Error> {
        self.connect(endpoint, true)
    }

    fn connect_plain(&self, endpoint: &Endpoint<'_>) -> Result<StubSession, Error> {
        self.connect(endpoint, false)
    }
}

/// Session handed out by [`StubConnector`]
#[derive(Debug)]
pub struct StubSession {
    log: Arc<Mutex<Log>>,
    fail_on: Option<Step>,
    hello_name: String,
    sent_quit: bool,
    closed: bool,
}

impl StubSession {
    fn record(&self, command: Command) {
        lock(&self.log).commands.push(command);
    }
}

impl Session for StubSession {
    fn starttls(&mut self) -> Result<(), Error> {
        self.record(Command::StartTls);
        check(self.fail_on, Step::StartTls)?;
        self.record(Command::Ehlo(self.hello_name.clone()));
        Ok(())
    }

    fn auth(&mut self, _credentials: &Credentials) -> Result<(), Error> {
        self.record(Command::Auth);
        check(self.fail_on, Step::Auth)
    }

    fn send(&mut self, envelope: &Envelope, email: &[u8]) -> Result<(), Error> {
        self.record(Command::Mail {
            from: envelope.from().map(ToString::to_string),
            to: envelope.to().iter().map(ToString::to_string).collect(),
        });
        check(self.fail_on, Step::Send)?;
        lock(&self.log).messages.push(email.to_vec());
        Ok(())
    }

    fn quit(&mut self) -> Result<(), Error> {
        self.sent_quit = true;
        self.record(Command::Quit);
        check(self.fail_on, Step::Quit)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        if !self.sent_quit {
            let _ = self.quit();
        }
        self.closed = true;

        let mut log = lock(&self.log);
        log.commands.push(Command::Close);
        log.open -= 1;
    }
}

fn lock(log: &Mutex<Log>) -> MutexGuard<'_, Log> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

fn check(fail_on: Option<Step>, step: Step) -> Result<(), Error> {
    if fail_on == Some(step) {
        Err(error::transport(format!("{step} rejected by stub server")))
    } else {
        Ok(())
    }
}
