//! Error and result type for the mail sender

use std::{error::Error as StdError, fmt, path::PathBuf};

use crate::BoxError;

/// The errors that may occur while composing or sending an email
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    /// Returns true if the sender was constructed with invalid parameters
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidConfiguration)
    }

    /// Returns true if an attachment path is missing or not a regular file
    pub fn is_attachment_not_found(&self) -> bool {
        matches!(self.inner.kind, Kind::AttachmentNotFound(_))
    }

    /// Returns true if an operation needed a message but none was created
    pub fn is_no_message(&self) -> bool {
        matches!(self.inner.kind, Kind::NoMessage)
    }

    /// Returns true if a recipient could not be parsed as a mailbox
    pub fn is_address(&self) -> bool {
        matches!(self.inner.kind, Kind::Address)
    }

    /// Returns true if the message could not be built
    pub fn is_message(&self) -> bool {
        matches!(self.inner.kind, Kind::Message)
    }

    /// Returns true if an attachment could not be read
    pub fn is_io(&self) -> bool {
        matches!(self.inner.kind, Kind::Io)
    }

    /// Returns true if the error happened while talking to the SMTP server
    ///
    /// This covers connecting, TLS negotiation, authentication and
    /// transmission. The source is the underlying SMTP client error.
    pub fn is_transport(&self) -> bool {
        matches!(self.inner.kind, Kind::Transport)
    }

    /// The attachment path that could not be found, if any
    pub fn attachment_path(&self) -> Option<&PathBuf> {
        match self.inner.kind {
            Kind::AttachmentNotFound(ref path) => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// Port outside {587, 465} or unusable sender
    InvalidConfiguration,
    /// Attachment path does not resolve to a regular file
    AttachmentNotFound(PathBuf),
    /// `create` was never called
    NoMessage,
    /// Recipient is not a mailbox
    Address,
    /// Message builder error
    Message,
    /// Attachment read error
    Io,
    /// Connection, TLS, authentication or transmission error
    Transport,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("panthyr_email::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::InvalidConfiguration => f.write_str("invalid configuration")?,
            Kind::AttachmentNotFound(ref path) => {
                write!(f, "requested attachment {} does not exist", path.display())?;
            }
            Kind::NoMessage => f.write_str("no message has been created")?,
            Kind::Address => f.write_str("invalid address")?,
            Kind::Message => f.write_str("message error")?,
            Kind::Io => f.write_str("i/o error")?,
            Kind::Transport => f.write_str("transport error")?,
        };

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn std::error::Error + 'static) = &**e;
            r
        })
    }
}

pub(crate) fn invalid_configuration<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidConfiguration, Some(e))
}

pub(crate) fn attachment_not_found(path: PathBuf) -> Error {
    Error::new::<BoxError>(Kind::AttachmentNotFound(path), None)
}

pub(crate) fn no_message() -> Error {
    Error::new::<BoxError>(Kind::NoMessage, None)
}

pub(crate) fn address<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Address, Some(e))
}

pub(crate) fn message<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Message, Some(e))
}

pub(crate) fn io<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Io, Some(e))
}

pub(crate) fn transport<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Transport, Some(e))
}
