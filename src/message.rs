//! The message being composed by a [`MailSender`](crate::MailSender)

use std::{fs, path::Path};

use lettre::{
    message::{
        header::{ContentDisposition, ContentTransferEncoding, ContentType},
        Mailbox, MultiPart, SinglePart,
    },
    Message,
};

use crate::error::{self, Error};

/// Builds the subject line carrying the station tag
///
/// ```rust
/// assert_eq!(
///     panthyr_email::subject_line("STATION1", "Hi"),
///     "[PANTHYR STATION1] Hi"
/// );
/// ```
pub fn subject_line(station_id: &str, subject: &str) -> String {
    format!("[PANTHYR {station_id}] {subject}")
}

/// An outgoing `multipart/mixed` message under construction
///
/// Parts are kept in insertion order and rendered when the message is
/// sent. The first part is always the text given on creation.
#[derive(Debug, Clone)]
pub struct Draft {
    from: Mailbox,
    to: Mailbox,
    subject: String,
    body: SinglePart,
    parts: Vec<SinglePart>,
}

impl Draft {
    pub(crate) fn new(from: Mailbox, to: Mailbox, subject: String, text: String) -> Self {
        Self {
            from,
            to,
            subject,
            body: SinglePart::plain(text),
            parts: Vec::new(),
        }
    }

    /// The `From` mailbox, also used as envelope sender
    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    /// The `To` mailbox, also used as envelope recipient
    pub fn to(&self) -> &Mailbox {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Number of body parts, the initial text included
    pub fn part_count(&self) -> usize {
        self.parts.len() + 1
    }

    pub(crate) fn push_text(&mut self, text: String) {
        self.parts.push(SinglePart::plain(text));
    }

    /// Reads `path` and appends it as an `application/octet-stream` part
    ///
    /// The draft is left untouched on error.
    pub(crate) fn push_attachment(&mut self, path: &Path) -> Result<(), Error> {
        if !path.is_file() {
            return Err(error::attachment_not_found(path.to_path_buf()));
        }
        let filename = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return Err(error::attachment_not_found(path.to_path_buf())),
        };

        let content = fs::read(path).map_err(error::io)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("attaching {} ({} bytes)", filename, content.len());

        self.parts.push(attachment(&filename, content));
        Ok(())
    }

    /// Renders the draft as a lettre [`Message`]
    pub fn message(&self) -> Result<Message, Error> {
        let multipart = self.parts.iter().cloned().fold(
            MultiPart::mixed().singlepart(self.body.clone()),
            MultiPart::singlepart,
        );

        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .multipart(multipart)
            .map_err(error::message)
    }

    /// The message in its wire form, ready for the SMTP `DATA` command
    pub fn formatted(&self) -> Result<Vec<u8>, Error> {
        Ok(self.message()?.formatted())
    }
}

fn attachment(filename: &str, content: Vec<u8>) -> SinglePart {
    SinglePart::builder()
        .header(ContentType::from(mime::APPLICATION_OCTET_STREAM))
        .header(ContentDisposition::attachment(filename))
        .header(ContentTransferEncoding::Base64)
        .body(content)
}
