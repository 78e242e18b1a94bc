//! Email notifications for PANTHYR stations.
//!
//! A [`MailSender`] holds the SMTP relay settings and composes one
//! `multipart/mixed` message at a time: a subject tagged with the station
//! id, one or more plain-text parts and any number of file attachments.
//! Each [`MailSender::send`] opens its own connection, using implicit TLS on
//! port 465 or `STARTTLS` on port 587, and closes it before returning.
//!
//! ```rust,no_run
//! use panthyr_email::MailSender;
//!
//! # fn main() -> Result<(), panthyr_email::Error> {
//! let mut sender = MailSender::builder("smtp.example.com", "m1@example.com", "secret")
//!     .port(465)
//!     .build()?;
//!
//! sender.create("operator@example.com", "Low battery", "Battery at 11.2 V", "M1")?;
//! sender.add_text("Next check in 10 minutes.")?;
//! sender.send()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Optional features
//!
//! * **tracing**: debug events through the `tracing` crate (enabled by default)
//! * **serde**: deserialization of [`SenderConfig`]

#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces,
    unsafe_code
)]

pub use lettre::{message::Mailbox, transport::smtp::extension::ClientId};

pub use crate::config::SenderConfig;
pub use crate::error::Error;
pub use crate::message::{subject_line, Draft};
pub use crate::sender::{MailSender, MailSenderBuilder, Port, DEFAULT_TIMEOUT};

mod config;
mod error;
mod message;
mod sender;
pub mod session;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
