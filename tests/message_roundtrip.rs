use std::io::Write;

use mailparse::{DispositionType, MailHeaderMap, ParsedMail};
use panthyr_email::{session::stub::StubConnector, MailSender};
use pretty_assertions::assert_eq;

fn mailer(connector: &StubConnector) -> MailSender<StubConnector> {
    MailSender::new("smtp.example.com", "me@example.com", "pw", None, 587)
        .unwrap()
        .with_connector(connector.clone())
}

fn sent(connector: &StubConnector) -> Vec<u8> {
    let mut messages = connector.messages();
    assert_eq!(messages.len(), 1);
    messages.remove(0)
}

fn text(part: &ParsedMail<'_>) -> String {
    assert_eq!(part.ctype.mimetype, "text/plain");
    part.get_body().unwrap().trim_end().to_owned()
}

#[test]
fn headers_and_text_parts() {
    let connector = StubConnector::new();
    let mut mailer = mailer(&connector);

    mailer.create("a@b.com", "Hi", "body", "STATION1").unwrap();
    mailer.add_text("more").unwrap();
    mailer.send().unwrap();

    let raw = sent(&connector);
    let mail = mailparse::parse_mail(&raw).unwrap();

    assert_eq!(
        mail.headers.get_first_value("Subject").as_deref(),
        Some("[PANTHYR STATION1] Hi")
    );
    assert_eq!(mail.headers.get_first_value("To").as_deref(), Some("a@b.com"));
    assert_eq!(
        mail.headers.get_first_value("From").as_deref(),
        Some("me@example.com")
    );
    assert_eq!(mail.ctype.mimetype, "multipart/mixed");
    assert_eq!(mail.subparts.len(), 2);
    assert_eq!(text(&mail.subparts[0]), "body");
    assert_eq!(text(&mail.subparts[1]), "more");
}

#[test]
fn attachment_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radiance_20240101.bin");
    let content: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
    std::fs::File::create(&path)
        .unwrap()
        .write_all(&content)
        .unwrap();

    let connector = StubConnector::new();
    let mut mailer = mailer(&connector);

    mailer
        .create("a@b.com", "Daily data", "See attached.", "M1")
        .unwrap();
    mailer.add_attachment(&path).unwrap();
    mailer.send().unwrap();

    let raw = sent(&connector);
    let mail = mailparse::parse_mail(&raw).unwrap();

    assert_eq!(
        mail.headers.get_first_value("Subject").as_deref(),
        Some("[PANTHYR M1] Daily data")
    );
    assert_eq!(mail.subparts.len(), 2);
    assert_eq!(text(&mail.subparts[0]), "See attached.");

    let attachment = &mail.subparts[1];
    assert_eq!(attachment.ctype.mimetype, "application/octet-stream");
    assert_eq!(
        attachment
            .headers
            .get_first_value("Content-Transfer-Encoding")
            .as_deref(),
        Some("base64")
    );

    let disposition = attachment.get_content_disposition();
    assert_eq!(disposition.disposition, DispositionType::Attachment);
    assert_eq!(
        disposition.params.get("filename").map(String::as_str),
        Some("radiance_20240101.bin")
    );
    assert_eq!(attachment.get_body_raw().unwrap(), content);
}

#[test]
fn failed_attachment_is_not_sent() {
    let dir = tempfile::tempdir().unwrap();
    let connector = StubConnector::new();
    let mut mailer = mailer(&connector);

    mailer.create("a@b.com", "Hi", "body", "M1").unwrap();
    let err = mailer
        .add_attachment(dir.path().join("missing.log"))
        .unwrap_err();
    assert!(err.is_attachment_not_found());
    assert!(err.to_string().contains("missing.log"));

    mailer.send().unwrap();

    let raw = sent(&connector);
    let mail = mailparse::parse_mail(&raw).unwrap();
    assert_eq!(mail.subparts.len(), 1);
    assert_eq!(text(&mail.subparts[0]), "body");
}

#[test]
fn non_ascii_text_survives() {
    let connector = StubConnector::new();
    let mut mailer = mailer(&connector);

    mailer
        .create("a@b.com", "Température", "Capteur hors ligne à 12:00 °C", "M1")
        .unwrap();
    mailer.send().unwrap();

    let raw = sent(&connector);
    assert!(raw.is_ascii());

    let mail = mailparse::parse_mail(&raw).unwrap();
    assert_eq!(
        mail.headers.get_first_value("Subject").as_deref(),
        Some("[PANTHYR M1] Température")
    );
    assert_eq!(text(&mail.subparts[0]), "Capteur hors ligne à 12:00 °C");
}
