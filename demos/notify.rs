use panthyr_email::MailSender;

fn main() {
    tracing_subscriber::fmt::init();

    // Open a connection to the relay using STARTTLS on port 587
    let mut sender = MailSender::new(
        "smtp.example.com",
        "station@example.com",
        "smtp_password",
        None,
        587,
    )
    .unwrap();

    sender
        .create(
            "operator@example.com",
            "Tracker stalled",
            "The pan/tilt head did not reach its target position.",
            "M1",
        )
        .unwrap();
    sender.add_text("Last known position: 123.4 / -12.5").unwrap();
    if let Err(e) = sender.add_attachment("/var/log/panthyr/tracker.log") {
        eprintln!("Could not attach log: {e}");
    }

    match sender.send() {
        Ok(()) => println!("Email sent successfully!"),
        Err(e) => panic!("Could not send email: {e:?}"),
    }
}
