use async_trait::async_trait;
use busline_core::Booking;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::document::TicketDocument;
use crate::{TicketError, TicketResult};

/// Delivers rendered tickets to passengers
#[async_trait]
pub trait TicketMailer: Send + Sync {
    async fn send_ticket(
        &self,
        booking: &Booking,
        recipient: &str,
        document: &TicketDocument,
    ) -> TicketResult<()>;
}

/// Check that a recipient is a deliverable address before anything is booked
pub fn parse_recipient(recipient: &str) -> TicketResult<Address> {
    recipient
        .trim()
        .parse::<Address>()
        .map_err(|e| TicketError::InvalidAddress(format!("{}: {}", recipient, e)))
}

pub fn ticket_subject(booking: &Booking) -> String {
    format!("Your Bus Ticket #{}", booking.ticket_number)
}

pub fn ticket_body(booking: &Booking) -> String {
    format!(
        "Hello {},\n\nPlease find attached your bus ticket.\nTotal Fare: Rs. {:.2}",
        booking.name, booking.total_fare
    )
}

/// Build the ticket email with the PDF attached
pub fn compose_ticket_email(
    from: &Mailbox,
    booking: &Booking,
    recipient: &str,
    document: &TicketDocument,
) -> TicketResult<Message> {
    let to = Mailbox::new(Some(booking.name.clone()), parse_recipient(recipient)?);
    let content_type = ContentType::parse(TicketDocument::CONTENT_TYPE)
        .map_err(|e| TicketError::Compose(format!("Invalid content type: {}", e)))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(ticket_subject(booking))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(ticket_body(booking)))
                .singlepart(
                    Attachment::new(document.file_name.clone())
                        .body(document.bytes.clone(), content_type),
                ),
        )
        .map_err(|e| TicketError::Compose(format!("Failed to build email: {}", e)))
}

/// SMTP delivery over STARTTLS
#[derive(Clone)]
pub struct SmtpTicketMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTicketMailer {
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        smtp_username: &str,
        smtp_password: &str,
        from_email: &str,
        from_name: &str,
    ) -> TicketResult<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
            .map_err(|e| TicketError::Delivery(format!("SMTP relay error: {}", e)))?
            .port(smtp_port)
            .credentials(Credentials::new(smtp_username.to_string(), smtp_password.to_string()))
            .build();

        Ok(Self {
            transport,
            from: sender(from_email, from_name)?,
        })
    }
}

#[async_trait]
impl TicketMailer for SmtpTicketMailer {
    async fn send_ticket(
        &self,
        booking: &Booking,
        recipient: &str,
        document: &TicketDocument,
    ) -> TicketResult<()> {
        let email = compose_ticket_email(&self.from, booking, recipient, document)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| TicketError::Delivery(format!("Failed to send email: {}", e)))?;

        info!(ticket_number = %booking.ticket_number, "Ticket emailed");
        Ok(())
    }
}

/// Logs tickets instead of sending them. For development.
#[derive(Clone, Debug)]
pub struct ConsoleTicketMailer {
    from: Mailbox,
}

impl ConsoleTicketMailer {
    pub fn new(from_email: &str, from_name: &str) -> TicketResult<Self> {
        Ok(Self {
            from: sender(from_email, from_name)?,
        })
    }
}

#[async_trait]
impl TicketMailer for ConsoleTicketMailer {
    async fn send_ticket(
        &self,
        booking: &Booking,
        recipient: &str,
        document: &TicketDocument,
    ) -> TicketResult<()> {
        let email = compose_ticket_email(&self.from, booking, recipient, document)?;

        info!(
            to = %recipient,
            subject = %ticket_subject(booking),
            attachment = %document.file_name,
            size = email.formatted().len(),
            "Ticket email (development mode)"
        );
        Ok(())
    }
}

fn sender(from_email: &str, from_name: &str) -> TicketResult<Mailbox> {
    let address = from_email
        .parse::<Address>()
        .map_err(|e| TicketError::InvalidAddress(format!("{}: {}", from_email, e)))?;
    Ok(Mailbox::new(Some(from_name.to_string()), address))
}
