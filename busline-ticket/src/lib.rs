pub mod document;
pub mod mailer;
pub mod pdf;

pub use document::{render_ticket, TicketDocument, TicketView};
pub use mailer::{ConsoleTicketMailer, SmtpTicketMailer, TicketMailer};

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Could not compose ticket email: {0}")]
    Compose(String),

    #[error("Ticket delivery failed: {0}")]
    Delivery(String),
}

pub type TicketResult<T> = Result<T, TicketError>;
