use std::sync::Arc;
use busline_core::BookingLedger;
use busline_store::app_config::{BookingRules, Config, MailConfig, MailMode};
use busline_ticket::{ConsoleTicketMailer, SmtpTicketMailer, TicketMailer, TicketResult};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn BookingLedger>,
    pub mailer: Arc<dyn TicketMailer>,
    pub booking_rules: BookingRules,
}

impl AppState {
    /// Open storage, seed the catalog and pick a mailer from configuration
    pub async fn bootstrap(config: &Config) -> anyhow::Result<Self> {
        let ledger = busline_store::open_ledger(config).await?;
        let mailer = build_mailer(&config.mail)?;

        Ok(Self {
            ledger,
            mailer,
            booking_rules: config.booking.clone(),
        })
    }

    pub fn boarding_offset(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.booking_rules.boarding_offset_minutes)
    }
}

pub fn build_mailer(config: &MailConfig) -> TicketResult<Arc<dyn TicketMailer>> {
    Ok(match config.mode {
        MailMode::Console => {
            tracing::info!("Ticket emails will be logged, not sent");
            Arc::new(ConsoleTicketMailer::new(&config.from_email, &config.from_name)?)
        }
        MailMode::Smtp => {
            tracing::info!("Ticket emails will be sent via {}:{}", config.smtp_host, config.smtp_port);
            Arc::new(SmtpTicketMailer::new(
                &config.smtp_host,
                config.smtp_port,
                &config.smtp_username,
                &config.smtp_password,
                &config.from_email,
                &config.from_name,
            )?)
        }
    })
}
