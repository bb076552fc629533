use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::{DomainError, SupportTicket};
use crate::infrastructure::config::MailConfig;

/// Исходящие уведомления о тикетах поддержки
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Alerts the operator inbox about a new ticket.
    async fn ticket_opened(&self, ticket: &SupportTicket) -> Result<(), DomainError>;
    /// Confirms receipt to the person who submitted the ticket.
    async fn ticket_confirmation(&self, ticket: &SupportTicket) -> Result<(), DomainError>;
}

/// Notifier that delivers over authenticated SMTP with STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    support_inbox: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, DomainError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| {
                DomainError::InternalError(format!("Failed to create SMTP transport: {}", e))
            })?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .port(config.smtp_port)
            .build();

        let from_address = config
            .mail_from
            .as_deref()
            .unwrap_or(&config.smtp_username);
        let from = from_address.parse().map_err(|e| {
            DomainError::InternalError(format!("Invalid sender address {}: {}", from_address, e))
        })?;
        let support_inbox = config.support_inbox.parse().map_err(|e| {
            DomainError::InternalError(format!(
                "Invalid support inbox {}: {}",
                config.support_inbox, e
            ))
        })?;

        Ok(Self {
            transport,
            from,
            support_inbox,
        })
    }

    async fn send(&self, email: Message) -> Result<(), DomainError> {
        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::NotificationFailure(format!("Failed to send email: {}", e)))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn ticket_opened(&self, ticket: &SupportTicket) -> Result<(), DomainError> {
        // Authenticated relays reject forged senders, so the submitter goes
        // into Reply-To rather than From.
        let reply_to: Mailbox = ticket.email.parse().map_err(|e| {
            DomainError::NotificationFailure(format!(
                "Invalid submitter address {}: {}",
                ticket.email, e
            ))
        })?;

        let email = Message::builder()
            .from(self.from.clone())
            .reply_to(reply_to)
            .to(self.support_inbox.clone())
            .subject(format!("Support Ticket: {}", ticket.subject))
            .header(ContentType::TEXT_HTML)
            .body(operator_email_body(ticket))
            .map_err(|e| {
                DomainError::NotificationFailure(format!("Failed to build email: {}", e))
            })?;

        self.send(email).await
    }

    async fn ticket_confirmation(&self, ticket: &SupportTicket) -> Result<(), DomainError> {
        let to: Mailbox = ticket.email.parse().map_err(|e| {
            DomainError::NotificationFailure(format!(
                "Invalid submitter address {}: {}",
                ticket.email, e
            ))
        })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("Support Ticket Received - {}", ticket.subject))
            .header(ContentType::TEXT_HTML)
            .body(confirmation_email_body(ticket))
            .map_err(|e| {
                DomainError::NotificationFailure(format!("Failed to build email: {}", e))
            })?;

        self.send(email).await
    }
}

/// Stand-in used when SMTP is not configured. Tickets are still stored,
/// the mail step just becomes a no-op.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn ticket_opened(&self, ticket: &SupportTicket) -> Result<(), DomainError> {
        debug!("SMTP disabled, skipping operator alert for ticket {}", ticket.id);
        Ok(())
    }

    async fn ticket_confirmation(&self, ticket: &SupportTicket) -> Result<(), DomainError> {
        debug!(
            "SMTP disabled, skipping confirmation email for ticket {}",
            ticket.id
        );
        Ok(())
    }
}

fn operator_email_body(ticket: &SupportTicket) -> String {
    format!(
        "<h2>New Support Ticket</h2>\
         <p><strong>From:</strong> {} ({})</p>\
         <p><strong>Subject:</strong> {}</p>\
         <p><strong>Message:</strong></p>\
         <p>{}</p>\
         <hr>\
         <p><small>Ticket ID: {}</small></p>\
         <p><small>Submitted at: {}</small></p>",
        ticket.name,
        ticket.email,
        ticket.subject,
        ticket.message,
        ticket.id,
        ticket.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn confirmation_email_body(ticket: &SupportTicket) -> String {
    format!(
        "<h2>Thank you for contacting us!</h2>\
         <p>Hi {},</p>\
         <p>We've received your support ticket and will get back to you shortly.</p>\
         <p><strong>Your message:</strong></p>\
         <p>{}</p>\
         <hr>\
         <p><strong>Ticket ID:</strong> {}</p>\
         <p>Best regards,<br>Blog CMS Support Team</p>",
        ticket.name, ticket.message, ticket.id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticket::TicketStatus;
    use chrono::Utc;

    fn sample_ticket() -> SupportTicket {
        SupportTicket {
            id: 42,
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            subject: "Broken image".to_string(),
            message: "The header image does not load.".to_string(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn operator_email_identifies_the_submitter_and_ticket() {
        let body = operator_email_body(&sample_ticket());
        assert!(body.contains("New Support Ticket"));
        assert!(body.contains("Dana (dana@example.com)"));
        assert!(body.contains("Broken image"));
        assert!(body.contains("Ticket ID: 42"));
    }

    #[test]
    fn confirmation_email_echoes_the_message_back() {
        let body = confirmation_email_body(&sample_ticket());
        assert!(body.contains("Hi Dana,"));
        assert!(body.contains("The header image does not load."));
        assert!(body.contains("Ticket ID:</strong> 42"));
    }

    #[actix_rt::test]
    async fn disabled_notifier_accepts_everything() {
        let notifier = DisabledNotifier;
        let ticket = sample_ticket();
        assert!(notifier.ticket_opened(&ticket).await.is_ok());
        assert!(notifier.ticket_confirmation(&ticket).await.is_ok());
    }
}
