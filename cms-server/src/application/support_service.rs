use crate::data::ticket_repository::TicketRepository;
use crate::domain::ticket::{CreateTicketRequest, SupportTicketResponse};
use crate::domain::{DomainError, SupportTicket};
use crate::infrastructure::mailer::Notifier;
use std::sync::Arc;

pub struct SupportService {
    ticket_repo: Arc<dyn TicketRepository + Send + Sync>,
    notifier: Arc<dyn Notifier + Send + Sync>,
}

impl SupportService {
    pub fn new(
        ticket_repo: Arc<dyn TicketRepository + Send + Sync>,
        notifier: Arc<dyn Notifier + Send + Sync>,
    ) -> Self {
        Self {
            ticket_repo,
            notifier,
        }
    }

    pub async fn create_ticket(
        &self,
        req: CreateTicketRequest,
    ) -> Result<SupportTicketResponse, DomainError> {
        if req.name.trim().is_empty()
            || req.email.trim().is_empty()
            || req.subject.trim().is_empty()
            || req.message.trim().is_empty()
        {
            return Err(DomainError::ValidationError(
                "Name, email, subject and message are required".to_string(),
            ));
        }

        let ticket = self.ticket_repo.create(req).await?;

        tracing::info!(
            "Support ticket created: id={}, subject={:?}",
            ticket.id,
            ticket.subject
        );

        // The ticket is already persisted, so the emails go out in the
        // background and their failures never reach the caller.
        let notifier = self.notifier.clone();
        let notify_ticket = ticket.clone();
        tokio::spawn(async move {
            dispatch_notifications(notifier, notify_ticket).await;
        });

        Ok(SupportTicketResponse::from(ticket))
    }

    pub async fn list_tickets(&self) -> Result<Vec<SupportTicketResponse>, DomainError> {
        let tickets = self.ticket_repo.list().await?;
        Ok(tickets
            .into_iter()
            .map(SupportTicketResponse::from)
            .collect())
    }
}

/// Sends the operator alert and the submitter confirmation. Each failure is
/// logged with the ticket id; one failing does not stop the other.
pub(crate) async fn dispatch_notifications(
    notifier: Arc<dyn Notifier + Send + Sync>,
    ticket: SupportTicket,
) {
    if let Err(e) = notifier.ticket_opened(&ticket).await {
        tracing::warn!(
            "Operator notification for ticket {} failed: {:?}",
            ticket.id,
            e
        );
    }

    if let Err(e) = notifier.ticket_confirmation(&ticket).await {
        tracing::warn!(
            "Confirmation email for ticket {} failed: {:?}",
            ticket.id,
            e
        );
    }
}
