use crate::domain::ticket::{CreateTicketRequest, TicketStatus};
use crate::domain::{DomainError, SupportTicket};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, req: CreateTicketRequest) -> Result<SupportTicket, DomainError>;
    async fn list(&self) -> Result<Vec<SupportTicket>, DomainError>;
}

pub struct PostgresTicketRepository {
    pool: PgPool,
}

impl PostgresTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn ticket_from_row(row: &sqlx::postgres::PgRow) -> Result<SupportTicket, DomainError> {
    let status: String = row.try_get("status")?;
    Ok(SupportTicket {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        status: TicketStatus::parse(&status)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn create(&self, req: CreateTicketRequest) -> Result<SupportTicket, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO support_tickets (name, email, subject, message, status, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, name, email, subject, message, status, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.subject)
        .bind(&req.message)
        .bind(TicketStatus::Open.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create support ticket: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        ticket_from_row(&row)
    }

    async fn list(&self) -> Result<Vec<SupportTicket>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, subject, message, status, created_at
            FROM support_tickets
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(ticket_from_row).collect()
    }
}
