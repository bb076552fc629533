use anyhow::{anyhow, Result};

/// Process-wide configuration, read once at startup. Nothing here mutates
/// afterwards; rotating the signing secret means redeploying.
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub cors_allowed_origins: String,
    pub upload_dir: String,
    /// When true, protected requests re-fetch the user record and refresh
    /// the username claim instead of trusting the token as-is.
    pub auth_refresh_claims: bool,
    /// Absent when SMTP is not configured; support tickets are then
    /// persisted without sending any mail.
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Operator inbox that receives new-ticket alerts.
    pub support_inbox: String,
    /// Sender mailbox; defaults to the SMTP username.
    pub mail_from: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET must be set"))?;

        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|e| anyhow!("HTTP_PORT is not a valid port number: {}", e))?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        // Получаем разрешенные CORS домены из .env
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8000,http://127.0.0.1:8000".to_string());

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let auth_refresh_claims = std::env::var("AUTH_REFRESH_CLAIMS")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            http_port,
            database_url,
            database_max_connections,
            jwt_secret,
            cors_allowed_origins,
            upload_dir,
            auth_refresh_claims,
            mail: MailConfig::from_env()?,
        })
    }
}

impl MailConfig {
    /// The whole mail block is keyed off SMTP_HOST: absent host means mail
    /// is disabled, present host makes the remaining credentials required.
    fn from_env() -> Result<Option<Self>> {
        let smtp_host = match std::env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => host,
            _ => return Ok(None),
        };

        let smtp_port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .map_err(|e| anyhow!("SMTP_PORT is not a valid port number: {}", e))?;

        let smtp_username = std::env::var("SMTP_USERNAME")
            .map_err(|_| anyhow!("SMTP_USERNAME must be set when SMTP_HOST is set"))?;
        let smtp_password = std::env::var("SMTP_PASSWORD")
            .map_err(|_| anyhow!("SMTP_PASSWORD must be set when SMTP_HOST is set"))?;
        let support_inbox = std::env::var("SUPPORT_INBOX")
            .map_err(|_| anyhow!("SUPPORT_INBOX must be set when SMTP_HOST is set"))?;

        let mail_from = std::env::var("MAIL_FROM").ok();

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            support_inbox,
            mail_from,
        }))
    }
}
