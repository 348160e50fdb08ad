use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};

use crate::{
    config::Settings,
    error::{AppError, Result},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<()>;
}

fn parse_mailbox(addr: &str) -> Result<Mailbox> {
    addr.parse::<Mailbox>()
        .map_err(|err| AppError::Mail(format!("invalid address {}: {}", addr, err)))
}

fn build_message(from: &Mailbox, email: &Email) -> Result<Message> {
    let mut builder = Message::builder()
        .from(from.clone())
        .to(parse_mailbox(&email.to)?)
        .subject(email.subject.as_str())
        .header(header::ContentType::TEXT_PLAIN);
    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }
    Ok(builder.body(email.body.clone())?)
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &Settings) -> Result<Self> {
        let from = parse_mailbox(&settings.mail_from)?;
        let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
            .port(settings.smtp_port);
        let builder = match (&settings.smtp_username, &settings.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> Result<()> {
        let message = build_message(&self.from, &email)?;
        self.transport.send(message).await?;
        tracing::info!(subject = %email.subject, "email sent");
        Ok(())
    }
}

/// Stands in for SMTP when no host is configured: the message is only logged.
pub struct LogMailer {
    from: Mailbox,
}

impl LogMailer {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            from: parse_mailbox(&settings.mail_from)?,
        })
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<()> {
        // still build it so malformed addresses fail the same way as with SMTP
        build_message(&self.from, &email)?;
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "no SMTP host configured; email not sent"
        );
        Ok(())
    }
}

pub fn from_settings(settings: &Settings) -> Result<Box<dyn Mailer>> {
    if settings.smtp_host.trim().is_empty() {
        tracing::warn!("SMTP host not configured; contact messages will only be logged");
        Ok(Box::new(LogMailer::new(settings)?))
    } else {
        Ok(Box::new(SmtpMailer::new(settings)?))
    }
}
