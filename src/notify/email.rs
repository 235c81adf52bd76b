use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::prelude::*;

#[must_use]
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub recipients: Vec<String>,
}

pub struct Mailer<T = AsyncSmtpTransport<Tokio1Executor>> {
    transport: T,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl Mailer {
    pub fn new(settings: SmtpSettings) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .with_context(|| format!("failed to create the SMTP relay `{}`", settings.host))?
            .port(settings.port)
            .credentials(Credentials::new(settings.username.clone(), settings.password.clone()))
            .build();
        Self::with_transport(transport, &settings)
    }
}

impl<T> Mailer<T>
where
    T: AsyncTransport + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn with_transport(transport: T, settings: &SmtpSettings) -> Result<Self> {
        let from: Mailbox = settings
            .from
            .parse()
            .with_context(|| format!("invalid sender address `{}`", settings.from))?;
        let recipients = settings
            .recipients
            .iter()
            .map(|recipient| {
                recipient
                    .parse::<Mailbox>()
                    .with_context(|| format!("invalid recipient address `{recipient}`"))
            })
            .collect::<Result<Vec<_>>>()?;
        ensure!(!recipients.is_empty(), "at least one recipient is required");
        Ok(Self { transport, from, recipients })
    }

    #[cfg(test)]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send the HTML message to all recipients, retrying once on failure.
    #[instrument(skip_all, fields(subject = subject))]
    pub async fn send_html(&self, subject: &str, html: String) -> Result {
        let message = self
            .recipients
            .iter()
            .fold(Message::builder().from(self.from.clone()), |builder, recipient| {
                builder.to(recipient.clone())
            })
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .context("failed to build the message")?;
        if let Err(error) = self.transport.send(message.clone()).await {
            warn!("failed to send the message, retrying once: {error:#}");
            self.transport.send(message).await.context("failed to send the message")?;
        }
        info!(n_recipients = self.recipients.len(), "sent");
        Ok(())
    }
}
