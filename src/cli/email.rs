use clap::Parser;

use crate::{
    notify::email::{Mailer, SmtpSettings},
    prelude::*,
};

#[derive(Parser)]
pub struct EmailArgs {
    #[clap(long = "smtp-host", env = "SMTP_HOST")]
    host: Option<String>,

    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value = "587")]
    port: u16,

    #[clap(long = "smtp-username", env = "SMTP_USERNAME")]
    username: Option<String>,

    #[clap(long = "smtp-password", env = "SMTP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Sender address, defaults to the username.
    #[clap(long = "email-from", env = "EMAIL_FROM")]
    from: Option<String>,

    #[clap(long = "email-to", env = "EMAIL_RECIPIENTS", value_delimiter = ',')]
    recipients: Vec<String>,
}

impl EmailArgs {
    /// Mailer, if SMTP is configured.
    pub fn mailer(&self) -> Result<Option<Mailer>> {
        let (Some(host), Some(username), Some(password)) =
            (&self.host, &self.username, &self.password)
        else {
            return Ok(None);
        };
        if self.recipients.is_empty() {
            warn!("SMTP is configured, but there are no recipients");
            return Ok(None);
        }
        let settings = SmtpSettings {
            host: host.clone(),
            port: self.port,
            username: username.clone(),
            password: password.clone(),
            from: self.from.clone().unwrap_or_else(|| username.clone()),
            recipients: self.recipients.clone(),
        };
        Mailer::new(settings).map(Some)
    }
}
