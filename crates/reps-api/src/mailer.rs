use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use reps_types::config::Configuration;

/// Outbound plain-text mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()>;
}

/// Delivers through the configured SMTP server using STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &Configuration) -> Result<Self> {
        let (host, port) = split_host_port(&config.email_smtp_server)?;
        let credentials = Credentials::new(config.email_address.clone(), config.email_password.clone());

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .with_context(|| format!("invalid SMTP relay {host}"))?
            .credentials(credentials);
        if let Some(port) = port {
            builder = builder.port(port);
        }

        let from = format!("{} <{}>", config.site_name, config.email_address)
            .parse()
            .with_context(|| format!("invalid sender address {}", config.email_address))?;

        Ok(Self { transport: builder.build(), from })
    }
}

fn split_host_port(server: &str) -> Result<(&str, Option<u16>)> {
    match server.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().with_context(|| format!("invalid SMTP port in {server}"))?;
            Ok((host, Some(port)))
        }
        None => Ok((server, None)),
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .with_context(|| format!("invalid recipient {recipient}"))?;
            builder = builder.to(mailbox);
        }

        let message = builder.body(body.to_string())?;
        self.transport.send(message).await?;
        info!("Sent \"{}\" to {} recipient(s)", subject, recipients.len());
        Ok(())
    }
}

/// Writes mail to the log instead of sending it. Used in dev mode.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        info!("Mail to {:?}: {}\n{}", recipients, subject, body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smtp_server_parsing() {
        assert_eq!(split_host_port("smtp.example.com:587").unwrap(), ("smtp.example.com", Some(587)));
        assert_eq!(split_host_port("smtp.example.com").unwrap(), ("smtp.example.com", None));
        assert!(split_host_port("smtp.example.com:nope").is_err());
    }
}
