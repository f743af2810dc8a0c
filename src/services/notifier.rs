use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::error::DeliveryError;
use crate::models::EmailDispatch;

#[async_trait]
pub trait ReportDelivery: Send + Sync {
    async fn deliver(&self, dispatch: &EmailDispatch) -> Result<(), DeliveryError>;
}

pub fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::Address {
            address: address.to_string(),
            message: e.to_string(),
        })
}

/// Delivers results over SMTP with STARTTLS.
#[derive(Clone)]
pub struct SmtpNotifier {
    host: String,
    port: u16,
    sender: String,
    password: String,
}

impl SmtpNotifier {
    pub fn new(host: &str, port: u16, sender: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            sender: sender.to_string(),
            password: password.to_string(),
        }
    }

    pub fn build_message(&self, dispatch: &EmailDispatch) -> Result<Message, DeliveryError> {
        let from = parse_mailbox(&self.sender)?;

        Message::builder()
            .from(from)
            .to(dispatch.recipient.clone())
            .subject(dispatch.subject.as_str())
            .multipart(MultiPart::mixed().singlepart(SinglePart::plain(dispatch.body.clone())))
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

#[async_trait]
impl ReportDelivery for SmtpNotifier {
    async fn deliver(&self, dispatch: &EmailDispatch) -> Result<(), DeliveryError> {
        let message = self.build_message(dispatch)?;

        // Built per send with no pool: the connection closes when `send` returns.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(self.sender.clone(), self.password.clone()))
            .build();

        let response = transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        info!(
            recipient = %dispatch.recipient,
            smtp_code = %response.code(),
            "Analysis email submitted"
        );
        Ok(())
    }
}
