//! SMTP email relay.

use crate::error::ApiError;
use crate::image::{ImageRef, InlineImage};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub attachment: Option<ImageRef>,
}

#[async_trait]
pub trait EmailRelay: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    http: Client,
}

impl SmtpRelay {
    /// Port 465 uses implicit TLS; any other port negotiates STARTTLS.
    pub fn new(settings: &SmtpSettings, http: Client) -> Result<Self, ApiError> {
        let builder = if settings.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| ApiError::ConfigError(format!("Invalid SMTP host: {}", e)))?;

        let mut builder = builder.port(settings.port);
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|e| ApiError::ConfigError(format!("Invalid from address: {}", e)))?;

        Ok(Self {
            transport: builder.build(),
            from,
            http,
        })
    }

    async fn resolve_attachment(&self, image: &ImageRef) -> Result<InlineImage, ApiError> {
        match image {
            ImageRef::Inline(inline) => Ok(inline.clone()),
            ImageRef::Url(url) => {
                debug!(url = %url, "fetching remote attachment");
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ApiError::EmailFailed(format!("Attachment fetch failed: {}", e)))?;
                let mime = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
                    .unwrap_or_else(|| "image/png".to_string());
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ApiError::EmailFailed(format!("Attachment fetch failed: {}", e)))?;
                Ok(InlineImage::new(mime, bytes.to_vec()))
            }
        }
    }
}

#[async_trait]
impl EmailRelay for SmtpRelay {
    async fn send(&self, message: EmailMessage) -> Result<(), ApiError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| ApiError::EmailFailed(format!("Invalid recipient: {}", e)))?;
        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str());

        let email = match &message.attachment {
            Some(image) => {
                let inline = self.resolve_attachment(image).await?;
                let content_type = ContentType::parse(&inline.mime)
                    .map_err(|e| ApiError::EmailFailed(format!("Bad attachment type: {}", e)))?;
                let filename = format!("sticker.{}", inline.extension());
                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(message.text.clone()))
                        .singlepart(Attachment::new(filename).body(inline.bytes, content_type)),
                )
            }
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.text.clone()),
        }
        .map_err(|e| ApiError::EmailFailed(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| ApiError::EmailFailed(e.to_string()))?;
        info!(subject = %message.subject, "sticker email sent");
        Ok(())
    }
}
