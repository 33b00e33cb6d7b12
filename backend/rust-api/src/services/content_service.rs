use anyhow::Context;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::metrics::{CONTACT_SUBMISSIONS_TOTAL, CONTENT_UPDATES_TOTAL};
use crate::models::content::{
    ContactInfo, ContactRequest, ContactSubmission, ContentSection, HeroNav, Profile, ResumeLink,
    SectionDocument, TechStack, ThemeColors, CONTACT_SUBMISSIONS_KEY,
};

use super::blob_store::BlobStore;

/// Oldest submissions are dropped once the inbox holds this many.
pub const CONTACT_INBOX_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Malformed section document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Contact submission {0} not found")]
    SubmissionNotFound(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Editable site sections and the contact inbox, kept as JSON blobs.
/// Reads never fail: a missing or unreadable blob yields the section default.
pub struct ContentService {
    store: Arc<dyn BlobStore>,
    inbox: Mutex<()>,
}

impl ContentService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            inbox: Mutex::new(()),
        }
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn ping_store(&self) -> anyhow::Result<()> {
        self.store.ping().await
    }

    pub async fn load<D: SectionDocument>(&self) -> D {
        let key = D::SECTION.storage_key();
        match self.store.get(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, "Stored section is unreadable, using defaults: {}", e);
                D::default()
            }),
            Ok(None) => D::default(),
            Err(e) => {
                tracing::warn!(key, "Failed to read section, using defaults: {:#}", e);
                D::default()
            }
        }
    }

    pub async fn save<D: SectionDocument>(&self, document: D) -> Result<D, ContentError> {
        document.validate()?;
        let raw = serde_json::to_string(&document)?;
        self.store.put(D::SECTION.storage_key(), &raw).await?;

        CONTENT_UPDATES_TOTAL
            .with_label_values(&[D::SECTION.slug(), "save"])
            .inc();
        tracing::info!(section = %D::SECTION, "Content section saved");
        Ok(document)
    }

    /// Section as JSON, whatever its type.
    pub async fn section(&self, section: ContentSection) -> Result<Value, ContentError> {
        Ok(match section {
            ContentSection::HeroNav => serde_json::to_value(self.load::<HeroNav>().await)?,
            ContentSection::ContactInfo => serde_json::to_value(self.load::<ContactInfo>().await)?,
            ContentSection::Theme => serde_json::to_value(self.load::<ThemeColors>().await)?,
            ContentSection::Profile => serde_json::to_value(self.load::<Profile>().await)?,
            ContentSection::Resume => serde_json::to_value(self.load::<ResumeLink>().await)?,
            ContentSection::TechStack => serde_json::to_value(self.load::<TechStack>().await)?,
        })
    }

    pub async fn save_section(
        &self,
        section: ContentSection,
        body: Value,
    ) -> Result<Value, ContentError> {
        match section {
            ContentSection::HeroNav => self.save_value::<HeroNav>(body).await,
            ContentSection::ContactInfo => self.save_value::<ContactInfo>(body).await,
            ContentSection::Theme => self.save_value::<ThemeColors>(body).await,
            ContentSection::Profile => self.save_value::<Profile>(body).await,
            ContentSection::Resume => self.save_value::<ResumeLink>(body).await,
            ContentSection::TechStack => self.save_value::<TechStack>(body).await,
        }
    }

    async fn save_value<D: SectionDocument>(&self, body: Value) -> Result<Value, ContentError> {
        let document: D = serde_json::from_value(body)?;
        let saved = self.save(document).await?;
        Ok(serde_json::to_value(saved)?)
    }

    /// Drops the stored blob so the section falls back to its defaults.
    pub async fn reset_section(&self, section: ContentSection) -> Result<Value, ContentError> {
        self.store.delete(section.storage_key()).await?;
        CONTENT_UPDATES_TOTAL
            .with_label_values(&[section.slug(), "reset"])
            .inc();
        tracing::info!(section = %section, "Content section reset to defaults");
        self.section(section).await
    }

    async fn read_inbox(&self) -> Vec<ContactSubmission> {
        match self.store.get(CONTACT_SUBMISSIONS_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Contact submissions are unreadable, starting empty: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read contact submissions: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn write_inbox(&self, submissions: &[ContactSubmission]) -> Result<(), ContentError> {
        let raw = serde_json::to_string(submissions).context("Failed to encode submissions")?;
        self.store.put(CONTACT_SUBMISSIONS_KEY, &raw).await?;
        Ok(())
    }

    pub async fn submit_contact(
        &self,
        request: ContactRequest,
    ) -> Result<ContactSubmission, ContentError> {
        request.validate()?;

        let submission = ContactSubmission {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            message: request.message.trim().to_string(),
            timestamp: Utc::now(),
        };

        let _guard = self.inbox.lock().await;
        let mut submissions = self.read_inbox().await;
        submissions.push(submission.clone());
        if submissions.len() > CONTACT_INBOX_LIMIT {
            let overflow = submissions.len() - CONTACT_INBOX_LIMIT;
            submissions.drain(..overflow);
            tracing::warn!(dropped = overflow, "Contact inbox full, oldest submissions dropped");
        }
        self.write_inbox(&submissions).await?;

        CONTACT_SUBMISSIONS_TOTAL.inc();
        tracing::info!(id = %submission.id, "Contact submission received");
        Ok(submission)
    }

    /// Newest first.
    pub async fn contact_submissions(&self) -> Vec<ContactSubmission> {
        let mut submissions = self.read_inbox().await;
        submissions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        submissions
    }

    pub async fn delete_contact_submission(&self, id: &str) -> Result<(), ContentError> {
        let _guard = self.inbox.lock().await;
        let mut submissions = self.read_inbox().await;
        let before = submissions.len();
        submissions.retain(|submission| submission.id != id);
        if submissions.len() == before {
            return Err(ContentError::SubmissionNotFound(id.to_string()));
        }
        self.write_inbox(&submissions).await?;

        CONTENT_UPDATES_TOTAL
            .with_label_values(&["contact-submissions", "delete"])
            .inc();
        Ok(())
    }
}
