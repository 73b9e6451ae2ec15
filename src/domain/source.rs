//! Raw content sources and the classified domain built from them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;

use super::classifier::DomainClassifier;
use super::DomainProvider;

/// One raw content entry: a numeric key and its delimited descriptor string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Content key.
    pub key: u32,
    /// Slash-delimited descriptor, name first.
    pub descriptor: String,
}

impl RawRecord {
    /// Create a record.
    pub fn new(key: u32, descriptor: impl Into<String>) -> Self {
        Self {
            key,
            descriptor: descriptor.into(),
        }
    }

    /// The first descriptor segment, conventionally the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.descriptor.split('/').next().unwrap_or_default()
    }
}

/// Loads raw content records.
pub trait ContentSource {
    /// All raw records, in a stable order.
    ///
    /// # Errors
    /// Returns [`ProviderError::ContentUnavailable`] if the content cannot be loaded.
    fn raw_records(&self) -> Result<Vec<RawRecord>, ProviderError>;
}

/// Content source backed by an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    records: Vec<RawRecord>,
}

impl StaticContent {
    /// Create a source over `records`.
    #[must_use]
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Create a source from `(key, descriptor)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(key, descriptor)| RawRecord::new(key, descriptor))
                .collect(),
        )
    }
}

impl ContentSource for StaticContent {
    fn raw_records(&self) -> Result<Vec<RawRecord>, ProviderError> {
        Ok(self.records.clone())
    }
}

/// [`DomainProvider`] that filters a content source through a classifier.
#[derive(Debug, Clone)]
pub struct ClassifiedDomain<S, C> {
    source: S,
    classifier: C,
}

impl<S, C> ClassifiedDomain<S, C>
where
    S: ContentSource,
    C: DomainClassifier,
{
    /// Combine a content source with a classifier.
    pub fn new(source: S, classifier: C) -> Self {
        Self { source, classifier }
    }

    /// The underlying content source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

impl<S, C> DomainProvider for ClassifiedDomain<S, C>
where
    S: ContentSource,
    C: DomainClassifier,
{
    type Item = C::Item;

    fn list_item_kinds(&self) -> Result<Vec<C::Item>, ProviderError> {
        let records = self.source.raw_records()?;
        let mut items = Vec::new();
        for record in records
            .iter()
            .filter(|r| self.classifier.is_domain_member(r))
        {
            match self.classifier.item_kind(record) {
                Ok(item) => items.push(item),
                Err(err) => {
                    debug!(key = record.key, error = %err, "skipping unclassifiable record");
                }
            }
        }
        Ok(items)
    }
}
