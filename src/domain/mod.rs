//! The prediction domain: which items can be predicted.
//!
//! A domain is derived from raw content by a classifier and cached by the
//! engine until the provider (or the oracle) is replaced.

pub mod classifier;
pub mod source;

pub use classifier::{DescriptorClassifier, DescriptorMatch, DomainClassifier};
pub use source::{ClassifiedDomain, ContentSource, RawRecord, StaticContent};

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ProviderError;

/// Identity of one item kind, keyed by its raw content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u32);

impl ItemId {
    /// Wrap a raw content key.
    #[must_use]
    pub const fn new(key: u32) -> Self {
        Self(key)
    }

    /// The raw content key.
    #[must_use]
    pub const fn key(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supplies the set of item kinds currently predictable.
///
/// The order of the returned kinds is not significant, but it must be stable
/// between calls while the underlying content is unchanged.
pub trait DomainProvider {
    /// Identity of a predictable item.
    type Item;

    /// List every item kind in the domain.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] if the underlying content cannot be loaded.
    fn list_item_kinds(&self) -> Result<Vec<Self::Item>, ProviderError>;
}

/// Lazily fetched domain with an explicit stale flag.
#[derive(Debug)]
pub struct DomainCache<K> {
    items: Option<Rc<[K]>>,
}

impl<K> Default for DomainCache<K> {
    fn default() -> Self {
        Self { items: None }
    }
}

impl<K> DomainCache<K> {
    /// Create an empty (stale) cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the next access will ask the provider again.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.items.is_none()
    }

    /// Drop the cached domain.
    pub fn invalidate(&mut self) {
        self.items = None;
    }

    /// Return the cached domain, fetching it from `provider` if stale.
    ///
    /// A failed fetch leaves the cache stale.
    ///
    /// # Errors
    /// Propagates the provider's error.
    pub fn get_or_fetch<P>(&mut self, provider: &P) -> Result<Rc<[K]>, ProviderError>
    where
        P: DomainProvider<Item = K> + ?Sized,
    {
        if let Some(items) = &self.items {
            return Ok(Rc::clone(items));
        }

        let items: Rc<[K]> = provider.list_item_kinds()?.into();
        info!(items = items.len(), "rebuilt prediction domain");
        self.items = Some(Rc::clone(&items));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingProvider {
        calls: Cell<usize>,
        fail: bool,
    }

    impl DomainProvider for CountingProvider {
        type Item = ItemId;

        fn list_item_kinds(&self) -> Result<Vec<ItemId>, ProviderError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ProviderError::ContentUnavailable {
                    reason: "not loaded".to_string(),
                });
            }
            Ok(vec![ItemId::new(535), ItemId::new(536)])
        }
    }

    #[test]
    fn domain_is_fetched_once_until_invalidated() {
        let provider = CountingProvider {
            calls: Cell::new(0),
            fail: false,
        };
        let mut cache = DomainCache::new();
        assert!(cache.is_stale());

        let first = cache.get_or_fetch(&provider).unwrap();
        let second = cache.get_or_fetch(&provider).unwrap();
        assert_eq!(&*first, &[ItemId::new(535), ItemId::new(536)]);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(provider.calls.get(), 1);

        cache.invalidate();
        assert!(cache.is_stale());
        cache.get_or_fetch(&provider).unwrap();
        assert_eq!(provider.calls.get(), 2);
    }

    #[test]
    fn failed_fetch_stays_stale() {
        let provider = CountingProvider {
            calls: Cell::new(0),
            fail: true,
        };
        let mut cache: DomainCache<ItemId> = DomainCache::new();
        assert!(cache.get_or_fetch(&provider).is_err());
        assert!(cache.is_stale());
    }

    #[test]
    fn item_id_serializes_transparently() {
        let id = ItemId::new(749);
        assert_eq!(serde_json::to_string(&id).unwrap(), "749");
        assert_eq!(id.to_string(), "749");
        assert_eq!(id.key(), 749);
    }
}
