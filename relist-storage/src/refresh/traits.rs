//! Capability trait consumed by the refresh protocol.
//!
//! One implementation exists per resource kind. Implementations are
//! stateless adapters over a transport; they never retry and never cache.

use async_trait::async_trait;
use relist_core::{GetOptions, ListOptions, RelistResult, ResourceObject};

/// Per-kind list/get capability used by the refresh protocol.
///
/// The protocol is generic over the item and list types named by the
/// associated types, so detection and orchestration are written once for
/// every kind.
///
/// # Implementation Requirements
///
/// - `list` honours the resource version in `options`: a token may be
///   answered by the read-through cache, a cleared token must not be
/// - `get` always reads the authoritative source directly
/// - `items(None)` returns an empty slice
/// - `status_is_empty(None)` returns `true`
/// - Errors are returned unchanged; no retries
#[async_trait]
pub trait RefreshLister: Send + Sync {
    /// Resource item type.
    type Item: ResourceObject;

    /// List envelope type.
    type List: Send + Sync + 'static;

    /// List all items in a namespace.
    async fn list(&self, namespace: &str, options: &ListOptions) -> RelistResult<Self::List>;

    /// Fetch one item directly from the authoritative source.
    async fn get(
        &self,
        namespace: &str,
        name: &str,
        options: &GetOptions,
    ) -> RelistResult<Self::Item>;

    /// Items carried by a list envelope.
    fn items<'a>(&self, list: Option<&'a Self::List>) -> &'a [Self::Item];

    /// True if the item's status subresource has not been populated yet.
    fn status_is_empty(&self, item: Option<&Self::Item>) -> bool;
}
