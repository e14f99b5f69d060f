//! Divergence detection for a single listed item.
//!
//! An item whose status is empty in a cached list is re-read directly from
//! the authoritative source. If the direct read shows a populated status,
//! the cache is lagging and the list must be refreshed.

use relist_core::{GetOptions, RelistError, ResourceObject};

use super::metrics::RefreshMetrics;
use super::traits::RefreshLister;

/// Outcome of checking one item against the authoritative source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshVerdict {
    /// The listed copy is trustworthy: either its status is populated, or
    /// the authoritative copy is empty too.
    NoRefresh,

    /// The listed copy shows an empty status the authoritative source has
    /// already populated.
    Refresh,

    /// The direct read failed. Treated as a refresh signal, including for
    /// "not found".
    Unverifiable(RelistError),
}

impl RefreshVerdict {
    /// True if the caller should re-list with the cache bypassed.
    pub fn is_refresh_needed(&self) -> bool {
        !matches!(self, Self::NoRefresh)
    }

    /// The verification error, if the direct read failed.
    pub fn error(&self) -> Option<&RelistError> {
        match self {
            Self::Unverifiable(err) => Some(err),
            _ => None,
        }
    }

    /// Split into the `(needs_refresh, error)` pair.
    pub fn into_parts(self) -> (bool, Option<RelistError>) {
        match self {
            Self::NoRefresh => (false, None),
            Self::Refresh => (true, None),
            Self::Unverifiable(err) => (true, Some(err)),
        }
    }
}

/// Decide whether a listed item indicates a stale cache.
///
/// Items with a populated status return [`RefreshVerdict::NoRefresh`]
/// without any remote call.
pub async fn needs_refresh<R>(lister: &R, item: &R::Item) -> RefreshVerdict
where
    R: RefreshLister + ?Sized,
{
    check_item(lister, item, None).await
}

pub(crate) async fn check_item<R>(
    lister: &R,
    item: &R::Item,
    metrics: Option<&RefreshMetrics>,
) -> RefreshVerdict
where
    R: RefreshLister + ?Sized,
{
    if !lister.status_is_empty(Some(item)) {
        return RefreshVerdict::NoRefresh;
    }

    if let Some(metrics) = metrics {
        RefreshMetrics::incr(&metrics.direct_gets);
    }

    match lister
        .get(item.namespace(), item.name(), &GetOptions::default())
        .await
    {
        Ok(fresh) if lister.status_is_empty(Some(&fresh)) => RefreshVerdict::NoRefresh,
        Ok(_) => RefreshVerdict::Refresh,
        Err(err) => RefreshVerdict::Unverifiable(err),
    }
}
