//! Per-namespace "already checked" memo.

use std::collections::HashSet;

use tokio::sync::RwLock;

/// Namespaces already proven consistent, or already refreshed, in this
/// process.
///
/// Entries are only ever added. There is no removal, TTL or eviction: once
/// a namespace is checked it stays checked for the life of the memo.
/// Concurrent rounds for the same unchecked namespace may both scan before
/// either marks it; that duplicates work but never un-checks anything.
///
/// Uses tokio::sync::RwLock for safe async access.
#[derive(Debug, Default)]
pub struct CheckedNamespaces {
    checked: RwLock<HashSet<String>>,
}

impl CheckedNamespaces {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memo with the given namespaces already checked.
    pub fn with_checked<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            checked: RwLock::new(namespaces.into_iter().map(Into::into).collect()),
        }
    }

    /// True if scans for this namespace are skipped.
    pub async fn is_checked(&self, namespace: &str) -> bool {
        self.checked.read().await.contains(namespace)
    }

    /// Mark a namespace as checked.
    ///
    /// Returns true if the namespace was not checked before.
    pub async fn mark_checked(&self, namespace: &str) -> bool {
        if self.is_checked(namespace).await {
            return false;
        }
        self.checked.write().await.insert(namespace.to_string())
    }

    /// Number of checked namespaces.
    pub async fn len(&self) -> usize {
        self.checked.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.checked.read().await.is_empty()
    }

    /// Sorted snapshot of the checked namespaces.
    pub async fn namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = self.checked.read().await.iter().cloned().collect();
        namespaces.sort();
        namespaces
    }
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
