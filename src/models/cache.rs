use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// In-memory cache of upstream wallet balances (address -> microAlgos)
#[derive(Debug, Clone)]
pub struct BalanceCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry<u64>>>>,
    ttl: Duration,
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl BalanceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn get(&self, address: &str) -> Option<u64> {
        let cache = self.entries.read().ok()?;
        let entry = cache.get(&CacheKey::balance(address))?;

        if entry.is_expired() {
            return None;
        }

        Some(entry.value)
    }

    pub fn set(&self, address: &str, micro_algos: u64) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut cache) = self.entries.write() {
            cache.insert(CacheKey::balance(address), CacheEntry::new(micro_algos, self.ttl));
        }
    }

    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.clear();
        }
    }
}

pub struct CacheKey;

impl CacheKey {
    // Algorand addresses are base32 upper-case; normalize so lookups are case-insensitive.
    pub fn balance(address: &str) -> String {
        format!("balance:{}", address.trim().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_entry_expiration() {
        let entry = CacheEntry::new("test_value".to_string(), Duration::from_millis(10));
        assert!(!entry.is_expired());

        std::thread::sleep(Duration::from_millis(15));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_balance_cache_basic_operations() {
        let cache = BalanceCache::default();
        cache.set("algoaddr", 1_500_000);

        assert_eq!(cache.get("ALGOADDR"), Some(1_500_000));
        assert!(cache.get("OTHER").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let cache = BalanceCache::new(Duration::ZERO);
        cache.set("ADDR", 1);
        assert!(cache.get("ADDR").is_none());
    }

    #[test]
    fn test_cleanup_drops_expired_entries() {
        let cache = BalanceCache::new(Duration::from_millis(5));
        cache.set("ADDR", 7);
        std::thread::sleep(Duration::from_millis(10));
        cache.cleanup_expired();
        assert!(cache.is_empty());
    }
}
