use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::hash::Hash;
use std::mem;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last: Instant,
}

/// 两代 map：新一代写满后整体降为旧一代，旧一代直接丢弃。
/// 被再次访问的旧条目会提升回新一代，长期不活跃的客户端最多存活两代。
struct Generations<K> {
    capacity: usize,
    young: HashMap<K, Bucket>,
    old: HashMap<K, Bucket>,
}

impl<K: Eq + Hash> Generations<K> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            young: HashMap::with_capacity(capacity),
            old: HashMap::new(),
        }
    }

    fn take(&mut self, key: &K) -> Option<Bucket> {
        self.young.remove(key).or_else(|| self.old.remove(key))
    }

    fn put(&mut self, key: K, bucket: Bucket) {
        self.young.insert(key, bucket);
        if self.young.len() >= self.capacity {
            self.old.clear();
            mem::swap(&mut self.young, &mut self.old);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.young.len() + self.old.len()
    }
}

/// 按客户端 IP 的令牌桶限流
pub struct RateLimiter<K = IpAddr> {
    rate_per_sec: f64,
    burst: f64,
    buckets: Mutex<Generations<K>>,
}

impl<K: Eq + Hash> RateLimiter<K> {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            rate_per_sec: f64::from(config.requests_per_minute) / 60.0,
            burst: f64::from(config.burst.max(1)),
            // 两代合计不超过 max_clients
            buckets: Mutex::new(Generations::new((config.max_clients / 2).max(1))),
        }
    }

    pub fn allow(&self, key: K) -> bool {
        self.allow_at(key, Instant::now())
    }

    pub fn allow_at(&self, key: K, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let mut bucket = buckets.take(&key).unwrap_or(Bucket {
            tokens: self.burst,
            last: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last);
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * self.rate_per_sec).min(self.burst);
        bucket.last = now;

        let allowed = bucket.tokens >= 1.0;
        if allowed {
            bucket.tokens -= 1.0;
        }
        buckets.put(key, bucket);
        allowed
    }

    /// 当前跟踪的客户端数
    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// 令牌耗尽后恢复一个令牌所需的时间，用于 Retry-After
    pub fn retry_after(&self) -> Duration {
        if self.rate_per_sec <= 0.0 {
            return Duration::from_secs(60);
        }
        Duration::from_secs_f64(1.0 / self.rate_per_sec)
    }
}
