//! Per-client token bucket rate limiter.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How often idle clients are swept.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Clients not seen for this long are forgotten.
pub const IDLE_TTL: Duration = Duration::from_secs(180);
/// Upper bound on tracked clients.
pub const MAX_CLIENTS: usize = 100_000;

/// Limiter settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitSettings {
    pub enabled: bool,
    /// Tokens added per second.
    pub rps: f64,
    /// Bucket capacity.
    pub burst: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rps: 2.0,
            burst: 4,
        }
    }
}

#[derive(Debug, Clone)]
struct Client {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

/// Token bucket per client IP.
///
/// A bucket starts full at `burst` tokens, refills at `rps` tokens per second
/// and each allowed request takes one token. The table lock is held only for
/// a single decision or a sweep.
///
/// At most `max_clients` buckets are kept. When the table is full, idle
/// clients are swept first; if none are idle, unknown clients are rejected.
pub struct RateLimiter {
    clients: Mutex<HashMap<IpAddr, Client>>,
    settings: RateLimitSettings,
    max_clients: usize,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            settings,
            max_clients: MAX_CLIENTS,
        }
    }

    #[must_use]
    pub fn with_max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients;
        self
    }

    pub fn settings(&self) -> RateLimitSettings {
        self.settings
    }

    /// Takes a token for `ip`. Returns false if the client is over its limit.
    ///
    /// Always true when the limiter is disabled.
    pub fn allow(&self, ip: IpAddr) -> bool {
        if !self.settings.enabled {
            return true;
        }
        self.allow_at(ip, Instant::now())
    }

    fn allow_at(&self, ip: IpAddr, now: Instant) -> bool {
        let capacity = f64::from(self.settings.burst);
        let mut clients = self.lock();

        if !clients.contains_key(&ip) && clients.len() >= self.max_clients {
            clients.retain(|_, c| now.saturating_duration_since(c.last_seen) <= IDLE_TTL);
            if clients.len() >= self.max_clients {
                warn!(%ip, tracked = clients.len(), "rate limiter table full, rejecting new client");
                return false;
            }
        }

        let client = clients.entry(ip).or_insert_with(|| Client {
            tokens: capacity,
            last_refill: now,
            last_seen: now,
        });

        let elapsed = now.saturating_duration_since(client.last_refill);
        client.tokens = (client.tokens + elapsed.as_secs_f64() * self.settings.rps).min(capacity);
        client.last_refill = now;
        client.last_seen = now;

        if client.tokens >= 1.0 {
            client.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Removes clients idle for longer than [`IDLE_TTL`] and returns how many.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut clients = self.lock();
        let before = clients.len();
        clients.retain(|_, c| now.saturating_duration_since(c.last_seen) <= IDLE_TTL);
        before - clients.len()
    }

    pub fn client_count(&self) -> usize {
        self.lock().len()
    }

    /// Spawns the periodic sweep. The task runs until aborted.
    pub fn start_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter = Arc::clone(self);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await;

            loop {
                interval.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(removed, "evicted idle rate limiter clients");
                }
            }
        })
    }

    // The table holds plain counters, so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, Client>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
