//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Outbound chat rate limit
pub const CHAT_RATE_LIMIT: u32 = 2; // Max 2 chat messages per second

/// Limiter for chat messages leaving this client
#[derive(Clone)]
pub struct ChatRateLimiter {
    limiter: Arc<Limiter>,
}

impl ChatRateLimiter {
    pub fn new() -> Self {
        Self {
            limiter: create_limiter(CHAT_RATE_LIMIT),
        }
    }

    /// Check if a chat message is allowed (returns true if allowed)
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for ChatRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
