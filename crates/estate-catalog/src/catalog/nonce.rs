use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use sha2::{Digest as _, Sha256};

/// Action name the filter form tokens are bound to.
pub const FILTER_NONCE_ACTION: &str = "real_estate_filter_nonce";

const TOKEN_HEX_LEN: usize = 20;

/// Issues and verifies time-bucketed CSRF tokens for form actions.
///
/// Time is split into ticks of half the lifetime. A token is accepted during the tick it
/// was issued in and the following one, so it lives between half and one full lifetime.
#[derive(Clone)]
pub struct NonceGuard {
    secret: String,
    lifetime_secs: i64,
}

impl std::fmt::Debug for NonceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceGuard")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl NonceGuard {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            lifetime_secs: lifetime_secs.max(2),
        }
    }

    fn tick(&self, now: DateTime<Utc>) -> i64 {
        let half = self.lifetime_secs / 2;
        let seconds = now.timestamp();
        seconds.div_euclid(half) + i64::from(seconds.rem_euclid(half) != 0)
    }

    fn token_for_tick(&self, action: &str, tick: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"|");
        hasher.update(action.as_bytes());
        hasher.update(b"|");
        hasher.update(tick.to_string().as_bytes());

        let digest = hasher.finalize();
        let mut out = String::with_capacity(64);
        for b in digest {
            let _ = write!(&mut out, "{:02x}", b);
        }
        out.truncate(TOKEN_HEX_LEN);
        out
    }

    pub fn issue(&self, action: &str, now: DateTime<Utc>) -> String {
        self.token_for_tick(action, self.tick(now))
    }

    pub fn verify(&self, token: &str, action: &str, now: DateTime<Utc>) -> bool {
        let token = token.trim();
        if token.len() != TOKEN_HEX_LEN {
            return false;
        }

        let tick = self.tick(now);
        [tick, tick - 1]
            .into_iter()
            .any(|candidate| constant_time_eq(&self.token_for_tick(action, candidate), token))
    }
}

pub(crate) fn constant_time_eq(left: &str, right: &str) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.bytes()
        .zip(right.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
