use crate::domain::AuthSession;
use crate::infrastructure::security::{InputSanitizer, RateLimiter};
use brat_errors::AppError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const CODE_TTL: Duration = Duration::from_secs(600);
pub const MAX_ATTEMPTS: u32 = 5;
const SENDS_PER_MINUTE: u32 = 3;
const SENDS_PER_HOUR: u32 = 10;
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Namespace for user ids derived from email addresses. Changing it changes
/// every user's id.
const USER_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b2f_5c1e_93a4_4d7b_8e0f_2a61_c4d9_b370);

/// Stable id for a normalized address, the same on every run.
pub fn user_id_for(email: &str) -> String {
    Uuid::new_v5(&USER_ID_NAMESPACE, email.as_bytes()).to_string()
}

struct PendingCode {
    code: String,
    expires_at: DateTime<Utc>,
    attempts: u32,
}

/// Where generated codes go.
#[derive(Clone)]
pub enum CodeDelivery {
    /// Writes the code to the log. For local development only.
    Log,
    /// Keeps the latest code per address in memory.
    Outbox(Arc<DashMap<String, String>>),
}

impl CodeDelivery {
    pub fn outbox() -> Self {
        CodeDelivery::Outbox(Arc::new(DashMap::new()))
    }

    /// Latest code delivered to `email`, if this is an outbox.
    pub fn latest(&self, email: &str) -> Option<String> {
        match self {
            CodeDelivery::Log => None,
            CodeDelivery::Outbox(outbox) => outbox.get(email).map(|c| c.clone()),
        }
    }

    fn deliver(&self, email: &str, code: &str) {
        match self {
            CodeDelivery::Log => tracing::info!("Magic code for {}: {}", email, code),
            CodeDelivery::Outbox(outbox) => {
                outbox.insert(email.to_string(), code.to_string());
            }
        }
    }
}

/// Passwordless sign-in: a short numeric code is sent to an address and
/// exchanged for a stable user id.
pub struct MagicCodeAuth {
    pending: DashMap<String, PendingCode>,
    last_sweep: Mutex<Instant>,
    limiter: RateLimiter,
    delivery: CodeDelivery,
    ttl: Duration,
}

impl MagicCodeAuth {
    pub fn new(delivery: CodeDelivery) -> Self {
        Self::with_ttl(delivery, CODE_TTL)
    }

    pub fn with_ttl(delivery: CodeDelivery, ttl: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
            limiter: RateLimiter::new(SENDS_PER_MINUTE, SENDS_PER_HOUR),
            delivery,
            ttl,
        }
    }

    pub fn delivery(&self) -> &CodeDelivery {
        &self.delivery
    }

    pub fn send_code(&self, email: &str) -> Result<(), AppError> {
        let email = InputSanitizer::normalize_email(email)?;
        self.maybe_sweep();

        if let Err(e) = self.limiter.check(&email) {
            tracing::warn!("Code request for {} rate limited: {}", email, e);
            return Err(e.into());
        }

        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        self.pending.insert(
            email.clone(),
            PendingCode {
                code: code.clone(),
                expires_at: Utc::now() + ttl,
                attempts: 0,
            },
        );
        self.delivery.deliver(&email, &code);
        tracing::info!("Sent sign-in code to {}", email);
        Ok(())
    }

    pub fn verify_code(&self, email: &str, code: &str) -> Result<AuthSession, AppError> {
        let email = InputSanitizer::normalize_email(email)?;

        let mut pending = self
            .pending
            .get_mut(&email)
            .ok_or_else(|| AppError::AuthFailure("no code was requested for this email".to_string()))?;

        if Utc::now() >= pending.expires_at {
            drop(pending);
            self.pending.remove(&email);
            return Err(AppError::AuthFailure("code expired".to_string()));
        }

        if pending.code != code.trim() {
            pending.attempts += 1;
            let exhausted = pending.attempts >= MAX_ATTEMPTS;
            drop(pending);
            if exhausted {
                self.pending.remove(&email);
                tracing::warn!("Too many wrong codes for {}, code discarded", email);
            }
            return Err(AppError::AuthFailure("invalid code".to_string()));
        }

        drop(pending);
        self.pending.remove(&email);

        let user_id = user_id_for(&email);
        tracing::info!("Signed in {} as {}", email, user_id);
        Ok(AuthSession { user_id, email })
    }

    fn maybe_sweep(&self) {
        let mut last_sweep = self
            .last_sweep
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if last_sweep.elapsed() > Duration::from_secs(SWEEP_INTERVAL_SECS) {
            self.sweep_expired();
            *last_sweep = Instant::now();
        }
    }

    /// Drops codes that expired without being verified.
    fn sweep_expired(&self) {
        let now = Utc::now();
        let before = self.pending.len();
        self.pending.retain(|_, p| p.expires_at > now);
        let removed = before.saturating_sub(self.pending.len());
        if removed > 0 {
            tracing::debug!("Swept {} expired sign-in code(s)", removed);
        }
    }
}
