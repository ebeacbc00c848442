//! OTP session authentication.
//!
//! Login is a two-step challenge: a random 6-digit code is relayed to the
//! admin phone through a notification webhook, and a matching reply opens
//! a 2-hour session persisted in local storage. The expected code lives
//! only in memory, so restarting the process mid-challenge means
//! requesting a fresh one.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::info;

use crate::clock::Clock;
use crate::error::{AcaraError, AcaraResult};
use crate::storage::{self, Storage, keys};

/// How long a session stays valid.
pub const SESSION_DURATION_MS: i64 = 2 * 60 * 60 * 1000;

const EXPIRY_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Persisted session record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionRecord {
    pub login_time: i64,
    pub expiry_time: i64,
}

/// Outcome of an auth operation, rendered inline by the caller.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

impl AuthOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Default)]
struct AuthState {
    authenticated: bool,
    session_expiry: Option<i64>,
    otp_sent: bool,
    generated_otp: Option<String>,
    error: Option<String>,
}

pub struct AuthService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    http: reqwest::Client,
    otp_webhook_url: Option<String>,
    admin_phone: String,
    state: Mutex<AuthState>,
}

impl AuthService {
    /// Build the service; the initial state is derived from any persisted
    /// session (the startup expiry check).
    pub fn new(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        otp_webhook_url: Option<String>,
        admin_phone: impl Into<String>,
    ) -> Arc<Self> {
        let service = Arc::new(Self {
            storage,
            clock,
            http: reqwest::Client::new(),
            otp_webhook_url,
            admin_phone: admin_phone.into(),
            state: Mutex::new(AuthState::default()),
        });
        service.check_session();
        service
    }

    fn state(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- Derived accessors ---

    pub fn is_authenticated(&self) -> bool {
        self.state().authenticated
    }

    pub fn otp_sent(&self) -> bool {
        self.state().otp_sent
    }

    /// Epoch millis the session expires at, if one is open.
    pub fn session_expiry(&self) -> Option<i64> {
        self.state().session_expiry
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Minutes left on the session: ceiling, clamped at 0.
    pub fn session_minutes_remaining(&self) -> u32 {
        let Some(expiry) = self.state().session_expiry else {
            return 0;
        };
        let remaining = expiry - self.clock.now_millis();
        if remaining <= 0 {
            0
        } else {
            remaining.div_ceil(60_000) as u32
        }
    }

    // --- State machine transitions ---

    /// Re-derive authentication from the persisted session. An expired
    /// session is cleared exactly like a logout. Returns whether a valid
    /// session remains.
    pub fn check_session(&self) -> bool {
        let session: Option<SessionRecord> =
            storage::read_json(self.storage.as_ref(), keys::AUTH_SESSION);
        let expiry: Option<i64> = storage::read_json(self.storage.as_ref(), keys::AUTH_EXPIRY);

        match (session, expiry) {
            (Some(_), Some(expiry_time)) if self.clock.now_millis() < expiry_time => {
                let mut state = self.state();
                state.authenticated = true;
                state.session_expiry = Some(expiry_time);
                true
            }
            (Some(_), Some(_)) => {
                self.logout();
                false
            }
            _ => false,
        }
    }

    /// Generate a challenge code and dispatch it to the admin phone.
    ///
    /// Without a configured webhook the code is only logged, and the
    /// challenge still counts as sent. A delivery failure drops the code:
    /// the machine stays anonymous and a new request is needed.
    pub async fn request_otp(&self) -> AuthOutcome {
        self.state().error = None;

        let otp = generate_otp();

        match self.deliver(&otp).await {
            Ok(()) => {
                let mut state = self.state();
                state.generated_otp = Some(otp);
                state.otp_sent = true;
                AuthOutcome::ok("OTP sent to the admin number")
            }
            Err(err) => {
                let message = err.to_string();
                let mut state = self.state();
                state.generated_otp = None;
                state.otp_sent = false;
                state.error = Some(message.clone());
                AuthOutcome::fail(message)
            }
        }
    }

    async fn deliver(&self, otp: &str) -> AcaraResult<()> {
        let Some(url) = self.otp_webhook_url.as_deref() else {
            // Development fallback: no webhook, code goes to the log
            info!(otp, "no OTP webhook configured, logging the code instead");
            return Ok(());
        };

        let timestamp = Utc
            .timestamp_millis_opt(self.clock.now_millis())
            .single()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let payload = json!({
            "phone": self.admin_phone,
            "otp": otp,
            "message": otp_message(otp),
            "timestamp": timestamp,
        });

        let resp = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AcaraError::Delivery(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AcaraError::Delivery(format!(
                "status {}",
                resp.status().as_u16()
            )));
        }

        Ok(())
    }

    /// Check a response code; an exact match opens a persisted session and
    /// consumes the challenge. A mismatch leaves the challenge in place so
    /// the caller may retry.
    pub fn verify_otp(&self, code: &str) -> AuthOutcome {
        match self.try_verify(code) {
            Ok(()) => AuthOutcome::ok("Login successful"),
            Err(err) => {
                let message = err.to_string();
                self.state().error = Some(message.clone());
                AuthOutcome::fail(message)
            }
        }
    }

    fn try_verify(&self, code: &str) -> AcaraResult<()> {
        {
            let state = self.state();
            let Some(expected) = state.generated_otp.as_deref() else {
                return Err(AcaraError::InvalidOtp(
                    "no code was requested, request an OTP first".into(),
                ));
            };
            if code != expected {
                return Err(AcaraError::InvalidOtp("the code does not match".into()));
            }
        }

        let now = self.clock.now_millis();
        let expiry_time = now + SESSION_DURATION_MS;
        let record = SessionRecord {
            login_time: now,
            expiry_time,
        };

        storage::write_json(self.storage.as_ref(), keys::AUTH_SESSION, &record);
        storage::write_json(self.storage.as_ref(), keys::AUTH_EXPIRY, &expiry_time);

        let mut state = self.state();
        state.authenticated = true;
        state.session_expiry = Some(expiry_time);
        state.otp_sent = false;
        state.generated_otp = None;
        state.error = None;

        Ok(())
    }

    /// Drop the session and all challenge state.
    pub fn logout(&self) {
        self.storage.remove(keys::AUTH_SESSION);
        self.storage.remove(keys::AUTH_EXPIRY);
        let mut state = self.state();
        *state = AuthState::default();
    }

    /// Discard the pending challenge so a new code can be requested. The
    /// persisted session, if any, is untouched.
    pub fn reset_otp(&self) {
        let mut state = self.state();
        state.otp_sent = false;
        state.generated_otp = None;
        state.error = None;
    }

    /// Periodic expiry check, every 60 seconds while a session is open.
    /// The task ends once the session is gone.
    pub fn spawn_expiry_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(EXPIRY_CHECK_INTERVAL);
            interval.tick().await; // the first tick fires immediately
            loop {
                interval.tick().await;
                if !service.check_session() {
                    break;
                }
            }
        })
    }
}

/// Uniformly random 6-digit code.
fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// The templated WhatsApp message the notification workflow relays.
fn otp_message(otp: &str) -> String {
    format!(
        "🔐 *Kode OTP Event Manager*\n\nKode OTP Anda: *{otp}*\n\nKode ini berlaku selama 5 menit.\n\n_Jangan bagikan kode ini kepada siapapun._"
    )
}
