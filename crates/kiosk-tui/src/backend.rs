//! Simulated bank authority
//!
//! Stands in for the remote backend on a standalone terminal. It answers the
//! bridge requests the same way the real authority does: login and OTP
//! outcomes come back as pushes, the balance comes back as a return value,
//! and maintenance toggles are confirmed with a status push. The operator can
//! also raise an intrusion alert, which locks the terminal unless maintenance
//! mode is on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use kiosk_core::{BackendBridge, BackendEvent, BalanceReply, KioskError, PageEvent, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::{AccountBook, OtpCheck, OtpDelivery, OtpLedger};

pub const MSG_AUTHENTICATING: &str = "Authenticating...";
pub const MSG_INVALID_CREDENTIALS: &str = "❌ Invalid credentials";
pub const MSG_OTP_EXPIRED: &str = "⏰ OTP expired";
pub const MSG_WRONG_OTP: &str = "❌ Wrong OTP";
pub const MSG_SESSION_EXPIRED: &str = "❌ Session expired, please login again.";
pub const MSG_MAINTENANCE_ON: &str = "Maintenance ON";
pub const MSG_MAINTENANCE_OFF: &str = "Maintenance OFF";

/// In-process backend authority
pub struct SimulatedBackend {
    accounts: AccountBook,
    otps: Mutex<OtpLedger>,
    deliveries: Mutex<Vec<OtpDelivery>>,
    maintenance: AtomicBool,
    ledger_online: AtomicBool,
    pushes: mpsc::UnboundedSender<PageEvent>,
    latency: Duration,
}

impl SimulatedBackend {
    pub fn new(
        accounts: AccountBook,
        pushes: mpsc::UnboundedSender<PageEvent>,
        latency: Duration,
    ) -> Self {
        Self {
            accounts,
            otps: Mutex::new(OtpLedger::default()),
            deliveries: Mutex::new(Vec::new()),
            maintenance: AtomicBool::new(false),
            ledger_online: AtomicBool::new(true),
            pushes,
            latency,
        }
    }

    pub fn is_maintenance_mode(&self) -> bool {
        self.maintenance.load(Ordering::SeqCst)
    }

    pub fn is_ledger_online(&self) -> bool {
        self.ledger_online.load(Ordering::SeqCst)
    }

    /// Simulate the ledger going down or coming back. Returns the new state.
    pub fn toggle_ledger(&self) -> bool {
        let online = !self.ledger_online.fetch_xor(true, Ordering::SeqCst);
        warn!("Ledger {}", if online { "online" } else { "offline" });
        online
    }

    /// Most recent code sent out of band
    pub fn latest_delivery(&self) -> Option<OtpDelivery> {
        self.deliveries.lock().ok()?.last().cloned()
    }

    /// Door sensor tripped. Locks every terminal page unless staff are servicing it.
    pub fn raise_intrusion_alert(&self) -> bool {
        if self.is_maintenance_mode() {
            info!("Intrusion alert ignored during maintenance");
            return false;
        }
        warn!("Intrusion detected, triggering emergency lockdown");
        self.push(BackendEvent::EmergencyLockdown);
        true
    }

    fn push(&self, event: BackendEvent) {
        if self.pushes.send(PageEvent::Backend(event)).is_err() {
            debug!("Push channel closed, page gone");
        }
    }

    fn status(&self, text: &str) {
        self.push(BackendEvent::StatusMessage {
            text: text.to_string(),
        });
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn otps(&self) -> Result<std::sync::MutexGuard<'_, OtpLedger>> {
        self.otps
            .lock()
            .map_err(|_| KioskError::Transport("OTP ledger unavailable".to_string()))
    }
}

#[async_trait]
impl BackendBridge for SimulatedBackend {
    async fn login(&self, identity: &str, credential: &str) -> Result<()> {
        info!("Login attempt for {}", identity);
        self.status(MSG_AUTHENTICATING);
        self.delay().await;

        let Some(account) = self.accounts.verify(identity, credential) else {
            warn!("Invalid credentials for {}", identity);
            self.status(MSG_INVALID_CREDENTIALS);
            return Ok(());
        };

        let (delivery, window) = {
            let mut otps = self.otps()?;
            (otps.issue(identity, account.role), otps.validity())
        };
        info!("Generated OTP for {}: {}", identity, delivery.code);
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push(delivery);
        }

        self.push(BackendEvent::RedirectToOtp {
            identity: identity.to_string(),
            status: account.role,
            countdown_seconds: Some(window.as_secs() as u32),
        });
        Ok(())
    }

    async fn verify_otp(&self, identity: &str, code: &str) -> Result<()> {
        let outcome = self.otps()?.check(identity, code);
        match outcome {
            OtpCheck::Accepted(role) => {
                info!("OTP verified for {}", identity);
                self.push(BackendEvent::RedirectToMainMenu {
                    identity: identity.to_string(),
                    status: role,
                });
            }
            OtpCheck::Wrong => self.push(BackendEvent::OtpFailed {
                text: MSG_WRONG_OTP.to_string(),
            }),
            OtpCheck::Expired => self.push(BackendEvent::OtpFailed {
                text: MSG_OTP_EXPIRED.to_string(),
            }),
            OtpCheck::Missing => self.push(BackendEvent::OtpFailed {
                text: MSG_SESSION_EXPIRED.to_string(),
            }),
        }
        Ok(())
    }

    async fn get_balance(&self, identity: &str) -> Result<BalanceReply> {
        self.delay().await;
        if !self.is_ledger_online() {
            return Err(KioskError::Transport("ledger unavailable".to_string()));
        }
        let account = self
            .accounts
            .get(identity)
            .ok_or_else(|| KioskError::Transport(format!("no ledger entry for {}", identity)))?;

        let amount = account.balance.unwrap_or(0.0);
        info!("Fetched balance for {}: RM {}", identity, amount);
        Ok(BalanceReply::Amount(amount))
    }

    async fn set_maintenance_mode(&self, enabled: bool) -> Result<()> {
        self.maintenance.store(enabled, Ordering::SeqCst);
        info!("Maintenance mode {}", enabled);
        self.status(if enabled {
            MSG_MAINTENANCE_ON
        } else {
            MSG_MAINTENANCE_OFF
        });
        Ok(())
    }
}
