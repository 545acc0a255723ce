//! Backend bridge contract
//!
//! Requests go out through [`BackendBridge`]; most outcomes come back later as
//! unsolicited [`BackendEvent`] pushes rather than as return values. The page
//! never awaits a request itself: it queues a [`BridgeRequest`] and the
//! dispatcher task runs it, feeding anything the call returns back to the page
//! as a [`PageEvent`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::error::Result;
use crate::types::{BalanceReply, Role};

/// Request/response interface to the backend authority
#[async_trait]
pub trait BackendBridge: Send + Sync {
    /// Start a login. The outcome arrives as a push.
    async fn login(&self, identity: &str, credential: &str) -> Result<()>;

    /// Submit an OTP code. The outcome arrives as a push.
    async fn verify_otp(&self, identity: &str, code: &str) -> Result<()>;

    /// Read the balance directly
    async fn get_balance(&self, identity: &str) -> Result<BalanceReply>;

    /// Staff-only, fire and forget
    async fn set_maintenance_mode(&self, enabled: bool) -> Result<()>;
}

/// Push notification from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendEvent {
    /// Replace the displayed status text
    StatusMessage { text: String },

    /// OTP was rejected
    OtpFailed { text: String },

    /// Credentials accepted, OTP scheduled
    RedirectToOtp {
        identity: String,
        status: Role,
        #[serde(default)]
        countdown_seconds: Option<u32>,
    },

    /// OTP accepted
    RedirectToMainMenu { identity: String, status: Role },

    /// Balance available
    BalanceReady { identity: String, amount: f64 },

    /// Force every page into lockdown
    EmergencyLockdown,
}

impl BackendEvent {
    /// Decode a push delivered as a JSON object
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Request queued by a page for the dispatcher
#[derive(Clone)]
pub enum BridgeRequest {
    Login {
        identity: String,
        credential: Zeroizing<String>,
    },
    VerifyOtp {
        identity: String,
        code: String,
    },
    GetBalance {
        identity: String,
    },
    SetMaintenanceMode {
        enabled: bool,
    },
}

impl BridgeRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            BridgeRequest::Login { .. } => "login",
            BridgeRequest::VerifyOtp { .. } => "verify_otp",
            BridgeRequest::GetBalance { .. } => "get_balance",
            BridgeRequest::SetMaintenanceMode { .. } => "set_maintenance_mode",
        }
    }
}

impl fmt::Debug for BridgeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeRequest::Login { identity, .. } => f
                .debug_struct("Login")
                .field("identity", identity)
                .field("credential", &"<redacted>")
                .finish(),
            BridgeRequest::VerifyOtp { identity, .. } => f
                .debug_struct("VerifyOtp")
                .field("identity", identity)
                .field("code", &"<redacted>")
                .finish(),
            BridgeRequest::GetBalance { identity } => f
                .debug_struct("GetBalance")
                .field("identity", identity)
                .finish(),
            BridgeRequest::SetMaintenanceMode { enabled } => f
                .debug_struct("SetMaintenanceMode")
                .field("enabled", enabled)
                .finish(),
        }
    }
}

/// Everything a page reacts to, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Push from the backend
    Backend(BackendEvent),

    /// Countdown tick for the page that scheduled it
    Tick { page_id: u64 },

    /// `get_balance` resolved, with the sentinel on failure
    BalanceResolved { identity: String, reply: BalanceReply },

    /// A fire-and-forget request could not be delivered
    RequestFailed {
        operation: &'static str,
        message: String,
    },
}

/// Run one request against the bridge
pub async fn dispatch(bridge: &dyn BackendBridge, request: BridgeRequest) -> Option<PageEvent> {
    let operation = request.operation();
    debug!("Dispatching {:?}", request);

    let outcome = match request {
        BridgeRequest::Login {
            identity,
            credential,
        } => bridge.login(&identity, credential.as_str()).await,
        BridgeRequest::VerifyOtp { identity, code } => bridge.verify_otp(&identity, &code).await,
        BridgeRequest::GetBalance { identity } => {
            let reply = match bridge.get_balance(&identity).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Balance fetch failed for {}: {}", identity, e);
                    BalanceReply::Error
                }
            };
            return Some(PageEvent::BalanceResolved { identity, reply });
        }
        BridgeRequest::SetMaintenanceMode { enabled } => {
            bridge.set_maintenance_mode(enabled).await
        }
    };

    match outcome {
        Ok(()) => None,
        Err(e) => {
            warn!("{} request failed: {}", operation, e);
            Some(PageEvent::RequestFailed {
                operation,
                message: e.to_string(),
            })
        }
    }
}

/// Spawn the task that executes queued requests.
///
/// Each request runs in its own task so a slow call never delays later ones.
/// The dispatcher exits when every request sender has been dropped.
pub fn spawn_dispatcher(
    bridge: Arc<dyn BackendBridge>,
    mut requests: mpsc::UnboundedReceiver<BridgeRequest>,
    events: mpsc::UnboundedSender<PageEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let bridge = Arc::clone(&bridge);
            let events = events.clone();
            tokio::spawn(async move {
                if let Some(event) = dispatch(bridge.as_ref(), request).await {
                    if events.send(event).is_err() {
                        debug!("Page event channel closed, dropping result");
                    }
                }
            });
        }
        debug!("Request channel closed, dispatcher exiting");
    })
}
