//! Kiosk Core - session state machine and lockdown coordination
//!
//! This crate models the client side of the GuoBank terminal kiosk: the
//! login → OTP → menu → detail flow, the OTP countdown, the contract with the
//! backend authority (requests out, pushes in), and the emergency lockdown
//! flag that survives page navigation within a browsing session.

pub mod bridge;
pub mod config;
pub mod error;
pub mod lockdown;
pub mod machine;
pub mod navigation;
pub mod store;
pub mod surface;
pub mod timer;
pub mod types;

pub use bridge::{spawn_dispatcher, BackendBridge, BackendEvent, BridgeRequest, PageEvent};
pub use config::{ExpiryPolicy, SessionPolicy, DEFAULT_OTP_SECONDS, OTP_CODE_LENGTH};
pub use error::{KioskError, Result};
pub use lockdown::{LockdownCoordinator, LockdownFlag, LOCKDOWN_KEY};
pub use machine::{OtpChallenge, PageContext, Session, SessionMachine, SessionState};
pub use navigation::{Navigation, Page};
pub use store::{MemoryStore, SessionStore, SharedStore};
pub use surface::{DisplaySurface, RecordingSurface, View};
pub use timer::{ManualScheduler, OtpCountdown, Scheduler, TickOutcome, TimerHandle, TokioScheduler};
pub use types::{BalanceReply, MenuAction, Role, BALANCE_ERROR_SENTINEL};
