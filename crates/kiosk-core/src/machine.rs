//! Session state machine
//!
//! One [`SessionMachine`] exists per loaded page. It is built from the
//! navigation target that loaded the page, reacts to user actions and backend
//! pushes, and leaves the page by asking the surface to navigate. Nothing but
//! the lockdown flag survives navigation: the next page builds a fresh machine
//! from the parameters it was given.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::bridge::{BackendEvent, BridgeRequest, PageEvent};
use crate::config::{ExpiryPolicy, SessionPolicy};
use crate::error::{KioskError, Result};
use crate::lockdown::LockdownCoordinator;
use crate::navigation::{Navigation, Page};
use crate::store::SharedStore;
use crate::surface::{DisplaySurface, View};
use crate::timer::{OtpCountdown, Scheduler, TickOutcome, TimerHandle};
use crate::types::{BalanceReply, MenuAction, Role};

pub const MSG_AUTHENTICATING: &str = "Authenticating...";
pub const MSG_MISSING_CREDENTIALS: &str = "Please enter both username and password";
pub const MSG_VERIFYING: &str = "Verifying OTP...";
pub const MSG_OTP_EXPIRED: &str = "OTP expired";
pub const MSG_FETCHING_BALANCE: &str = "Fetching balance...";

/// Client-visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    OtpPending,
    Authenticated,
    Detail,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::OtpPending => "awaiting OTP",
            SessionState::Authenticated => "authenticated",
            SessionState::Detail => "viewing details",
        }
    }

    /// State a freshly loaded page starts in
    pub fn for_page(page: Page) -> Self {
        match page {
            Page::Login | Page::Lockdown => SessionState::Unauthenticated,
            Page::Otp => SessionState::OtpPending,
            Page::Menu => SessionState::Authenticated,
            Page::Balance => SessionState::Detail,
        }
    }
}

/// Authentication context of the current page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Empty until the backend has redirected with an identity
    pub identity: String,
    pub role: Role,
    pub state: SessionState,
}

/// The in-progress OTP verification attempt
#[derive(Debug)]
pub struct OtpChallenge {
    countdown: OtpCountdown,
    timer: TimerHandle,
}

impl OtpChallenge {
    pub fn countdown(&self) -> &OtpCountdown {
        &self.countdown
    }

    pub fn is_expired(&self) -> bool {
        self.countdown.is_expired()
    }
}

/// Everything a page needs from the browsing session at bootstrap
#[derive(Clone)]
pub struct PageContext {
    pub store: SharedStore,
    pub scheduler: Arc<dyn Scheduler>,
    pub requests: mpsc::UnboundedSender<BridgeRequest>,
    pub events: mpsc::UnboundedSender<PageEvent>,
    pub policy: SessionPolicy,
    page_ids: Arc<AtomicU64>,
}

impl PageContext {
    pub fn new(
        store: SharedStore,
        scheduler: Arc<dyn Scheduler>,
        requests: mpsc::UnboundedSender<BridgeRequest>,
        events: mpsc::UnboundedSender<PageEvent>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            scheduler,
            requests,
            events,
            policy,
            page_ids: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_page_id(&self) -> u64 {
        self.page_ids.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// State machine for one loaded page
pub struct SessionMachine<D: DisplaySurface> {
    ctx: PageContext,
    lockdown: LockdownCoordinator,
    page: Page,
    page_id: u64,
    session: Session,
    challenge: Option<OtpChallenge>,
    balance: Option<BalanceReply>,
    balance_pending: bool,
    locked: bool,
    status: Option<String>,
    departed: Option<Navigation>,
    surface: D,
}

impl<D: DisplaySurface> SessionMachine<D> {
    /// Bootstrap a page. The lockdown flag is checked before anything else.
    pub fn load(target: Navigation, ctx: PageContext, surface: D) -> Result<Self> {
        let lockdown = LockdownCoordinator::new(ctx.store.clone());
        let page_id = ctx.next_page_id();
        let mut machine = Self {
            lockdown,
            page: target.page,
            page_id,
            session: Session {
                state: SessionState::for_page(target.page),
                ..Session::default()
            },
            challenge: None,
            balance: None,
            balance_pending: false,
            locked: false,
            status: None,
            departed: None,
            surface,
            ctx,
        };

        if target.page == Page::Lockdown {
            machine.locked = true;
            machine.surface.render_view(View::Lockdown);
            return Ok(machine);
        }

        machine.locked = machine.lockdown.on_page_load(&mut machine.surface)?;
        if machine.locked && !machine.surface.has_lockdown_overlay() {
            // on_page_load already redirected to the lockdown page
            machine.departed = Some(Navigation::lockdown());
            return Ok(machine);
        }

        info!("Loading page {}", target);
        match target.page {
            Page::Login => {
                machine.surface.render_view(View::Login);
            }
            Page::Otp => {
                machine.session.identity = target.identity().to_string();
                machine.session.role = target.role();
                machine.surface.render_view(View::Otp {
                    identity: machine.session.identity.clone(),
                });
                let seed = target
                    .countdown()
                    .unwrap_or(machine.ctx.policy.default_otp_seconds);
                machine.start_challenge(seed);
            }
            Page::Menu => {
                machine.session.identity = target.identity().to_string();
                machine.session.role = target.role();
                machine.render_menu();
            }
            Page::Balance => {
                machine.session.identity = target.identity().to_string();
                machine.session.role = target.role();
                let reply = target.balance_reply();
                machine.balance = Some(reply);
                machine.surface.render_view(View::Balance {
                    identity: machine.session.identity.clone(),
                    text: reply.display_text(),
                    is_error: reply.is_error(),
                });
            }
            Page::Lockdown => {}
        }

        Ok(machine)
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn page_id(&self) -> u64 {
        self.page_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn challenge(&self) -> Option<&OtpChallenge> {
        self.challenge.as_ref()
    }

    pub fn balance(&self) -> Option<BalanceReply> {
        self.balance
    }

    pub fn is_balance_pending(&self) -> bool {
        self.balance_pending
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Target this page navigated to, if it has left
    pub fn departed(&self) -> Option<&Navigation> {
        self.departed.as_ref()
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    /// Submit credentials. Transition to OTP only happens on the redirect push.
    pub fn submit_login(&mut self, identity: &str, credential: &str) -> Result<()> {
        self.ensure_interactive()?;
        self.ensure_state("log in", SessionState::Unauthenticated)?;

        // Blank check only; the credential is forwarded exactly as typed
        let identity = identity.trim();
        if identity.is_empty() || credential.trim().is_empty() {
            warn!("Login rejected locally: missing field");
            self.set_status(MSG_MISSING_CREDENTIALS);
            return Err(KioskError::Validation(MSG_MISSING_CREDENTIALS.to_string()));
        }

        self.send(BridgeRequest::Login {
            identity: identity.to_string(),
            credential: Zeroizing::new(credential.to_string()),
        })?;
        self.set_status(MSG_AUTHENTICATING);
        Ok(())
    }

    /// Submit an OTP code. The countdown keeps running either way.
    pub fn submit_otp(&mut self, code: &str) -> Result<()> {
        self.ensure_interactive()?;
        self.ensure_state("verify OTP", SessionState::OtpPending)?;

        // Surrounding whitespace from the keypad is ignored
        let code = code.trim();
        let expected = self.ctx.policy.otp_code_length;
        if code.chars().count() != expected {
            let message = format!("OTP must be exactly {} characters", expected);
            warn!("OTP rejected locally: length {}", code.chars().count());
            self.set_status(&message);
            return Err(KioskError::Validation(message));
        }

        let expired = self.challenge.as_ref().is_some_and(OtpChallenge::is_expired);
        if expired && self.ctx.policy.expiry_policy == ExpiryPolicy::Block {
            self.set_status(MSG_OTP_EXPIRED);
            return Err(KioskError::ChallengeExpired);
        }
        if expired {
            debug!("Forwarding OTP submitted after client-side expiry");
        }

        self.send(BridgeRequest::VerifyOtp {
            identity: self.session.identity.clone(),
            code: code.to_string(),
        })?;
        self.set_status(MSG_VERIFYING);
        Ok(())
    }

    /// Replace the status text. Last write wins.
    pub fn on_status_push(&mut self, message: &str) {
        self.set_status(message);
    }

    /// Backend rejected the OTP. The challenge stays active.
    pub fn on_otp_failure_push(&mut self, message: &str) {
        info!(
            "{}",
            KioskError::AuthenticationRejected(message.to_string())
        );
        self.set_status(message);
    }

    /// Backend accepted the OTP. The only way OTP verification ends successfully.
    pub fn on_otp_success_push(&mut self, identity: &str, role: Role) {
        info!("OTP verified for {} ({})", identity, role);
        self.navigate(Navigation::menu(identity, role));
    }

    /// Backend accepted credentials and scheduled an OTP
    pub fn on_login_success_push(&mut self, identity: &str, role: Role, otp_seed: Option<u32>) {
        let seed = otp_seed.unwrap_or(self.ctx.policy.default_otp_seconds);
        info!("Credentials accepted for {}, OTP window {}s", identity, seed);
        self.navigate(Navigation::otp(identity, role, seed));
    }

    /// Balance pushed by the backend. Only an authenticated customer session
    /// for the same identity may move to Detail.
    pub fn on_balance_ready_push(&mut self, identity: &str, amount: f64) {
        let state = self.state();
        let accepts = matches!(
            state,
            SessionState::Authenticated | SessionState::Detail
        ) && self.session.identity == identity
            && self.session.role == Role::Customer;
        if !accepts {
            debug!(
                "Dropping balance push for {} while {}",
                identity,
                state.as_str()
            );
            return;
        }
        let role = self.session.role;
        self.balance_pending = false;
        self.navigate(Navigation::balance(
            identity,
            role,
            BalanceReply::Amount(amount),
        ));
    }

    /// Single entry point for backend pushes
    pub fn handle_backend_event(&mut self, event: BackendEvent) -> Result<()> {
        match event {
            BackendEvent::StatusMessage { text } => self.on_status_push(&text),
            BackendEvent::OtpFailed { text } => self.on_otp_failure_push(&text),
            BackendEvent::RedirectToOtp {
                identity,
                status,
                countdown_seconds,
            } => self.on_login_success_push(&identity, status, countdown_seconds),
            BackendEvent::RedirectToMainMenu { identity, status } => {
                self.on_otp_success_push(&identity, status)
            }
            BackendEvent::BalanceReady { identity, amount } => {
                self.on_balance_ready_push(&identity, amount)
            }
            BackendEvent::EmergencyLockdown => self.trigger_emergency_mode()?,
        }
        Ok(())
    }

    /// Apply any page event: pushes, timer ticks and resolved requests
    pub fn handle_event(&mut self, event: PageEvent) -> Result<()> {
        match event {
            PageEvent::Backend(event) => self.handle_backend_event(event)?,
            PageEvent::Tick { page_id } => {
                if page_id == self.page_id {
                    self.tick();
                } else {
                    debug!("Dropping tick for page {}", page_id);
                }
            }
            PageEvent::BalanceResolved { identity, reply } => {
                if self.balance_pending {
                    self.balance_pending = false;
                    let role = self.session.role;
                    self.navigate(Navigation::balance(&identity, role, reply));
                } else {
                    debug!("Balance for {} arrived after page change", identity);
                }
            }
            PageEvent::RequestFailed { operation, message } => {
                warn!("{} failed: {}", operation, message);
                self.set_status(&format!("Service unavailable: {}", message));
            }
        }
        Ok(())
    }

    /// Backend emergency push
    pub fn trigger_emergency_mode(&mut self) -> Result<()> {
        let overlay = self.surface.has_lockdown_overlay();
        self.lockdown.trigger(&mut self.surface)?;
        if overlay {
            self.locked = true;
        } else {
            self.mark_departed(Navigation::lockdown());
        }
        Ok(())
    }

    /// Request the balance; the page moves to Detail once it resolves
    pub fn fetch_balance(&mut self) -> Result<()> {
        self.ensure_interactive()?;
        self.ensure_state("fetch balance", SessionState::Authenticated)?;
        self.ensure_offered(MenuAction::CheckBalance)?;

        self.send(BridgeRequest::GetBalance {
            identity: self.session.identity.clone(),
        })?;
        self.balance_pending = true;
        self.set_status(MSG_FETCHING_BALANCE);
        Ok(())
    }

    /// Staff maintenance toggle; confirmation arrives as a status push
    pub fn set_maintenance_mode(&mut self, enabled: bool) -> Result<()> {
        self.ensure_interactive()?;
        self.ensure_state("toggle maintenance", SessionState::Authenticated)?;
        let action = if enabled {
            MenuAction::MaintenanceOn
        } else {
            MenuAction::MaintenanceOff
        };
        self.ensure_offered(action)?;

        info!("Requesting maintenance mode {}", enabled);
        self.send(BridgeRequest::SetMaintenanceMode { enabled })
    }

    /// Dispatch a menu selection
    pub fn select_action(&mut self, action: MenuAction) -> Result<()> {
        self.ensure_interactive()?;
        self.ensure_state("select a menu action", SessionState::Authenticated)?;
        self.ensure_offered(action)?;

        match action {
            MenuAction::CheckBalance => self.fetch_balance(),
            MenuAction::MaintenanceOn => self.set_maintenance_mode(true),
            MenuAction::MaintenanceOff => self.set_maintenance_mode(false),
            MenuAction::Withdraw | MenuAction::Deposit => {
                self.set_status(&format!("{} is not available at this terminal", action.label()));
                Ok(())
            }
            MenuAction::Logout => self.logout(),
        }
    }

    /// Leave the authenticated menu for the login page
    pub fn logout(&mut self) -> Result<()> {
        self.ensure_interactive()?;
        self.ensure_state("log out", SessionState::Authenticated)?;
        info!("Logging out {}", self.session.identity);
        self.navigate(Navigation::login());
        Ok(())
    }

    /// Return from the detail view to the menu
    pub fn back(&mut self) -> Result<()> {
        self.ensure_interactive()?;
        self.ensure_state("go back", SessionState::Detail)?;
        let target = Navigation::menu(&self.session.identity, self.session.role);
        self.navigate(target);
        Ok(())
    }

    /// Start over from the login page after the challenge expired
    pub fn restart_login(&mut self) -> Result<()> {
        self.ensure_interactive()?;
        self.ensure_state("restart login", SessionState::OtpPending)?;
        self.navigate(Navigation::login());
        Ok(())
    }

    /// One countdown second: redraw, update text, decrement
    pub fn tick(&mut self) -> Option<TickOutcome> {
        let challenge = self.challenge.as_mut()?;
        if challenge.countdown.is_expired() {
            return Some(TickOutcome::Stopped);
        }

        self.surface.draw_countdown(
            challenge.countdown.remaining(),
            challenge.countdown.sweep_degrees(),
        );
        let outcome = challenge.countdown.tick();
        debug!("OTP countdown tick: {:?}", outcome);

        if outcome == TickOutcome::Expired {
            self.expire_challenge();
        }
        Some(outcome)
    }

    fn start_challenge(&mut self, seed: u32) {
        let countdown = OtpCountdown::new(seed);
        self.surface
            .draw_countdown(countdown.remaining(), countdown.sweep_degrees());

        let timer = if countdown.is_expired() {
            TimerHandle::inert()
        } else {
            let events = self.ctx.events.clone();
            let page_id = self.page_id;
            self.ctx.scheduler.every(
                self.ctx.policy.tick_interval(),
                Box::new(move || events.send(PageEvent::Tick { page_id }).is_ok()),
            )
        };

        self.challenge = Some(OtpChallenge { countdown, timer });
        if seed == 0 {
            self.expire_challenge();
        }
    }

    fn expire_challenge(&mut self) {
        if let Some(challenge) = self.challenge.as_mut() {
            challenge.timer.cancel();
            self.surface.draw_countdown(0, 0.0);
        }
        info!("OTP challenge expired for {}", self.session.identity);
        self.set_status(MSG_OTP_EXPIRED);
    }

    fn render_menu(&mut self) {
        let role = self.session.role;
        self.surface.render_view(View::Menu {
            identity: self.session.identity.clone(),
            role,
            actions: role.menu_actions().to_vec(),
        });
    }

    fn set_status(&mut self, text: &str) {
        self.status = Some(text.to_string());
        self.surface.show_status(text);
    }

    fn send(&self, request: BridgeRequest) -> Result<()> {
        debug!("Queueing {} request", request.operation());
        self.ctx.requests.send(request)?;
        Ok(())
    }

    fn navigate(&mut self, target: Navigation) {
        info!("Navigating to {}", target);
        self.mark_departed(target.clone());
        self.surface.navigate(target);
    }

    fn mark_departed(&mut self, target: Navigation) {
        self.teardown();
        self.departed = Some(target);
    }

    fn teardown(&mut self) {
        if let Some(challenge) = self.challenge.as_mut() {
            challenge.timer.cancel();
        }
    }

    fn ensure_interactive(&self) -> Result<()> {
        if self.locked {
            return Err(KioskError::LockedDown);
        }
        Ok(())
    }

    fn ensure_state(&self, operation: &'static str, expected: SessionState) -> Result<()> {
        if self.session.state != expected {
            return Err(KioskError::InvalidState {
                operation,
                state: self.session.state.as_str(),
            });
        }
        Ok(())
    }

    fn ensure_offered(&self, action: MenuAction) -> Result<()> {
        if !self.session.role.menu_actions().contains(&action) {
            return Err(KioskError::Forbidden(format!(
                "{} is not available to {} accounts",
                action.label(),
                self.session.role
            )));
        }
        Ok(())
    }
}
