//! End-to-end session flow tests
//!
//! A small "browser" loads pages, follows navigations the way a real page
//! change would (fresh machine, fresh surface, same session store), and
//! collects the requests each page queues for the backend.

use std::sync::Arc;

use rstest::rstest;
use tokio::sync::mpsc;

use kiosk_core::{
    BackendEvent, BalanceReply, BridgeRequest, ExpiryPolicy, KioskError, ManualScheduler,
    MemoryStore, MenuAction, Navigation, Page, PageContext, PageEvent, RecordingSurface, Role,
    SessionMachine, SessionPolicy, SessionState, SessionStore, TickOutcome, View, LOCKDOWN_KEY,
};

struct Browser {
    ctx: PageContext,
    store: MemoryStore,
    requests: mpsc::UnboundedReceiver<BridgeRequest>,
    _events: mpsc::UnboundedReceiver<PageEvent>,
    page: SessionMachine<RecordingSurface>,
    visited: Vec<Page>,
}

impl Browser {
    fn open(target: Navigation) -> Self {
        Self::open_with(target, SessionPolicy::default())
    }

    fn open_with(target: Navigation, policy: SessionPolicy) -> Self {
        let store = MemoryStore::new();
        let (request_tx, requests) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let ctx = PageContext::new(
            store.clone().shared(),
            Arc::new(ManualScheduler::new()),
            request_tx,
            event_tx,
            policy,
        );
        let visited = vec![target.page];
        let page = SessionMachine::load(target, ctx.clone(), RecordingSurface::new()).unwrap();
        Self {
            ctx,
            store,
            requests,
            _events: events,
            page,
            visited,
        }
    }

    /// Load a page in the same browsing session
    fn goto(&mut self, target: Navigation) {
        self.visited.push(target.page);
        self.page = SessionMachine::load(target, self.ctx.clone(), RecordingSurface::new()).unwrap();
    }

    /// Follow the navigation the current page asked for, if any
    fn follow(&mut self) -> bool {
        match self.page.departed().cloned() {
            Some(target) => {
                self.goto(target);
                true
            }
            None => false,
        }
    }

    fn push(&mut self, event: BackendEvent) {
        self.page.handle_backend_event(event).unwrap();
        self.follow();
    }

    fn tick(&mut self) -> Option<TickOutcome> {
        let page_id = self.page.page_id();
        self.page.handle_event(PageEvent::Tick { page_id }).unwrap();
        self.page.challenge().map(|c| {
            if c.is_expired() {
                TickOutcome::Expired
            } else {
                TickOutcome::Running {
                    remaining: c.countdown().remaining(),
                }
            }
        })
    }

    fn drain_requests(&mut self) -> Vec<BridgeRequest> {
        let mut out = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            out.push(request);
        }
        out
    }
}

fn redirect_to_otp(identity: &str, role: Role, seconds: u32) -> BackendEvent {
    BackendEvent::RedirectToOtp {
        identity: identity.to_string(),
        status: role,
        countdown_seconds: Some(seconds),
    }
}

fn redirect_to_menu(identity: &str, role: Role) -> BackendEvent {
    BackendEvent::RedirectToMainMenu {
        identity: identity.to_string(),
        status: role,
    }
}

#[rstest]
#[case("", "pw1")]
#[case("alice", "")]
#[case("   ", "pw1")]
#[case("alice", " \t ")]
#[case("", "")]
fn test_login_with_missing_field_makes_no_call(#[case] identity: &str, #[case] credential: &str) {
    let mut browser = Browser::open(Navigation::login());

    let result = browser.page.submit_login(identity, credential);

    assert!(matches!(result, Err(KioskError::Validation(_))));
    assert!(browser.drain_requests().is_empty());
    assert_eq!(
        browser.page.status(),
        Some("Please enter both username and password")
    );
    assert_eq!(browser.page.state(), SessionState::Unauthenticated);
}

#[test]
fn test_login_queues_one_request_and_waits_for_push() {
    let mut browser = Browser::open(Navigation::login());

    browser
        .page
        .submit_login(" alice ", "  pw with spaces  ")
        .unwrap();

    let requests = browser.drain_requests();
    assert_eq!(requests.len(), 1);
    match &requests[0] {
        BridgeRequest::Login {
            identity,
            credential,
        } => {
            assert_eq!(identity, "alice");
            // Passwords are compared byte for byte by the backend
            assert_eq!(credential.as_str(), "  pw with spaces  ");
        }
        other => panic!("unexpected request {:?}", other),
    }
    assert_eq!(browser.page.status(), Some("Authenticating..."));
    assert_eq!(browser.page.state(), SessionState::Unauthenticated);
    assert!(browser.page.departed().is_none());
}

#[test]
fn test_status_push_on_login_page_keeps_state() {
    let mut browser = Browser::open(Navigation::login());
    browser.page.submit_login("alice", "wrong").unwrap();

    browser.push(BackendEvent::StatusMessage {
        text: "Invalid credentials".to_string(),
    });

    assert_eq!(browser.page.page(), Page::Login);
    assert_eq!(browser.page.state(), SessionState::Unauthenticated);
    assert_eq!(browser.page.status(), Some("Invalid credentials"));
}

#[rstest]
#[case("")]
#[case("12345")]
#[case("1234567")]
#[case("12 34")]
fn test_otp_with_wrong_length_makes_no_call(#[case] code: &str) {
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, 60));

    let result = browser.page.submit_otp(code);

    assert!(matches!(result, Err(KioskError::Validation(_))));
    assert!(browser.drain_requests().is_empty());
    assert_eq!(browser.page.state(), SessionState::OtpPending);
}

#[test]
fn test_customer_happy_path() {
    let mut browser = Browser::open(Navigation::login());

    browser.page.submit_login("alice", "pw1").unwrap();
    assert_eq!(browser.drain_requests().len(), 1);

    browser.push(redirect_to_otp("alice", Role::Customer, 60));
    assert_eq!(browser.page.page(), Page::Otp);
    assert_eq!(browser.page.state(), SessionState::OtpPending);
    assert_eq!(browser.page.session().identity, "alice");
    assert_eq!(
        browser.page.challenge().unwrap().countdown().remaining(),
        60
    );
    assert_eq!(browser.page.surface().countdown_frames[0], (60, 360.0));

    browser.tick();
    browser.page.submit_otp("123456").unwrap();
    let requests = browser.drain_requests();
    assert_eq!(requests.len(), 1);
    match &requests[0] {
        BridgeRequest::VerifyOtp { identity, code } => {
            assert_eq!(identity, "alice");
            assert_eq!(code, "123456");
        }
        other => panic!("unexpected request {:?}", other),
    }

    browser.push(redirect_to_menu("alice", Role::Customer));
    assert_eq!(browser.page.page(), Page::Menu);
    assert_eq!(browser.page.state(), SessionState::Authenticated);
    assert_eq!(
        browser.page.surface().last_view(),
        Some(&View::Menu {
            identity: "alice".to_string(),
            role: Role::Customer,
            actions: vec![
                MenuAction::CheckBalance,
                MenuAction::Withdraw,
                MenuAction::Deposit,
                MenuAction::Logout,
            ],
        })
    );
    assert_eq!(
        browser.visited,
        vec![Page::Login, Page::Otp, Page::Menu]
    );
}

#[test]
fn test_countdown_expires_exactly_once() {
    let seed = 60;
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, seed));

    for _ in 0..seed - 1 {
        assert!(matches!(browser.tick(), Some(TickOutcome::Running { .. })));
    }
    assert_eq!(browser.tick(), Some(TickOutcome::Expired));

    // Further ticks change nothing
    browser.tick();
    browser.tick();

    let surface = browser.page.surface();
    let expired_messages = surface
        .statuses
        .iter()
        .filter(|s| s.as_str() == "OTP expired")
        .count();
    assert_eq!(expired_messages, 1);
    assert_eq!(surface.countdown_frames.last(), Some(&(0, 0.0)));
    assert!(surface
        .countdown_frames
        .windows(2)
        .all(|w| w[1].0 <= w[0].0));
}

#[test]
fn test_otp_failure_keeps_challenge_running() {
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, 60));
    browser.tick();
    browser.page.submit_otp("000000").unwrap();

    browser.push(BackendEvent::OtpFailed {
        text: "Wrong OTP".to_string(),
    });

    assert_eq!(browser.page.page(), Page::Otp);
    assert_eq!(browser.page.status(), Some("Wrong OTP"));
    assert_eq!(
        browser.page.challenge().unwrap().countdown().remaining(),
        59
    );
    browser.tick();
    assert_eq!(
        browser.page.challenge().unwrap().countdown().remaining(),
        58
    );

    // User may retry immediately
    browser.page.submit_otp("654321").unwrap();
    assert_eq!(browser.drain_requests().len(), 2);
}

#[test]
fn test_status_pushes_only_touch_text() {
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, 30));
    browser.tick();

    for i in 0..5 {
        browser.push(BackendEvent::StatusMessage {
            text: format!("message {}", i),
        });
    }

    assert_eq!(browser.page.status(), Some("message 4"));
    assert_eq!(browser.page.state(), SessionState::OtpPending);
    assert_eq!(
        browser.page.challenge().unwrap().countdown().remaining(),
        29
    );
    assert!(browser.drain_requests().is_empty());
}

#[test]
fn test_expired_submission_is_forwarded_by_default() {
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, 2));
    browser.tick();
    browser.tick();
    assert!(browser.page.challenge().unwrap().is_expired());
    assert_eq!(browser.page.status(), Some("OTP expired"));

    browser.page.submit_otp("123456").unwrap();
    assert_eq!(browser.drain_requests().len(), 1);
}

#[test]
fn test_expired_submission_is_blocked_under_strict_policy() {
    let policy = SessionPolicy {
        expiry_policy: ExpiryPolicy::Block,
        ..SessionPolicy::default()
    };
    let mut browser = Browser::open_with(Navigation::otp("alice", Role::Customer, 60), policy);
    for _ in 0..60 {
        browser.tick();
    }
    assert_eq!(browser.page.status(), Some("OTP expired"));

    let result = browser.page.submit_otp("123456");

    assert_eq!(result, Err(KioskError::ChallengeExpired));
    assert!(browser.drain_requests().is_empty());
}

#[test]
fn test_late_success_push_is_accepted_after_expiry() {
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, 1));
    assert_eq!(browser.tick(), Some(TickOutcome::Expired));

    browser.push(redirect_to_menu("alice", Role::Customer));

    assert_eq!(browser.page.page(), Page::Menu);
    assert_eq!(browser.page.state(), SessionState::Authenticated);
}

#[test]
fn test_restart_after_expiry_returns_to_login() {
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, 1));
    browser.tick();

    browser.page.restart_login().unwrap();
    browser.follow();

    assert_eq!(browser.page.page(), Page::Login);
    assert_eq!(browser.page.session().identity, "");
}

#[test]
fn test_missing_countdown_uses_default_seed() {
    let browser = Browser::open(Navigation::parse("otp.html?user=alice&status=customer").unwrap());
    assert_eq!(
        browser.page.challenge().unwrap().countdown().initial(),
        60
    );

    let mut browser = Browser::open(Navigation::login());
    browser.push(BackendEvent::RedirectToOtp {
        identity: "bob".to_string(),
        status: Role::Staff,
        countdown_seconds: None,
    });
    assert_eq!(
        browser.page.challenge().unwrap().countdown().initial(),
        60
    );
    assert_eq!(browser.page.session().role, Role::Staff);
}

#[test]
fn test_staff_menu_exposes_only_maintenance_and_logout() {
    let mut browser = Browser::open(Navigation::login());
    browser.push(redirect_to_otp("carol", Role::Staff, 60));
    browser.push(redirect_to_menu("carol", Role::Staff));

    match browser.page.surface().last_view() {
        Some(View::Menu { role, actions, .. }) => {
            assert_eq!(*role, Role::Staff);
            assert_eq!(
                actions,
                &vec![
                    MenuAction::MaintenanceOn,
                    MenuAction::MaintenanceOff,
                    MenuAction::Logout
                ]
            );
        }
        other => panic!("expected menu, got {:?}", other),
    }

    for action in [
        MenuAction::CheckBalance,
        MenuAction::Withdraw,
        MenuAction::Deposit,
    ] {
        assert!(matches!(
            browser.page.select_action(action),
            Err(KioskError::Forbidden(_))
        ));
    }
    assert!(matches!(
        browser.page.fetch_balance(),
        Err(KioskError::Forbidden(_))
    ));
    assert!(browser.drain_requests().is_empty());

    browser.page.select_action(MenuAction::MaintenanceOn).unwrap();
    let requests = browser.drain_requests();
    assert!(matches!(
        requests.as_slice(),
        [BridgeRequest::SetMaintenanceMode { enabled: true }]
    ));

    browser.push(BackendEvent::StatusMessage {
        text: "Maintenance ON".to_string(),
    });
    assert_eq!(browser.page.status(), Some("Maintenance ON"));
}

#[test]
fn test_customer_cannot_toggle_maintenance() {
    let mut browser = Browser::open(Navigation::menu("alice", Role::Customer));
    assert!(matches!(
        browser.page.set_maintenance_mode(true),
        Err(KioskError::Forbidden(_))
    ));
    assert!(browser.drain_requests().is_empty());
}

#[test]
fn test_withdraw_and_deposit_report_unavailable() {
    let mut browser = Browser::open(Navigation::menu("alice", Role::Customer));

    browser.page.select_action(MenuAction::Withdraw).unwrap();
    assert_eq!(
        browser.page.status(),
        Some("Withdraw is not available at this terminal")
    );
    browser.page.select_action(MenuAction::Deposit).unwrap();
    assert_eq!(
        browser.page.status(),
        Some("Deposit is not available at this terminal")
    );
    assert!(browser.drain_requests().is_empty());
}

#[rstest]
#[case(BalanceReply::Amount(1523.4), "RM 1523.40", false)]
#[case(BalanceReply::Amount(0.0), "RM 0.00", false)]
#[case(BalanceReply::Error, "Error retrieving balance", true)]
fn test_balance_fetch_always_reaches_detail(
    #[case] reply: BalanceReply,
    #[case] expected: &str,
    #[case] expect_error: bool,
) {
    let mut browser = Browser::open(Navigation::menu("alice", Role::Customer));

    browser.page.select_action(MenuAction::CheckBalance).unwrap();
    let requests = browser.drain_requests();
    assert!(matches!(
        requests.as_slice(),
        [BridgeRequest::GetBalance { identity }] if identity == "alice"
    ));
    assert!(browser.page.is_balance_pending());

    browser
        .page
        .handle_event(PageEvent::BalanceResolved {
            identity: "alice".to_string(),
            reply,
        })
        .unwrap();
    assert!(browser.follow());

    assert_eq!(browser.page.page(), Page::Balance);
    assert_eq!(browser.page.state(), SessionState::Detail);
    assert_eq!(
        browser.page.surface().last_view(),
        Some(&View::Balance {
            identity: "alice".to_string(),
            text: expected.to_string(),
            is_error: expect_error,
        })
    );
}

#[test]
fn test_balance_ready_push_reaches_detail() {
    let mut browser = Browser::open(Navigation::menu("alice", Role::Customer));

    browser.push(BackendEvent::BalanceReady {
        identity: "alice".to_string(),
        amount: 88.0,
    });

    assert_eq!(browser.page.page(), Page::Balance);
    assert_eq!(browser.page.balance(), Some(BalanceReply::Amount(88.0)));
}

#[test]
fn test_balance_push_after_logout_is_dropped() {
    let mut browser = Browser::open(Navigation::menu("carol", Role::Staff));
    browser.page.logout().unwrap();
    assert!(browser.follow());
    assert_eq!(browser.page.page(), Page::Login);

    browser
        .page
        .handle_backend_event(BackendEvent::BalanceReady {
            identity: "carol".to_string(),
            amount: 5.0,
        })
        .unwrap();

    assert!(browser.page.departed().is_none());
    assert_eq!(browser.page.state(), SessionState::Unauthenticated);
}

#[rstest]
#[case::staff_menu(Navigation::menu("carol", Role::Staff), "carol")]
#[case::other_customer(Navigation::menu("alice", Role::Customer), "bob")]
#[case::otp_pending(Navigation::otp("alice", Role::Customer, 60), "alice")]
fn test_balance_push_outside_owning_session_is_dropped(
    #[case] target: Navigation,
    #[case] identity: &str,
) {
    let mut browser = Browser::open(target);
    let page = browser.page.page();

    browser
        .page
        .handle_backend_event(BackendEvent::BalanceReady {
            identity: identity.to_string(),
            amount: 5.0,
        })
        .unwrap();

    assert!(browser.page.departed().is_none());
    assert_eq!(browser.page.page(), page);
}

#[test]
fn test_back_from_detail_rebuilds_menu() {
    let mut browser = Browser::open(Navigation::balance(
        "alice",
        Role::Customer,
        BalanceReply::Amount(5.0),
    ));

    browser.page.back().unwrap();
    browser.follow();

    assert_eq!(browser.page.page(), Page::Menu);
    assert_eq!(browser.page.session().identity, "alice");
    assert_eq!(browser.page.session().role, Role::Customer);
}

#[test]
fn test_logout_discards_session() {
    let mut browser = Browser::open(Navigation::menu("alice", Role::Customer));

    browser.page.select_action(MenuAction::Logout).unwrap();
    browser.follow();

    assert_eq!(browser.page.page(), Page::Login);
    assert_eq!(browser.page.session().identity, "");
    assert_eq!(browser.page.state(), SessionState::Unauthenticated);
}

#[test]
fn test_operations_in_wrong_state_are_rejected() {
    let mut browser = Browser::open(Navigation::login());
    assert!(matches!(
        browser.page.submit_otp("123456"),
        Err(KioskError::InvalidState { .. })
    ));
    assert!(matches!(
        browser.page.fetch_balance(),
        Err(KioskError::InvalidState { .. })
    ));
    assert!(matches!(
        browser.page.back(),
        Err(KioskError::InvalidState { .. })
    ));
    assert!(browser.drain_requests().is_empty());
}

#[test]
fn test_lockdown_survives_navigation() {
    let mut browser = Browser::open(Navigation::login());
    browser.page.submit_login("alice", "pw1").unwrap();
    browser.drain_requests();

    browser.push(BackendEvent::EmergencyLockdown);
    assert!(browser.page.surface().overlay_visible);
    assert!(browser.page.is_locked());
    assert_eq!(
        browser.store.get(LOCKDOWN_KEY).unwrap().as_deref(),
        Some("true")
    );

    // The in-flight login still completes and navigates
    browser.push(redirect_to_otp("alice", Role::Customer, 60));
    assert_eq!(browser.page.page(), Page::Otp);

    let surface = browser.page.surface();
    assert!(surface.overlay_visible);
    assert_eq!(surface.calls.first(), Some(&"show_lockdown_overlay"));
    assert!(browser.page.is_locked());

    // Interaction is suppressed on the new page
    assert_eq!(
        browser.page.submit_otp("123456"),
        Err(KioskError::LockedDown)
    );
    assert!(browser.drain_requests().is_empty());
}

#[test]
fn test_lockdown_on_fresh_page_load_without_push() {
    let mut browser = Browser::open(Navigation::menu("alice", Role::Customer));
    browser.push(BackendEvent::EmergencyLockdown);

    browser.goto(Navigation::login());

    assert!(browser.page.surface().overlay_visible);
    assert_eq!(browser.page.surface().overlay_shows, 1);
    assert_eq!(
        browser.page.surface().calls.first(),
        Some(&"show_lockdown_overlay")
    );
}

#[test]
fn test_lockdown_page_fallback_without_overlay() {
    let store = MemoryStore::new();
    store.set(LOCKDOWN_KEY, "true").unwrap();

    let (request_tx, _requests) = mpsc::unbounded_channel();
    let (event_tx, _events) = mpsc::unbounded_channel();
    let ctx = PageContext::new(
        store.shared(),
        Arc::new(ManualScheduler::new()),
        request_tx,
        event_tx,
        SessionPolicy::default(),
    );

    let machine = SessionMachine::load(
        Navigation::menu("alice", Role::Customer),
        ctx,
        RecordingSurface::without_overlay(),
    )
    .unwrap();

    assert_eq!(machine.departed().map(|n| n.page), Some(Page::Lockdown));
    assert!(machine.surface().views.is_empty());
    assert_eq!(machine.surface().calls, vec!["navigate"]);
}

#[test]
fn test_pushes_still_apply_during_lockdown() {
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, 60));
    browser.push(BackendEvent::EmergencyLockdown);

    browser.push(BackendEvent::StatusMessage {
        text: "Terminal locked by security".to_string(),
    });
    assert_eq!(browser.page.status(), Some("Terminal locked by security"));

    // Countdown keeps going under the overlay
    browser.tick();
    assert_eq!(
        browser.page.challenge().unwrap().countdown().remaining(),
        59
    );
}

#[test]
fn test_otp_ignores_surrounding_whitespace() {
    let mut browser = Browser::open(Navigation::otp("alice", Role::Customer, 60));

    browser.page.submit_otp(" 123456 ").unwrap();

    let requests = browser.drain_requests();
    assert_eq!(requests.len(), 1);
    match &requests[0] {
        BridgeRequest::VerifyOtp { code, .. } => assert_eq!(code, "123456"),
        other => panic!("unexpected request {:?}", other),
    }
}
