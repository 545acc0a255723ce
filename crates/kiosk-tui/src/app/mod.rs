//! Application state and event handling

pub mod config;
mod events;
mod state;

pub use config::{ConfigError, TuiConfig};
pub use events::{Event, EventHandler};
pub use state::{Field, FormState};

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use kiosk_core::{
    spawn_dispatcher, BackendBridge, KioskError, LockdownFlag, MemoryStore, Navigation, Page,
    PageContext, PageEvent, Result, SessionMachine, TokioScheduler, View,
};
use ratatui::prelude::*;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::auth::AccountBook;
use crate::backend::SimulatedBackend;
use crate::surface::TerminalSurface;
use crate::ui::components::notification::{Notification, NotificationManager};
use crate::ui::{self, Theme};

/// Redraw period for animations and toast expiry
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Main application struct
pub struct App {
    /// Visual theme
    pub theme: Theme,

    /// Loaded configuration
    pub config: TuiConfig,

    /// Input buffers for the page on screen
    pub form: FormState,

    /// Toasts for errors the page itself does not display
    pub notifications: NotificationManager,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Redraw counter for animations
    pub tick: u64,

    machine: SessionMachine<TerminalSurface>,
    ctx: PageContext,
    store: MemoryStore,
    backend: Arc<SimulatedBackend>,
    dispatcher: JoinHandle<()>,
}

impl App {
    /// Create the application and load the login page.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        config: TuiConfig,
        accounts: AccountBook,
        page_events: mpsc::UnboundedSender<PageEvent>,
    ) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();

        let backend = Arc::new(SimulatedBackend::new(
            accounts,
            page_events.clone(),
            Duration::from_millis(config.simulated_latency_ms),
        ));
        let bridge: Arc<dyn BackendBridge> = backend.clone();
        let dispatcher = spawn_dispatcher(bridge, request_rx, page_events.clone());

        let store = MemoryStore::new();
        let ctx = PageContext::new(
            store.clone().shared(),
            Arc::new(TokioScheduler::new(Handle::current())),
            request_tx,
            page_events,
            config.session.clone(),
        );
        let machine = SessionMachine::load(
            Navigation::login(),
            ctx.clone(),
            TerminalSurface::for_page(Page::Login),
        )?;

        Ok(Self {
            theme: Theme::default(),
            config,
            form: FormState::new(),
            notifications: NotificationManager::new(),
            should_quit: false,
            tick: 0,
            machine,
            ctx,
            store,
            backend,
            dispatcher,
        })
    }

    /// Page currently on screen
    pub fn page(&self) -> &SessionMachine<TerminalSurface> {
        &self.machine
    }

    pub fn backend(&self) -> &SimulatedBackend {
        &self.backend
    }

    /// Run the application main loop
    pub async fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut EventHandler,
    ) -> anyhow::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;
            let event = events.next().await?;
            self.handle_event(event)?;
        }
        info!("Kiosk shutting down");
        Ok(())
    }

    /// Apply one event, then follow any navigation it caused
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key)?,
            Event::Key(_) | Event::Resize => {}
            Event::Redraw => {
                self.tick = self.tick.wrapping_add(1);
                self.notifications.tick();
            }
            Event::Page(event) => self.machine.handle_event(event)?,
            Event::Closed => self.should_quit = true,
        }
        self.follow_navigation()
    }

    fn follow_navigation(&mut self) -> Result<()> {
        while let Some(target) = self.machine.departed().cloned() {
            self.load(target)?;
        }
        Ok(())
    }

    fn load(&mut self, target: Navigation) -> Result<()> {
        self.form.reset_for(target.page);
        let surface = TerminalSurface::for_page(target.page);
        self.machine = SessionMachine::load(target, self.ctx.clone(), surface)?;
        Ok(())
    }

    /// Handle key press events
    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Global quit handler
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        // Operator controls
        match key.code {
            KeyCode::F(8) => {
                let online = self.backend.toggle_ledger();
                self.notifications.push(if online {
                    Notification::success("Ledger back online")
                } else {
                    Notification::warning("Ledger offline")
                });
                return Ok(());
            }
            KeyCode::F(9) => {
                if !self.backend.raise_intrusion_alert() {
                    self.notifications
                        .push(Notification::info("Intrusion alert ignored: maintenance mode"));
                }
                return Ok(());
            }
            KeyCode::F(12) => return self.reset_lockdown(),
            _ => {}
        }

        let outcome = match self.machine.page() {
            Page::Login => self.handle_login_key(key.code),
            Page::Otp => self.handle_otp_key(key.code),
            Page::Menu => self.handle_menu_key(key.code),
            Page::Balance => self.handle_balance_key(key.code),
            Page::Lockdown => Ok(()),
        };
        self.report(outcome)
    }

    fn handle_login_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.form.toggle_focus()
            }
            KeyCode::Backspace => self.form.pop_login_char(),
            KeyCode::Char(c) => self.form.push_login_char(c),
            KeyCode::Enter => {
                if self.form.focus == Field::Identity && self.form.credential.is_empty() {
                    self.form.toggle_focus();
                } else {
                    let identity = self.form.identity.clone();
                    let credential = self.form.credential.clone();
                    self.machine.submit_login(&identity, &credential)?;
                    self.form.credential.clear();
                }
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    fn handle_otp_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char(c) => self.form.push_otp_char(c),
            KeyCode::Backspace => {
                self.form.otp_input.pop();
            }
            KeyCode::Enter => {
                let code = std::mem::take(&mut self.form.otp_input);
                self.machine.submit_otp(&code)?;
            }
            KeyCode::Esc => self.machine.restart_login()?,
            _ => {}
        }
        Ok(())
    }

    fn handle_menu_key(&mut self, key: KeyCode) -> Result<()> {
        let actions = match self.machine.surface().view() {
            Some(View::Menu { actions, .. }) => actions.clone(),
            _ => Vec::new(),
        };
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.form.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.form.select_next(actions.len()),
            KeyCode::Enter => {
                if let Some(action) = actions.get(self.form.menu_index) {
                    self.machine.select_action(*action)?;
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let index = c.to_digit(10).unwrap_or(0) as usize;
                if let Some(action) = index.checked_sub(1).and_then(|i| actions.get(i)) {
                    self.form.menu_index = index - 1;
                    self.machine.select_action(*action)?;
                }
            }
            KeyCode::Esc => self.machine.logout()?,
            _ => {}
        }
        Ok(())
    }

    fn handle_balance_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('b') => {
                self.machine.back()
            }
            _ => Ok(()),
        }
    }

    /// Clear the lockdown flag and return to login, when configuration allows it
    fn reset_lockdown(&mut self) -> Result<()> {
        if !self.config.allow_manual_lockdown_reset {
            warn!("Manual lockdown reset refused by configuration");
            return Ok(());
        }
        LockdownFlag::new(self.store.clone().shared()).clear()?;
        self.notifications.push(Notification::success("Lockdown cleared"));
        self.load(Navigation::login())
    }

    /// Show errors the page did not already put in its status line
    fn report(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(KioskError::Validation(_)) | Err(KioskError::ChallengeExpired) => Ok(()),
            Err(e @ KioskError::LockedDown) => {
                self.notifications.push(Notification::error(e.to_string()));
                Ok(())
            }
            Err(e @ (KioskError::Forbidden(_) | KioskError::InvalidState { .. })) => {
                self.notifications.push(Notification::warning(e.to_string()));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}
