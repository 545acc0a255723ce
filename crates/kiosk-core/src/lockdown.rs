//! Emergency lockdown coordination
//!
//! The lockdown flag is the only state that outlives a page. It is written to
//! the session store by the backend's emergency push and read by every page
//! before anything else happens on load.

use tracing::{info, warn};

use crate::error::Result;
use crate::navigation::Navigation;
use crate::store::SharedStore;
use crate::surface::DisplaySurface;

/// Fixed store key for the lockdown flag
pub const LOCKDOWN_KEY: &str = "emergencyLock";

const LOCKED_VALUE: &str = "true";

/// Boolean flag persisted in the session store
#[derive(Clone)]
pub struct LockdownFlag {
    store: SharedStore,
}

impl LockdownFlag {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Whether lockdown has been engaged in this browsing session
    pub fn is_set(&self) -> Result<bool> {
        Ok(self.store.get(LOCKDOWN_KEY)?.as_deref() == Some(LOCKED_VALUE))
    }

    /// Engage lockdown for every subsequent page load
    pub fn engage(&self) -> Result<()> {
        self.store.set(LOCKDOWN_KEY, LOCKED_VALUE)
    }

    /// Manual reset. Not reachable from any user action or backend event.
    pub fn clear(&self) -> Result<()> {
        warn!("Lockdown flag cleared manually");
        self.store.remove(LOCKDOWN_KEY)
    }
}

/// Applies lockdown to the current page and makes it durable
#[derive(Clone)]
pub struct LockdownCoordinator {
    flag: LockdownFlag,
}

impl LockdownCoordinator {
    pub fn new(store: SharedStore) -> Self {
        Self {
            flag: LockdownFlag::new(store),
        }
    }

    pub fn flag(&self) -> &LockdownFlag {
        &self.flag
    }

    /// Handle the backend's emergency push.
    ///
    /// Shows the overlay when the page has one, otherwise navigates to the
    /// lockdown page. The flag is written either way. In-flight requests are
    /// left alone.
    pub fn trigger<D: DisplaySurface + ?Sized>(&self, surface: &mut D) -> Result<()> {
        info!("Emergency lockdown triggered");
        let overlay = surface.has_lockdown_overlay();
        if overlay {
            surface.show_lockdown_overlay();
        }
        self.flag.engage()?;
        if !overlay {
            surface.navigate(Navigation::lockdown());
        }
        Ok(())
    }

    /// Page-load check. Returns true when the page came up locked.
    pub fn on_page_load<D: DisplaySurface + ?Sized>(&self, surface: &mut D) -> Result<bool> {
        if !self.flag.is_set()? {
            return Ok(false);
        }
        if surface.has_lockdown_overlay() {
            surface.show_lockdown_overlay();
        } else {
            surface.navigate(Navigation::lockdown());
        }
        Ok(true)
    }
}
