//! Event handling for the TUI

use std::io;
use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent};
use futures::StreamExt;
use kiosk_core::PageEvent;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Application events
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resized
    Resize,
    /// Redraw tick (for animations and toasts)
    Redraw,
    /// Push, countdown tick or request result for the current page
    Page(PageEvent),
    /// Terminal input closed
    Closed,
}

/// Merges keyboard input, page events and the redraw clock
pub struct EventHandler {
    keys: EventStream,
    pages: mpsc::UnboundedReceiver<PageEvent>,
    page_sender: mpsc::UnboundedSender<PageEvent>,
    redraw: Interval,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(redraw_rate: Duration) -> Self {
        let (page_sender, pages) = mpsc::unbounded_channel();
        let mut redraw = interval(redraw_rate);
        redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            keys: EventStream::new(),
            pages,
            page_sender,
            redraw,
        }
    }

    /// Sender handed to pages, timers and the backend
    pub fn page_sender(&self) -> mpsc::UnboundedSender<PageEvent> {
        self.page_sender.clone()
    }

    /// Wait for the next event
    pub async fn next(&mut self) -> io::Result<Event> {
        tokio::select! {
            Some(event) = self.pages.recv() => Ok(Event::Page(event)),
            input = self.keys.next() => match input {
                Some(Ok(CrosstermEvent::Key(key))) => Ok(Event::Key(key)),
                Some(Ok(CrosstermEvent::Resize(..))) => Ok(Event::Resize),
                Some(Ok(_)) => Ok(Event::Redraw),
                Some(Err(e)) => Err(e),
                None => Ok(Event::Closed),
            },
            _ = self.redraw.tick() => Ok(Event::Redraw),
        }
    }
}
