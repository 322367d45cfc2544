//! Theme picker popover and its outside-click handling.

use std::io::{self, Write};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::layout::{Position, Rect};
use tracing::{debug, warn};

use crate::theme::{PreferenceStore, ThemePreference};

/// Result of a pointer-down as seen by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Menu closed, the event is not the menu's business.
    Inert,
    /// Inside the menu but not on a row.
    Inside,
    /// A row was clicked and its theme applied.
    Selected(ThemePreference),
    /// Outside the menu; the menu closed.
    Dismissed,
}

#[derive(Debug)]
pub struct SettingsMenu {
    open: bool,
    highlighted: usize,
    region: Option<Rect>,
}

impl SettingsMenu {
    pub fn new(current: ThemePreference) -> Self {
        Self {
            open: false,
            highlighted: index_of(current),
            region: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> ThemePreference {
        ThemePreference::ALL[self.highlighted]
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        if !self.open {
            self.region = None;
        }
        debug!(open = self.open, "settings menu toggled");
    }

    pub fn close(&mut self) {
        self.open = false;
        self.region = None;
    }

    /// Where the popover was last drawn. Ignored while closed.
    pub fn set_region(&mut self, region: Rect) {
        if self.open {
            self.region = Some(region);
        }
    }

    pub fn highlight_next(&mut self) {
        self.highlighted = (self.highlighted + 1) % ThemePreference::ALL.len();
    }

    pub fn highlight_prev(&mut self) {
        let len = ThemePreference::ALL.len();
        self.highlighted = (self.highlighted + len - 1) % len;
    }

    /// Persist and apply `preference`, then close.
    pub fn select_theme(&mut self, preference: ThemePreference, store: &mut PreferenceStore) {
        store.save(preference);
        store.apply(preference);
        self.highlighted = index_of(preference);
        self.close();
    }

    pub fn select_highlighted(&mut self, store: &mut PreferenceStore) -> ThemePreference {
        let preference = self.highlighted();
        self.select_theme(preference, store);
        preference
    }

    /// Handle a pointer-down at terminal cell (`column`, `row`).
    pub fn handle_pointer_down(
        &mut self,
        column: u16,
        row: u16,
        store: &mut PreferenceStore,
    ) -> PointerOutcome {
        if !self.open {
            return PointerOutcome::Inert;
        }
        let position = Position::new(column, row);

        match self.region {
            Some(region) if region.contains(position) => match item_at(region, position) {
                Some(preference) => {
                    self.select_theme(preference, store);
                    PointerOutcome::Selected(preference)
                }
                None => PointerOutcome::Inside,
            },
            _ => {
                debug!(column, row, "pointer outside settings menu, closing");
                self.close();
                PointerOutcome::Dismissed
            }
        }
    }
}

fn index_of(preference: ThemePreference) -> usize {
    ThemePreference::ALL
        .iter()
        .position(|p| *p == preference)
        .unwrap_or(0)
}

/// Rows sit inside the popover border, one per preference.
fn item_at(region: Rect, position: Position) -> Option<ThemePreference> {
    let inner = Rect {
        x: region.x.saturating_add(1),
        y: region.y.saturating_add(1),
        width: region.width.saturating_sub(2),
        height: region.height.saturating_sub(2),
    };
    if !inner.contains(position) {
        return None;
    }
    ThemePreference::ALL
        .get((position.y - inner.y) as usize)
        .copied()
}

/// Terminal mouse reporting, held for as long as the menu is mounted.
/// Dropping the guard turns reporting back off.
pub struct MouseCapture<W: Write> {
    out: W,
    active: bool,
}

impl<W: Write> MouseCapture<W> {
    pub fn acquire(mut out: W) -> io::Result<Self> {
        execute!(out, EnableMouseCapture)?;
        Ok(Self { out, active: true })
    }

    pub fn release(mut self) -> io::Result<()> {
        self.active = false;
        execute!(self.out, DisableMouseCapture)
    }
}

impl<W: Write> Drop for MouseCapture<W> {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = execute!(self.out, DisableMouseCapture) {
                warn!(error = %e, "failed to disable mouse capture");
            }
        }
    }
}
