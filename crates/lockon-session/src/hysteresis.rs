//! [`VisibilityGate`] – lock/visibility hysteresis.
//!
//! Decouples the raw found/lost signal from the visible/hidden state of the
//! rendered content.  Tracking engines routinely drop a target for a frame or
//! two; hiding and re-showing content on every drop flickers badly.
//!
//! On a raw loss the gate arms a hide deadline rather than hiding.  A raw
//! find before the deadline cancels it and the drop is never observable.  If
//! the deadline passes without a re-find, the content hides exactly once.
//!
//! The hide delay must be longer than the scanner's own resume-scan settle
//! delay: the gate bridges engine hiccups precisely while the scanner has not
//! yet started cycling away from the target.

use std::time::{Duration, Instant};

use tracing::debug;

/// Debounced visible/hidden state for the projected content.
///
/// Drive it with [`VisibilityGate::on_found`] / [`VisibilityGate::on_lost`]
/// from raw engine events and poll [`VisibilityGate::tick`] once per loop
/// iteration.  Both entry points return the visibility transition to publish,
/// if any; repeated events in the same state are idempotent.
#[derive(Debug)]
pub struct VisibilityGate {
    hide_delay: Duration,
    visible: bool,
    /// Pending hide deadline; armed by a raw loss, cancelled by a raw find.
    hide_at: Option<Instant>,
}

impl VisibilityGate {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            hide_delay,
            visible: false,
            hide_at: None,
        }
    }

    /// Whether the content is currently shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Raw "target found": cancel any pending hide immediately and show.
    ///
    /// Returns `Some(true)` when this transitions hidden → visible, `None`
    /// when already visible (including a re-find that merely cancelled a
    /// pending hide).
    pub fn on_found(&mut self) -> Option<bool> {
        if self.hide_at.take().is_some() {
            debug!("re-find before hide deadline; treating loss as transient");
        }
        if self.visible {
            return None;
        }
        self.visible = true;
        Some(true)
    }

    /// Raw "target lost": arm the hide deadline.
    ///
    /// Does not hide; the actual transition happens in [`tick`][Self::tick]
    /// once `hide_delay` elapses without a re-find.  Idempotent while a
    /// deadline is already pending or the content is already hidden.
    pub fn on_lost(&mut self) {
        if !self.visible || self.hide_at.is_some() {
            return;
        }
        self.hide_at = Some(Instant::now() + self.hide_delay);
    }

    /// Fire the hide deadline if it has elapsed.
    ///
    /// Returns `Some(false)` exactly once per armed deadline, `None`
    /// otherwise.
    pub fn tick(&mut self) -> Option<bool> {
        match self.hide_at {
            Some(deadline) if Instant::now() >= deadline => {
                self.hide_at = None;
                self.visible = false;
                debug!("hide deadline elapsed without re-find; hiding content");
                Some(false)
            }
            _ => None,
        }
    }

    /// Cancel any pending deadline and hide, without emitting a transition.
    /// Used on session teardown.
    pub fn cancel(&mut self) {
        self.hide_at = None;
        self.visible = false;
    }
}
