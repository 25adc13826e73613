//! Viewport proximity observation

/// Observation lifecycle of a single host element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObserverState {
    Unobserved,
    Observing,
    Triggered,
}

/// Reports when a host element comes within `margin` px of the viewport
pub(crate) trait VisibilityObserver {
    /// Start (or restart) observing with the given proximity margin
    fn observe(&mut self, margin: u32);

    /// Feed a new scroll offset; returns true on the event that enters the
    /// proximity window. Only reports while `Observing`.
    fn on_scroll(&mut self, scroll_top: u32) -> bool;

    /// Stop observing; a triggered observer stays triggered
    fn disconnect(&mut self);

    fn state(&self) -> ObserverState;
}

/// Host spanning `top..top + height` in a page scrolled inside a fixed-height viewport
#[derive(Debug, Clone)]
pub(crate) struct ViewportObserver {
    host_top: u32,
    host_height: u32,
    viewport_height: u32,
    margin: u32,
    state: ObserverState,
}

impl ViewportObserver {
    pub(crate) fn new(host_top: u32, host_height: u32, viewport_height: u32) -> Self {
        Self {
            host_top,
            host_height,
            viewport_height,
            margin: 0,
            state: ObserverState::Unobserved,
        }
    }

    fn within_window(&self, scroll_top: u32) -> bool {
        let window_top = scroll_top.saturating_sub(self.margin);
        let window_bottom = scroll_top
            .saturating_add(self.viewport_height)
            .saturating_add(self.margin);
        let host_bottom = self.host_top.saturating_add(self.host_height);
        self.host_top < window_bottom && host_bottom > window_top
    }
}

impl VisibilityObserver for ViewportObserver {
    fn observe(&mut self, margin: u32) {
        self.margin = margin;
        self.state = ObserverState::Observing;
    }

    fn on_scroll(&mut self, scroll_top: u32) -> bool {
        if self.state != ObserverState::Observing || !self.within_window(scroll_top) {
            return false;
        }
        self.state = ObserverState::Triggered;
        true
    }

    fn disconnect(&mut self) {
        if self.state == ObserverState::Observing {
            self.state = ObserverState::Unobserved;
        }
    }

    fn state(&self) -> ObserverState {
        self.state
    }
}
