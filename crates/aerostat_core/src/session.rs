//! # Session State
//!
//! The preloader's animation flags, as one-way latches.
//!
//! Every transition happens at most once: there is no "un-reveal" and no
//! resume after stop. Transition methods return `true` only for the call
//! that actually flipped the latch, so one-shot side effects (showing the
//! enter button, spawning flames) hang off that return value.

/// A boolean that can only go from unset to set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latch(bool);

impl Latch {
    /// Sets the latch. Returns true if it was previously unset.
    #[inline]
    pub fn set(&mut self) -> bool {
        !std::mem::replace(&mut self.0, true)
    }

    /// Returns true once set.
    #[inline]
    #[must_use]
    pub const fn is_set(self) -> bool {
        self.0
    }
}

/// Session-wide animation state for one preloader run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationSessionState {
    revealed: Latch,
    entered: Latch,
    text_dissipating: Latch,
    stopped: Latch,
}

impl AnimationSessionState {
    /// Fresh session: nothing revealed, running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveals the burner and the enter button.
    pub fn reveal(&mut self) -> bool {
        let changed = self.revealed.set();
        if changed {
            tracing::debug!("session: revealed");
        }
        changed
    }

    /// Records the enter interaction.
    pub fn enter(&mut self) -> bool {
        let changed = self.entered.set();
        if changed {
            tracing::debug!("session: entered");
        }
        changed
    }

    /// Starts the cloud-text fade out.
    pub fn dissipate_text(&mut self) -> bool {
        let changed = self.text_dissipating.set();
        if changed {
            tracing::debug!("session: text dissipating");
        }
        changed
    }

    /// Halts the frame scheduler permanently.
    pub fn stop(&mut self) -> bool {
        let changed = self.stopped.set();
        if changed {
            tracing::debug!("session: stopped");
        }
        changed
    }

    /// True after [`Self::reveal`].
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed.is_set()
    }

    /// True after [`Self::enter`].
    #[must_use]
    pub const fn is_entered(&self) -> bool {
        self.entered.is_set()
    }

    /// True after [`Self::dissipate_text`].
    #[must_use]
    pub const fn is_text_dissipating(&self) -> bool {
        self.text_dissipating.is_set()
    }

    /// True after [`Self::stop`].
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_sets_once() {
        let mut latch = Latch::default();
        assert!(!latch.is_set());
        assert!(latch.set());
        assert!(!latch.set());
        assert!(latch.is_set());
    }

    #[test]
    fn test_session_transitions_are_one_way() {
        let mut session = AnimationSessionState::new();
        assert!(session.reveal());
        assert!(!session.reveal());
        assert!(session.is_revealed());

        assert!(session.stop());
        assert!(!session.stop());
        assert!(session.is_stopped());
        assert!(!session.is_entered());
        assert!(!session.is_text_dissipating());
    }
}
