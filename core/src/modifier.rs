//! Keyboard layer state: shift, caps lock, number and symbol rows.
//!
//! A single shift tap produces a transient [`ModifierState::JustShift`]; with
//! no further key activity for a short delay it latches into
//! [`ModifierState::Shift`], a second tap makes it caps lock, and any other
//! key drops back to normal. This mirrors standard mobile keyboard shift
//! behavior: tap for one capital, tap-and-pause for latched shift, double
//! tap for caps lock.
//!
//! The delay is modeled as a token-stamped one-shot the host schedules.
//! Entering `JustShift` yields a [`TimerRequest`]; the host delivers
//! [`ModifierEvent::ShiftDelayElapsed`] with that token when it fires. A
//! token that is no longer pending is ignored, so canceling is simply
//! invalidation: any key activity before the timer fires unarms it and a
//! late callback cannot flip the state.

use std::time::Duration;

/// Which row-of-keys layout the keyboard surface should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierState {
    Normal,
    /// Shift tapped once; will latch into `Shift` after the delay.
    JustShift,
    Shift,
    CapsLock,
    Number,
    Symbol,
}

/// Identifies one scheduled shift-delay callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

/// Ask the host to deliver `ShiftDelayElapsed(token)` after `after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub token: TimerToken,
    pub after: Duration,
}

/// Events driving the layer FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierEvent {
    TapShift,
    TapNum,
    /// Any key other than the shift/number mode keys.
    TapAnyKey,
    /// The one-shot scheduled by an earlier [`TimerRequest`] fired.
    ShiftDelayElapsed(TimerToken),
}

/// The layer FSM. One instance per active keyboard surface.
pub struct ModifierKeyFsm {
    state: ModifierState,
    delay: Duration,
    pending: Option<TimerToken>,
    next_token: u64,
}

impl ModifierKeyFsm {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: ModifierState::Normal,
            delay,
            pending: None,
            next_token: 0,
        }
    }

    pub fn state(&self) -> ModifierState {
        self.state
    }

    /// Apply one event. Pairs outside the transition table leave the state
    /// unchanged. Returns a timer request when the host should schedule the
    /// shift-delay one-shot.
    pub fn handle(&mut self, event: ModifierEvent) -> Option<TimerRequest> {
        use ModifierEvent::*;
        use ModifierState::*;

        match (self.state, event) {
            (Normal, TapShift) => {
                self.state = JustShift;
                return Some(self.arm());
            }
            (Normal, TapNum) => self.state = Number,
            (JustShift, TapNum) => {
                self.disarm();
                self.state = Number;
            }
            (JustShift, TapShift) => {
                self.disarm();
                self.state = CapsLock;
            }
            (JustShift, ShiftDelayElapsed(token)) if self.pending == Some(token) => {
                self.pending = None;
                self.state = Shift;
            }
            (JustShift, TapAnyKey) => {
                self.disarm();
                self.state = Normal;
            }
            (Shift, TapShift) => self.state = Normal,
            (Shift, TapNum) => self.state = Number,
            (Shift, TapAnyKey) => self.state = Normal,
            (CapsLock, TapShift) => self.state = Normal,
            (CapsLock, TapNum) => self.state = Number,
            (Number, TapNum) => self.state = Normal,
            (Number, TapShift) => self.state = Symbol,
            (Symbol, TapShift) => self.state = Number,
            (Symbol, TapNum) => self.state = Normal,
            _ => {}
        }
        None
    }

    fn arm(&mut self) -> TimerRequest {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.pending = Some(token);
        TimerRequest {
            token,
            after: self.delay,
        }
    }

    fn disarm(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ModifierEvent::*;
    use ModifierState::*;

    const DELAY: Duration = Duration::from_millis(500);

    fn fsm() -> ModifierKeyFsm {
        ModifierKeyFsm::new(DELAY)
    }

    /// Drive the fsm into an arbitrary state without leaving a live timer,
    /// except for JustShift whose request is returned.
    fn enter(fsm: &mut ModifierKeyFsm, state: ModifierState) -> Option<TimerRequest> {
        match state {
            Normal => None,
            JustShift => fsm.handle(TapShift),
            Shift => {
                let req = fsm.handle(TapShift).unwrap();
                fsm.handle(ShiftDelayElapsed(req.token));
                None
            }
            CapsLock => {
                fsm.handle(TapShift);
                fsm.handle(TapShift);
                None
            }
            Number => {
                fsm.handle(TapNum);
                None
            }
            Symbol => {
                fsm.handle(TapNum);
                fsm.handle(TapShift);
                None
            }
        }
    }

    #[test]
    fn single_tap_then_delay_latches_shift() {
        let mut m = fsm();
        let req = m.handle(TapShift).expect("entering JustShift arms a timer");
        assert_eq!(m.state(), JustShift);
        assert_eq!(req.after, DELAY);
        m.handle(ShiftDelayElapsed(req.token));
        assert_eq!(m.state(), Shift);
    }

    #[test]
    fn double_tap_is_caps_lock() {
        let mut m = fsm();
        m.handle(TapShift);
        m.handle(TapShift);
        assert_eq!(m.state(), CapsLock);
    }

    #[test]
    fn key_activity_cancels_the_latch() {
        let mut m = fsm();
        let req = m.handle(TapShift).unwrap();
        m.handle(TapAnyKey);
        assert_eq!(m.state(), Normal);
        // The late callback must not flip the state
        m.handle(ShiftDelayElapsed(req.token));
        assert_eq!(m.state(), Normal);
    }

    #[test]
    fn stale_token_does_not_latch_a_new_just_shift() {
        let mut m = fsm();
        let first = m.handle(TapShift).unwrap();
        m.handle(TapAnyKey);
        // Tap shift again: a fresh token is pending now
        let second = m.handle(TapShift).unwrap();
        assert_ne!(first.token, second.token);
        m.handle(ShiftDelayElapsed(first.token));
        assert_eq!(m.state(), JustShift);
        m.handle(ShiftDelayElapsed(second.token));
        assert_eq!(m.state(), Shift);
    }

    #[test]
    fn number_and_symbol_cycle() {
        let mut m = fsm();
        m.handle(TapNum);
        assert_eq!(m.state(), Number);
        m.handle(TapShift);
        assert_eq!(m.state(), Symbol);
        m.handle(TapShift);
        assert_eq!(m.state(), Number);
        m.handle(TapNum);
        assert_eq!(m.state(), Normal);
    }

    #[test]
    fn symbol_tap_num_returns_to_normal() {
        let mut m = fsm();
        m.handle(TapNum);
        m.handle(TapShift);
        m.handle(TapNum);
        assert_eq!(m.state(), Normal);
    }

    #[test]
    fn shift_exits() {
        let mut m = fsm();
        enter(&mut m, Shift);
        m.handle(TapShift);
        assert_eq!(m.state(), Normal);

        let mut m = fsm();
        enter(&mut m, Shift);
        m.handle(TapAnyKey);
        assert_eq!(m.state(), Normal);

        let mut m = fsm();
        enter(&mut m, Shift);
        m.handle(TapNum);
        assert_eq!(m.state(), Number);
    }

    #[test]
    fn caps_lock_ignores_other_keys() {
        let mut m = fsm();
        enter(&mut m, CapsLock);
        m.handle(TapAnyKey);
        assert_eq!(m.state(), CapsLock);
        m.handle(TapShift);
        assert_eq!(m.state(), Normal);
    }

    #[test]
    fn unlisted_pairs_are_noops() {
        // Every (state, event) pair not in the transition table leaves the
        // state unchanged; a fresh token is never pending in these states so
        // the delayed event is inert everywhere but JustShift.
        let all_states = [Normal, JustShift, Shift, CapsLock, Number, Symbol];
        let listed: &[(ModifierState, ModifierEvent)] = &[
            (Normal, TapShift),
            (Normal, TapNum),
            (JustShift, TapNum),
            (JustShift, TapShift),
            (JustShift, TapAnyKey),
            (Shift, TapShift),
            (Shift, TapNum),
            (Shift, TapAnyKey),
            (CapsLock, TapShift),
            (CapsLock, TapNum),
            (Number, TapNum),
            (Number, TapShift),
            (Symbol, TapShift),
            (Symbol, TapNum),
        ];

        for state in all_states {
            let delayed_in_just_shift = state == JustShift;
            let events = [TapShift, TapNum, TapAnyKey];
            for event in events {
                if listed.contains(&(state, event)) {
                    continue;
                }
                let mut m = fsm();
                enter(&mut m, state);
                m.handle(event);
                assert_eq!(m.state(), state, "{state:?} + {event:?} must be a no-op");
            }
            // A delayed event only acts in JustShift with a live token
            let mut m = fsm();
            let req = enter(&mut m, state);
            if !delayed_in_just_shift {
                m.handle(ShiftDelayElapsed(TimerToken(999)));
                assert_eq!(m.state(), state, "{state:?} + stale delay must be a no-op");
            } else {
                let req = req.unwrap();
                m.handle(ShiftDelayElapsed(TimerToken(req.token.0 + 1)));
                assert_eq!(m.state(), JustShift, "mismatched token must be a no-op");
            }
        }
    }
}
