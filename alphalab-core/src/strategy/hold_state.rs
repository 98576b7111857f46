//! Two-state entry/exit machine for reversion-style strategies.
//!
//! Reversion rules are inherently stateful: the entry condition (oversold)
//! and the exit condition (recovered) differ, and between them the position
//! is held. `HoldState` walks the bars once and emits 0/1 exposures.

/// Flat-or-holding position state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Flat,
    Holding,
}

impl HoldState {
    /// Advance one bar. `enter` and `exit` are the per-bar trigger
    /// conditions; the returned exposure reflects the state AFTER the
    /// transition, so an entry bar is already long.
    pub fn step(&mut self, enter: bool, exit: bool) -> f64 {
        match self {
            HoldState::Flat if enter => {
                *self = HoldState::Holding;
                1.0
            }
            HoldState::Holding if exit => {
                *self = HoldState::Flat;
                0.0
            }
            HoldState::Flat => 0.0,
            HoldState::Holding => 1.0,
        }
    }

    /// Run the machine over paired trigger streams.
    pub fn run(triggers: impl Iterator<Item = (bool, bool)>) -> Vec<f64> {
        let mut state = HoldState::Flat;
        triggers
            .map(|(enter, exit)| state.step(enter, exit))
            .collect()
    }
}
