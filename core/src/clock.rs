//! Turn clock. Owns the turn and quarter counters and the boundary rules.

use crate::types::{Quarter, Turn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnClock {
    pub turn:           Turn,
    pub quarter:        Quarter,
    pub quarter_length: u64,
    pub win_quarters:   u64,
}

impl TurnClock {
    pub fn new(quarter_length: u64, win_quarters: u64) -> Self {
        assert!(quarter_length > 0, "quarter_length must be > 0");
        Self { turn: 1, quarter: 1, quarter_length, win_quarters }
    }

    /// Place the clock at an arbitrary point. Used by tests and tooling.
    pub fn at(mut self, turn: Turn, quarter: Quarter) -> Self {
        self.turn = turn;
        self.quarter = quarter;
        self
    }

    /// Advance one turn within the current quarter. Returns the new turn.
    pub fn advance_turn(&mut self) -> Turn {
        self.turn += 1;
        self.turn
    }

    /// Leave a quarter summary: both counters move forward.
    pub fn start_next_quarter(&mut self) -> Quarter {
        self.quarter += 1;
        self.turn += 1;
        self.quarter
    }

    /// True on the last turn of a quarter.
    pub fn is_quarter_end(&self) -> bool {
        self.turn % self.quarter_length == 0
    }

    /// True on the last turn of the final quarter.
    pub fn is_dominance_reached(&self) -> bool {
        self.quarter >= self.win_quarters && self.is_quarter_end()
    }

    /// Turn number after which the current quarter's decisions start.
    pub fn quarter_start_turn(&self) -> Turn {
        (self.quarter - 1) * self.quarter_length
    }

    pub fn quarters_remaining(&self) -> u64 {
        self.win_quarters.saturating_sub(self.quarter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_boundaries_every_fourth_turn() {
        let mut clock = TurnClock::new(4, 12);
        let ends: Vec<Turn> = (0..12)
            .filter_map(|_| {
                let end = clock.is_quarter_end().then_some(clock.turn);
                clock.advance_turn();
                end
            })
            .collect();
        assert_eq!(ends, vec![4, 8, 12]);
    }

    #[test]
    fn dominance_only_on_final_quarter_end() {
        assert!(TurnClock::new(4, 12).at(48, 12).is_dominance_reached());
        assert!(!TurnClock::new(4, 12).at(47, 12).is_dominance_reached());
        assert!(!TurnClock::new(4, 12).at(44, 11).is_dominance_reached());
    }

    #[test]
    fn next_quarter_moves_both_counters() {
        let mut clock = TurnClock::new(4, 12).at(4, 1);
        clock.start_next_quarter();
        assert_eq!((clock.turn, clock.quarter), (5, 2));
        assert_eq!(clock.quarter_start_turn(), 4);
        assert_eq!(clock.quarters_remaining(), 10);
    }
}
