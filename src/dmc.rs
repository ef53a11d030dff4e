//! Dynamic Markov Compression state machine (prototype, not a codec).
//!
//! Mirrors the original C++ `DMCompressor` testbed: a binary tree of states
//! grown on demand, each tracking transition counts for bit 0 and bit 1 and
//! the successor state for each. `process_bit` can clone a successor when
//! contention on an edge crosses a threshold, which is how DMC grows new
//! states beyond the two it starts with. No compressed bytes come out of
//! this module; `probability_of_zero()` is what a downstream arithmetic
//! coder would consume.

use log::trace;

const ROOT_ZERO: usize = 0;
const ROOT_ONE: usize = 1;

#[derive(Clone, Copy, Debug)]
struct State {
    count0: f64,
    count1: f64,
    next0: Option<usize>,
    next1: Option<usize>,
}

impl State {
    fn fresh() -> Self {
        Self { count0: 1.0, count1: 1.0, next0: None, next1: None }
    }
}

/// The original's `cloneThreshold` constructor parameter, default `1.05`.
pub struct Dmc {
    states: Vec<State>,
    current: usize,
    clone_threshold: f64,
}

impl Default for Dmc {
    fn default() -> Self {
        Self::new(1.05)
    }
}

impl Dmc {
    pub fn new(clone_threshold: f64) -> Self {
        let mut states = Vec::with_capacity(2);
        states.push(State::fresh());
        states.push(State::fresh());
        Self { states, current: ROOT_ZERO, clone_threshold }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Returns the model to its two-state initial configuration without
    /// shrinking the states vector's allocation.
    pub fn reset(&mut self) {
        self.states.truncate(2);
        self.states[ROOT_ZERO] = State::fresh();
        self.states[ROOT_ONE] = State::fresh();
        self.current = ROOT_ZERO;
    }

    pub fn probability_of_zero(&self) -> f64 {
        let s = &self.states[self.current];
        s.count0 / (s.count0 + s.count1)
    }

    fn successor(&self, bit: bool) -> Option<usize> {
        let s = &self.states[self.current];
        if bit { s.next1 } else { s.next0 }
    }

    fn set_successor(&mut self, bit: bool, to: usize) {
        let s = &mut self.states[self.current];
        if bit {
            s.next1 = Some(to);
        } else {
            s.next0 = Some(to);
        }
    }

    fn edge_count(&self, bit: bool) -> f64 {
        let s = &self.states[self.current];
        if bit { s.count1 } else { s.count0 }
    }

    /// Clones `successor` into a fresh state that takes over `current`'s
    /// edge under `bit`, triggered once the successor's total traffic
    /// outweighs what came through this one edge by `clone_threshold`.
    /// The clone's counts are the successor's counts scaled by the edge's
    /// share of that traffic, then halved; the same amount is subtracted
    /// back out of the successor, since that share of traffic now flows
    /// through the clone instead.
    fn maybe_clone(&mut self, bit: bool, successor: usize) {
        let edge = self.edge_count(bit);
        let succ_total = self.states[successor].count0 + self.states[successor].count1;
        if succ_total <= edge || succ_total / edge < self.clone_threshold {
            return;
        }

        let ratio = edge / succ_total;
        let succ = self.states[successor];
        let moved0 = (succ.count0 * ratio).max(1.0).round();
        let moved1 = (succ.count1 * ratio).max(1.0).round();
        let new_state = State {
            count0: (moved0 / 2.0).max(1.0),
            count1: (moved1 / 2.0).max(1.0),
            next0: succ.next0,
            next1: succ.next1,
        };
        let new_idx = self.states.len();
        self.states.push(new_state);

        let orig = &mut self.states[successor];
        orig.count0 = (orig.count0 - new_state.count0).max(1.0);
        orig.count1 = (orig.count1 - new_state.count1).max(1.0);

        self.set_successor(bit, new_idx);
        trace!("dmc: cloned state {} -> {} on bit {}", successor, new_idx, bit as u8);
    }

    /// Processes one input bit: increments the traversed edge's count,
    /// clones the successor if the contention ratio warrants it, and walks
    /// to (or creates) the successor state.
    pub fn process_bit(&mut self, bit: bool) {
        {
            let s = &mut self.states[self.current];
            if bit {
                s.count1 += 1.0;
            } else {
                s.count0 += 1.0;
            }
        }

        match self.successor(bit) {
            Some(next) => {
                self.maybe_clone(bit, next);
                self.current = self.successor(bit).unwrap();
            }
            None => {
                let new_idx = self.states.len();
                self.states.push(State::fresh());
                self.set_successor(bit, new_idx);
                self.current = new_idx;
            }
        }
    }

    pub fn process_byte(&mut self, byte: u8) {
        for i in (0..8).rev() {
            self.process_bit((byte >> i) & 1 == 1);
        }
    }
}
