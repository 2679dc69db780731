//! Table-driven line-following state machine.
//!
//! A Mealy-style machine stored as an arena of [`StateRecord`]s; transitions
//! are indices into the same arena. Each record carries the output code and
//! dwell time applied while the robot is *in* that state, plus one successor
//! per quantized [`LineInput`].
//!
//! ## Canonical table
//!
//! ```text
//!  #  state      out  dwell  lost       drift-R    drift-L    on-line
//!  0  Center      3   500    Center     Right1     Left1      Center
//!  1  Left1       2   500    LeftOff1   Right1     Left2      Center
//!  2  Left2       3   500    LeftOff1   Right1     Left1      Center
//!  3  LeftOff1    2   500    LeftOff2   LeftOff2   LeftOff2   LeftOff2
//!  4  LeftOff2    3   500    LeftStop   Right1     Left1      Center
//!  5  LeftStop    0     0    LeftStop   LeftStop   LeftStop   Center
//!  6  Right1      1   500    RightOff1  Right2     Left1      Center
//!  7  Right2      3   500    RightOff1  Right1     Left1      Center
//!  8  RightOff1   1   500    RightOff2  RightOff2  RightOff2  RightOff2
//!  9  RightOff2   3   500    RightStop  Right1     Left1      Center
//! 10  RightStop   0     0    RightStop  RightStop  RightStop  Center
//! ```
//!
//! Losing the line walks `Off1 → Off2 → Stop`: `Off1` advances on every
//! input, so the robot commits to one more corrective move before
//! re-checking. From `Stop`, only a centered reading resumes.

use std::path::Path;
use std::sync::Arc;

use rover_common::config::{ConfigError, ConfigLoader};
use rover_common::consts::{LINE_DWELL_MS, LINE_INPUT_COUNT, MAX_LINE_STATES, STEP_MS_MAX};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

use crate::sensor::quantizer::LineInput;

// ─── Identifiers & Outputs ──────────────────────────────────────────

/// Index of a state in its [`TransitionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u8);

impl StateId {
    pub const CENTER: Self = Self(0);
    pub const LEFT1: Self = Self(1);
    pub const LEFT2: Self = Self(2);
    pub const LEFT_OFF1: Self = Self(3);
    pub const LEFT_OFF2: Self = Self(4);
    pub const LEFT_STOP: Self = Self(5);
    pub const RIGHT1: Self = Self(6);
    pub const RIGHT2: Self = Self(7);
    pub const RIGHT_OFF1: Self = Self(8);
    pub const RIGHT_OFF2: Self = Self(9);
    pub const RIGHT_STOP: Self = Self(10);

    /// Initial state of every table.
    pub const INITIAL: Self = Self(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// 2-bit steering code produced by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum OutputCode {
    Stop = 0,
    TurnLeft = 1,
    TurnRight = 2,
    Straight = 3,
}

impl OutputCode {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn mirrored(self) -> Self {
        match self {
            Self::TurnLeft => Self::TurnRight,
            Self::TurnRight => Self::TurnLeft,
            other => other,
        }
    }
}

// ─── Records ────────────────────────────────────────────────────────

/// One state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRecord {
    pub output: OutputCode,
    /// Time to hold the output before sampling again [ms]. 0 = terminal.
    pub dwell_ms: u32,
    /// Successor for each [`LineInput`], indexed by its code.
    pub next: [StateId; LINE_INPUT_COUNT],
}

impl StateRecord {
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        self.dwell_ms == 0
    }
}

const fn record(output: OutputCode, dwell_ms: u32, next: [StateId; LINE_INPUT_COUNT]) -> StateRecord {
    StateRecord {
        output,
        dwell_ms,
        next,
    }
}

const CANONICAL_NAMES: [&str; 11] = [
    "Center", "Left1", "Left2", "LeftOff1", "LeftOff2", "LeftStop", "Right1", "Right2",
    "RightOff1", "RightOff2", "RightStop",
];

const CANONICAL_RECORDS: [StateRecord; 11] = {
    use OutputCode::*;
    use StateId as S;
    const D: u32 = LINE_DWELL_MS;
    [
        record(Straight, D, [S::CENTER, S::RIGHT1, S::LEFT1, S::CENTER]),
        record(TurnRight, D, [S::LEFT_OFF1, S::RIGHT1, S::LEFT2, S::CENTER]),
        record(Straight, D, [S::LEFT_OFF1, S::RIGHT1, S::LEFT1, S::CENTER]),
        record(TurnRight, D, [S::LEFT_OFF2, S::LEFT_OFF2, S::LEFT_OFF2, S::LEFT_OFF2]),
        record(Straight, D, [S::LEFT_STOP, S::RIGHT1, S::LEFT1, S::CENTER]),
        record(Stop, 0, [S::LEFT_STOP, S::LEFT_STOP, S::LEFT_STOP, S::CENTER]),
        record(TurnLeft, D, [S::RIGHT_OFF1, S::RIGHT2, S::LEFT1, S::CENTER]),
        record(Straight, D, [S::RIGHT_OFF1, S::RIGHT1, S::LEFT1, S::CENTER]),
        record(TurnLeft, D, [S::RIGHT_OFF2, S::RIGHT_OFF2, S::RIGHT_OFF2, S::RIGHT_OFF2]),
        record(Straight, D, [S::RIGHT_STOP, S::RIGHT1, S::LEFT1, S::CENTER]),
        record(Stop, 0, [S::RIGHT_STOP, S::RIGHT_STOP, S::RIGHT_STOP, S::CENTER]),
    ]
};

/// Every transition lands inside the table and terminal states stop.
const fn records_are_well_formed(records: &[StateRecord]) -> bool {
    let mut i = 0;
    while i < records.len() {
        let r = &records[i];
        let mut j = 0;
        while j < LINE_INPUT_COUNT {
            if r.next[j].index() >= records.len() {
                return false;
            }
            j += 1;
        }
        if r.dwell_ms == 0 && !matches!(r.output, OutputCode::Stop) {
            return false;
        }
        i += 1;
    }
    true
}

const_assert!(CANONICAL_RECORDS.len() == CANONICAL_NAMES.len());
const_assert!(CANONICAL_RECORDS.len() <= MAX_LINE_STATES);
const_assert!(records_are_well_formed(&CANONICAL_RECORDS));

// ─── Table Errors ───────────────────────────────────────────────────

/// Rejections when building a table from a [`TableSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table has no states")]
    Empty,

    #[error("table has {0} states, limit is {limit}", limit = MAX_LINE_STATES)]
    TooManyStates(usize),

    #[error("duplicate state name '{0}'")]
    DuplicateName(String),

    #[error("state '{state}' transitions to unknown state '{target}'")]
    UnknownTarget { state: String, target: String },

    #[error("terminal state '{0}' must output stop")]
    TerminalNotStopped(String),

    #[error("state '{state}' dwell {dwell_ms}ms exceeds {limit}ms", limit = STEP_MS_MAX)]
    DwellTooLong { state: String, dwell_ms: u32 },
}

// ─── Serializable Form ──────────────────────────────────────────────

/// One state in serialized form; successors are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSpec {
    pub name: String,
    pub output: OutputCode,
    pub dwell_ms: u32,
    /// Successors for inputs `[lost, drift_right, drift_left, on_line]`.
    pub next: [String; LINE_INPUT_COUNT],
}

/// Serialized transition table. The first state is the initial state.
///
/// ```toml
/// [[state]]
/// name = "Center"
/// output = "straight"
/// dwell_ms = 500
/// next = ["Center", "Right1", "Left1", "Center"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub state: Vec<StateSpec>,
}

impl TableSpec {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        <Self as ConfigLoader>::load(path)
    }
}

// ─── Transition Table ───────────────────────────────────────────────

/// Validated, immutable transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    records: Vec<StateRecord>,
    names: Vec<String>,
}

/// Result of one machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// State entered.
    pub state: StateId,
    pub output: OutputCode,
    pub dwell_ms: u32,
}

impl TransitionTable {
    /// The eleven-state line follower.
    pub fn canonical() -> Self {
        Self {
            records: CANONICAL_RECORDS.to_vec(),
            names: CANONICAL_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Build from a serialized table, resolving successor names.
    pub fn from_spec(spec: &TableSpec) -> Result<Self, TableError> {
        let states = &spec.state;
        if states.is_empty() {
            return Err(TableError::Empty);
        }
        if states.len() > MAX_LINE_STATES {
            return Err(TableError::TooManyStates(states.len()));
        }

        let names: Vec<String> = states.iter().map(|s| s.name.clone()).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(TableError::DuplicateName(name.clone()));
            }
        }

        let lookup = |state: &str, target: &str| -> Result<StateId, TableError> {
            names
                .iter()
                .position(|n| n == target)
                .map(|i| StateId(i as u8))
                .ok_or_else(|| TableError::UnknownTarget {
                    state: state.to_string(),
                    target: target.to_string(),
                })
        };

        let mut records = Vec::with_capacity(states.len());
        for s in states {
            if s.dwell_ms == 0 && s.output != OutputCode::Stop {
                return Err(TableError::TerminalNotStopped(s.name.clone()));
            }
            if s.dwell_ms > STEP_MS_MAX {
                return Err(TableError::DwellTooLong {
                    state: s.name.clone(),
                    dwell_ms: s.dwell_ms,
                });
            }
            let mut next = [StateId::INITIAL; LINE_INPUT_COUNT];
            for (slot, target) in next.iter_mut().zip(&s.next) {
                *slot = lookup(&s.name, target)?;
            }
            records.push(record(s.output, s.dwell_ms, next));
        }

        Ok(Self { records, names })
    }

    pub fn to_spec(&self) -> TableSpec {
        TableSpec {
            state: self
                .records
                .iter()
                .zip(&self.names)
                .map(|(r, name)| StateSpec {
                    name: name.clone(),
                    output: r.output,
                    dwell_ms: r.dwell_ms,
                    next: r.next.map(|id| self.names[id.index()].clone()),
                })
                .collect(),
        }
    }

    /// Transition function. `current` must come from this table.
    #[inline]
    pub fn step(&self, current: StateId, input: LineInput) -> Step {
        let state = self.records[current.index()].next[input.index()];
        let entered = &self.records[state.index()];
        Step {
            state,
            output: entered.output,
            dwell_ms: entered.dwell_ms,
        }
    }

    #[inline]
    pub fn record(&self, id: StateId) -> &StateRecord {
        &self.records[id.index()]
    }

    pub fn name(&self, id: StateId) -> &str {
        &self.names[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<StateId> {
        self.names.iter().position(|n| n == name).map(|i| StateId(i as u8))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.records.len()).map(|i| StateId(i as u8))
    }

    /// Counterpart of `id` with "Left" and "Right" exchanged in its name.
    pub fn mirror(&self, id: StateId) -> Option<StateId> {
        let mirrored: String = self
            .name(id)
            .replace("Left", "\u{0}")
            .replace("Right", "Left")
            .replace('\u{0}', "Right");
        self.find(&mirrored)
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::canonical()
    }
}

// ─── Cursor ─────────────────────────────────────────────────────────

/// Current position in a shared table. Owned by the foreground loop.
#[derive(Debug, Clone)]
pub struct LineFollower {
    table: Arc<TransitionTable>,
    current: StateId,
}

impl LineFollower {
    pub fn new(table: Arc<TransitionTable>) -> Self {
        Self {
            table,
            current: StateId::INITIAL,
        }
    }

    /// Advance on one quantized reading.
    #[inline]
    pub fn step(&mut self, input: LineInput) -> Step {
        let step = self.table.step(self.current, input);
        self.current = step.state;
        step
    }

    #[inline]
    pub const fn state(&self) -> StateId {
        self.current
    }

    pub fn state_name(&self) -> &str {
        self.table.name(self.current)
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn reset(&mut self) {
        self.current = StateId::INITIAL;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
