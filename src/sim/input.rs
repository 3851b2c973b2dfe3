//! Keyboard state as seen by the simulation
//!
//! The host only answers "is this key held right now". Press/release edges
//! are derived here by comparing consecutive snapshots.

use serde::{Deserialize, Serialize};

/// Named keys the simulation reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Dash,
    Attack,
    /// Held modifier for the speed/jump/slow-fall boosts
    Boost,
    Reset,
    Pause,
    Confirm,
    Back,
}

impl Key {
    pub const ALL: [Key; 12] = [
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Jump,
        Key::Dash,
        Key::Attack,
        Key::Boost,
        Key::Reset,
        Key::Pause,
        Key::Confirm,
        Key::Back,
    ];

    #[inline]
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Anything that can report held keys
pub trait InputSource {
    fn is_held(&self, key: Key) -> bool;
}

/// Snapshot of held keys for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeldKeys(u16);

impl HeldKeys {
    pub const NONE: HeldKeys = HeldKeys(0);

    pub fn from_keys(keys: &[Key]) -> Self {
        keys.iter().fold(Self::NONE, |held, &key| held.with(key))
    }

    /// Capture the current state of an input source
    pub fn capture(source: &impl InputSource) -> Self {
        Key::ALL
            .iter()
            .filter(|&&key| source.is_held(key))
            .fold(Self::NONE, |held, &key| held.with(key))
    }

    #[must_use]
    pub fn with(self, key: Key) -> Self {
        Self(self.0 | key.bit())
    }
}

impl InputSource for HeldKeys {
    #[inline]
    fn is_held(&self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }
}

/// One key's state across two consecutive ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEdge {
    pub held: bool,
    pub pressed: bool,
    pub released: bool,
}

/// Press/release view of the current tick against the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEdges {
    current: HeldKeys,
    previous: HeldKeys,
}

impl KeyEdges {
    pub fn key(&self, key: Key) -> KeyEdge {
        let now = self.current.is_held(key);
        let before = self.previous.is_held(key);
        KeyEdge {
            held: now,
            pressed: now && !before,
            released: !now && before,
        }
    }

    #[inline]
    pub fn held(&self, key: Key) -> bool {
        self.current.is_held(key)
    }

    #[inline]
    pub fn pressed(&self, key: Key) -> bool {
        self.key(key).pressed
    }

    #[inline]
    pub fn released(&self, key: Key) -> bool {
        self.key(key).released
    }

    /// Net horizontal tilt: -1 left, +1 right
    pub fn horizontal_tilt(&self) -> i32 {
        crate::tilt(self.held(Key::Left), self.held(Key::Right))
    }

    /// Net vertical tilt: +1 up, -1 down
    pub fn vertical_tilt(&self) -> i32 {
        crate::tilt(self.held(Key::Down), self.held(Key::Up))
    }
}

/// Remembers last tick's snapshot so edges can be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeDetector {
    latched: HeldKeys,
}

impl EdgeDetector {
    /// Compare against the previous snapshot and latch the new one
    pub fn advance(&mut self, current: HeldKeys) -> KeyEdges {
        let edges = KeyEdges {
            current,
            previous: self.latched,
        };
        self.latched = current;
        edges
    }
}
