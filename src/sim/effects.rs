//! Short-lived visual markers dropped by movement abilities
//!
//! Purely cosmetic. Each marker counts down once per tick and disappears
//! when its counter runs out.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::PLAYER_SIZE;

/// What triggered the marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Jump,
    Dash,
    Teleport,
}

/// Flat RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const JUMP: Rgb = Rgb(224, 255, 255);
    pub const TELEPORT: Rgb = Rgb(96, 80, 242);

    /// Dash trail grey, brighter the more dash frames remain
    pub fn dash_trail(frames_left: u32) -> Rgb {
        let level = frames_left.saturating_mul(5).saturating_add(195).min(255) as u8;
        Rgb(level, level, level)
    }
}

/// How a marker should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Oval,
    Square,
}

/// One live marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    /// Top-left of the player square when the marker was dropped
    pub anchor: IVec2,
    pub remaining: u32,
    pub color: Rgb,
}

impl Effect {
    /// Draw geometry for the marker's current remaining lifetime
    pub fn sprite(&self) -> EffectSprite {
        let (shape, bounds) = match self.kind {
            EffectKind::Jump => {
                // Ring spreading out from under the player's feet
                let grown = (PLAYER_SIZE - self.remaining as i32).max(0);
                (
                    Shape::Oval,
                    Rect::new(
                        self.anchor.x + PLAYER_SIZE / 2 - grown,
                        self.anchor.y + PLAYER_SIZE,
                        2 * grown,
                        grown,
                    ),
                )
            }
            EffectKind::Dash => (Shape::Square, Rect::square_at(self.anchor, PLAYER_SIZE)),
            EffectKind::Teleport => (
                Shape::Oval,
                Rect::square_at(
                    self.anchor - IVec2::splat(PLAYER_SIZE / 2),
                    PLAYER_SIZE * 2,
                ),
            ),
        };
        EffectSprite {
            kind: self.kind,
            shape,
            bounds,
            color: self.color,
        }
    }
}

/// Render-ready view of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSprite {
    pub kind: EffectKind,
    pub shape: Shape,
    pub bounds: Rect,
    pub color: Rgb,
}

/// Request from the movement step to drop a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectEvent {
    pub kind: EffectKind,
    pub at: IVec2,
    pub color: Rgb,
}

impl EffectEvent {
    pub fn jump(at: IVec2) -> Self {
        Self {
            kind: EffectKind::Jump,
            at,
            color: Rgb::JUMP,
        }
    }

    pub fn teleport(at: IVec2) -> Self {
        Self {
            kind: EffectKind::Teleport,
            at,
            color: Rgb::TELEPORT,
        }
    }

    pub fn dash(at: IVec2, frames_left: u32) -> Self {
        Self {
            kind: EffectKind::Dash,
            at,
            color: Rgb::dash_trail(frames_left),
        }
    }
}

/// Owns every live marker, in creation order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectTracker {
    lifetime: u32,
    active: Vec<Effect>,
}

impl EffectTracker {
    pub fn new(lifetime: u32) -> Self {
        Self {
            lifetime: lifetime.max(1),
            active: Vec::new(),
        }
    }

    pub fn spawn(&mut self, event: EffectEvent) {
        self.active.push(Effect {
            kind: event.kind,
            anchor: event.at,
            remaining: self.lifetime,
            color: event.color,
        });
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = EffectEvent>) {
        for event in events {
            self.spawn(event);
        }
    }

    /// Count every marker down one tick, dropping the expired ones
    pub fn tick(&mut self) {
        for effect in &mut self.active {
            effect.remaining = effect.remaining.saturating_sub(1);
        }
        self.active.retain(|e| e.remaining > 0);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn active(&self) -> &[Effect] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn sprites(&self) -> Vec<EffectSprite> {
        self.active.iter().map(Effect::sprite).collect()
    }
}
