//! Axis-aligned collision detection and solid-overlap resolution
//!
//! Two predicates drive all gameplay tests: a strict open-interval overlap
//! for hit/blocking checks and a 2px-padded variant used only for hazard
//! (spike) contact, so an entity resting exactly on a spike still takes
//! damage. `resolve_solid` implements the landed/ceiling/wall three-way
//! response against immovable geometry.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CEILING_TOLERANCE, LANDING_TOLERANCE};

/// Padding applied on every side by [`Rect::touches`]
const TOUCH_PAD: f32 = 2.0;

/// An axis-aligned rectangle, top-left origin, y grows downward
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict open-interval overlap on both axes
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Overlap padded by 2 units on every side; spike contact only
    pub fn touches(&self, other: &Rect) -> bool {
        self.x < other.x + other.w + TOUCH_PAD
            && self.x + self.w > other.x - TOUCH_PAD
            && self.y < other.y + other.h + TOUCH_PAD
            && self.y + self.h > other.y - TOUCH_PAD
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Rect grown by `pad` on every side (blast areas)
    pub fn expanded(&self, pad: f32) -> Rect {
        Rect::new(self.x - pad, self.y - pad, self.w + pad * 2.0, self.h + pad * 2.0)
    }
}

/// How an overlap against solid geometry was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Came to rest on top of the solid
    Landed,
    /// Bonked the underside
    Ceiling,
    /// Pushed out horizontally
    Wall,
}

/// Resolve an overlap between a moving rect and an immovable solid.
///
/// Must only be called when `rect.overlaps(solid)` already holds. The
/// previous vertical position (reconstructed from velocity) decides whether
/// this was a landing, a ceiling hit, or a side collision; position and
/// velocity are snapped accordingly.
pub fn resolve_solid(rect: &mut Rect, vel: &mut Vec2, solid: &Rect) -> Contact {
    let prev_y = rect.y - vel.y;
    let was_above = prev_y + rect.h <= solid.y + LANDING_TOLERANCE;
    let was_below = prev_y >= solid.y + solid.h - CEILING_TOLERANCE;

    if was_above && vel.y >= 0.0 {
        rect.y = solid.y - rect.h;
        vel.y = 0.0;
        Contact::Landed
    } else if was_below && vel.y < 0.0 {
        rect.y = solid.y + solid.h;
        vel.y = 0.0;
        Contact::Ceiling
    } else {
        if vel.x > 0.0 {
            rect.x = solid.x - rect.w;
        } else if vel.x < 0.0 {
            rect.x = solid.x + solid.w;
        }
        vel.x = 0.0;
        Contact::Wall
    }
}
