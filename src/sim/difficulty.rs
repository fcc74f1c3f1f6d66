//! Speed ramp and biome rotation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Rgb;
use crate::settings::Tuning;

/// Cosmetic environment theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Forest,
    Desert,
    Lakeside,
    Beach,
}

impl Biome {
    pub const ALL: [Biome; 4] = [Biome::Forest, Biome::Desert, Biome::Lakeside, Biome::Beach];

    pub fn as_str(&self) -> &'static str {
        match self {
            Biome::Forest => "forest",
            Biome::Desert => "desert",
            Biome::Lakeside => "lakeside",
            Biome::Beach => "beach",
        }
    }

    /// Shoulder colors as (far side, near side)
    pub fn shoulder_colors(&self) -> (Rgb, Rgb) {
        const GRASS: Rgb = Rgb(34, 139, 34);
        match self {
            Biome::Forest => (GRASS, GRASS),
            Biome::Desert => (Rgb(210, 180, 140), Rgb(210, 180, 140)),
            Biome::Lakeside => (Rgb(0, 191, 255), GRASS),
            Biome::Beach => (Rgb(238, 221, 130), Rgb(238, 221, 130)),
        }
    }

    /// Uniform pick from every biome except `current`
    pub fn random_other<R: Rng + ?Sized>(rng: &mut R, current: Biome) -> Biome {
        let others: Vec<Biome> = Self::ALL.into_iter().filter(|b| *b != current).collect();
        others[rng.random_range(0..others.len())]
    }
}

/// Score-driven speed ramp and periodic biome rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyController {
    speed: f32,
    biome: Biome,
    base_speed: f32,
    increment: f32,
    max_speed: f32,
    milestone: u32,
    biome_period: u32,
}

impl DifficultyController {
    pub fn new(tuning: &Tuning, biome: Biome) -> Self {
        Self {
            speed: tuning.base_speed,
            biome,
            base_speed: tuning.base_speed,
            increment: tuning.speed_increment,
            max_speed: tuning.max_speed,
            milestone: tuning.milestone,
            biome_period: tuning.biome_period,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn biome(&self) -> Biome {
        self.biome
    }

    /// Back to base speed with a different biome
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.speed = self.base_speed;
        self.biome = Biome::random_other(rng, self.biome);
    }

    /// React to the score having just changed. Returns the new speed if it rose.
    pub fn on_score(&mut self, score: u32) -> Option<f32> {
        if score == 0 || !score.is_multiple_of(self.milestone) {
            return None;
        }
        let before = self.speed;
        self.speed = (self.speed + self.increment).min(self.max_speed);
        (self.speed > before).then_some(self.speed)
    }

    /// Per-tick upkeep. Returns the new biome on a rotation tick.
    pub fn tick<R: Rng + ?Sized>(&mut self, tick: u64, rng: &mut R) -> Option<Biome> {
        self.speed = self.speed.min(self.max_speed);

        if tick > 0 && tick.is_multiple_of(self.biome_period as u64) {
            self.biome = Biome::random_other(rng, self.biome);
            Some(self.biome)
        } else {
            None
        }
    }
}
