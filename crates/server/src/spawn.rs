//! Spawn and randomization service.
//!
//! Every random draw the simulation makes goes through [`Spawner`], so a
//! seeded spawner makes spawns and wander headings reproducible.

use glam::Vec2;
use protocol::Color;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Random positions, colors and headings for new entities and food.
pub struct Spawner {
    rng: Box<dyn RngCore + Send>,
    world_size: f32,
}

impl std::fmt::Debug for Spawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spawner").field("world_size", &self.world_size).finish_non_exhaustive()
    }
}

impl Spawner {
    /// Spawner backed by any random source.
    pub fn from_rng(rng: Box<dyn RngCore + Send>, world_size: f32) -> Self {
        Self { rng, world_size }
    }

    /// Reproducible spawner.
    pub fn seeded(seed: u64, world_size: f32) -> Self {
        Self::from_rng(Box::new(StdRng::seed_from_u64(seed)), world_size)
    }

    /// Spawner seeded from OS entropy.
    pub fn from_entropy(world_size: f32) -> Self {
        Self::from_rng(Box::new(StdRng::from_os_rng()), world_size)
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn new(seed: Option<u64>, world_size: f32) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed, world_size),
            None => Self::from_entropy(world_size),
        }
    }

    /// Uniform position keeping `margin` away from every edge.
    pub fn position(&mut self, margin: f32) -> Vec2 {
        Vec2::new(self.axis(margin), self.axis(margin))
    }

    /// Uniform position anywhere in the world.
    pub fn food_position(&mut self) -> Vec2 {
        self.position(0.0)
    }

    fn axis(&mut self, margin: f32) -> f32 {
        let lo = margin;
        let hi = self.world_size - margin;
        if lo < hi {
            self.rng.random_range(lo..=hi)
        } else {
            self.world_size / 2.0
        }
    }

    /// Generate a random color.
    pub fn color(&mut self) -> Color {
        Color::new(
            self.rng.random_range(50..=255),
            self.rng.random_range(50..=255),
            self.rng.random_range(50..=255),
        )
    }

    /// Uniform heading in `[0, 2π)`.
    pub fn angle(&mut self) -> f32 {
        self.rng.random_range(0.0..std::f32::consts::TAU)
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}
