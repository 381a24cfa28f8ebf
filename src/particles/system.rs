use crate::foundation::core::Point;
use crate::scene::color::Color;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Particle tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleOpts {
    /// Particles spawned per beat tick (capped by remaining headroom).
    pub batch: usize,
    /// Per-tick radius multiplier.
    pub decay: f64,
    /// Initial speed range in canonical pixels per tick, before `particleSpeed`.
    pub speed: (f64, f64),
    /// Initial radius range in canonical pixels.
    pub radius: (f64, f64),
    /// Lifetime range in ticks.
    pub life: (u32, u32),
}

impl Default for ParticleOpts {
    fn default() -> Self {
        Self {
            batch: 3,
            decay: 0.98,
            speed: (2.0, 6.0),
            radius: (2.0, 6.0),
            life: (40, 100),
        }
    }
}

/// One beat particle, in canonical (1920x1080) coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Position.
    pub x: f64,
    /// Position.
    pub y: f64,
    /// Velocity per tick.
    pub vx: f64,
    /// Velocity per tick.
    pub vy: f64,
    /// Radius.
    pub radius: f64,
    /// Fill color.
    pub color: Color,
    /// Ticks remaining.
    pub life: i32,
    /// Initial lifetime.
    pub max_life: i32,
}

impl Particle {
    /// Draw opacity, `life / max_life` clamped to 0..1.
    pub fn opacity(&self) -> f64 {
        if self.max_life <= 0 {
            return 0.0;
        }
        (f64::from(self.life) / f64::from(self.max_life)).clamp(0.0, 1.0)
    }
}

/// Per-spawn parameters read from the scene for this tick.
#[derive(Clone, Copy, Debug)]
pub struct SpawnParams {
    /// Population cap.
    pub cap: usize,
    /// Speed multiplier.
    pub speed: f64,
    /// Spawn origin in canonical coordinates.
    pub origin: Point,
    /// Primary palette color.
    pub primary: Color,
    /// Secondary palette color.
    pub secondary: Color,
    /// Pick a random hue per particle.
    pub rainbow: bool,
}

/// Owner of the particle population.
#[derive(Debug)]
pub struct ParticleSystem {
    opts: ParticleOpts,
    rng: StdRng,
    particles: Vec<Particle>,
    spawned_total: u64,
}

impl ParticleSystem {
    /// Create a system with a fixed seed.
    pub fn new(opts: ParticleOpts, seed: u64) -> Self {
        Self::with_rng(opts, StdRng::seed_from_u64(seed))
    }

    /// Create a system with an explicit random source.
    pub fn with_rng(opts: ParticleOpts, rng: StdRng) -> Self {
        Self {
            opts,
            rng,
            particles: Vec::new(),
            spawned_total: 0,
        }
    }

    /// Live particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Live population.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// No live particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles spawned since construction.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Drop the whole population (used on seek).
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Spawn a batch if the population is under the cap. Returns how many were spawned.
    pub fn spawn(&mut self, p: &SpawnParams) -> usize {
        let headroom = p.cap.saturating_sub(self.particles.len());
        let n = self.opts.batch.min(headroom);
        for _ in 0..n {
            let angle = self.rng.random_range(0.0..std::f64::consts::TAU);
            let speed = sample(&mut self.rng, self.opts.speed) * p.speed;
            let radius = sample(&mut self.rng, self.opts.radius);
            let (lo, hi) = self.opts.life;
            let life = if hi > lo {
                self.rng.random_range(lo..=hi)
            } else {
                lo
            };
            let life = i32::try_from(life.max(1)).unwrap_or(i32::MAX);

            let color = if p.rainbow {
                Color::hsl(self.rng.random_range(0.0..360.0), 1.0, 0.6)
            } else if self.spawned_total % 2 == 0 {
                p.primary
            } else {
                p.secondary
            };

            self.particles.push(Particle {
                x: p.origin.x,
                y: p.origin.y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                radius,
                color,
                life,
                max_life: life,
            });
            self.spawned_total += 1;
        }
        n
    }

    /// Advance every particle one tick and remove the expired ones.
    pub fn update(&mut self) {
        let decay = self.opts.decay;
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.life -= 1;
            p.radius *= decay;
        }
        let mut i = self.particles.len();
        while i > 0 {
            i -= 1;
            if self.particles[i].life <= 0 {
                self.particles.swap_remove(i);
            }
        }
    }

    /// Drop particles until the population fits `cap`, shortest remaining life first.
    pub fn enforce_cap(&mut self, cap: usize) -> usize {
        let excess = self.particles.len().saturating_sub(cap);
        if excess == 0 {
            return 0;
        }
        self.particles.sort_by_key(|p| std::cmp::Reverse(p.life));
        self.particles.truncate(cap);
        excess
    }

    /// One tick: trim to the cap, spawn on beat, then update.
    ///
    /// A batch spawned this tick is advanced once immediately so it is visible in this frame.
    pub fn tick(&mut self, beat: bool, p: &SpawnParams) -> usize {
        let dropped = self.enforce_cap(p.cap);
        if dropped > 0 {
            tracing::trace!(dropped, cap = p.cap, "particle population trimmed");
        }
        let spawned = if beat { self.spawn(p) } else { 0 };
        self.update();
        spawned
    }
}

fn sample(rng: &mut StdRng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

#[cfg(test)]
#[path = "../../tests/unit/particles/system.rs"]
mod tests;
