//! Background particle field
//!
//! A fixed set of points, each orbiting its own anchor with a per-particle
//! phase, speed and amplitude. The whole field rotates slowly about X and Y.
//! Advanced once per rendered frame.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Anchors are drawn from `[-EXTENT, EXTENT)` on each axis.
pub const EXTENT: f64 = 50.0;

const ROTATE_X_PER_SEC: f64 = 0.05;
const ROTATE_Y_PER_SEC: f64 = 0.075;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone)]
struct Particle {
    t: f64,
    factor: f64,
    speed: f64,
    anchor: Point3,
}

impl Particle {
    fn random(rng: &mut impl Rng) -> Self {
        Self {
            t: rng.gen_range(0.0..100.0),
            factor: rng.gen_range(20.0..120.0),
            speed: 0.01 + rng.gen_range(0.0..1.0) / 200.0,
            anchor: Point3 {
                x: rng.gen_range(-EXTENT..EXTENT),
                y: rng.gen_range(-EXTENT..EXTENT),
                z: rng.gen_range(-EXTENT..EXTENT),
            },
        }
    }

    fn position(&self) -> Point3 {
        let t = self.t;
        let f = self.factor;
        let orbit = (t / 10.0) * f;
        Point3 {
            x: self.anchor.x + orbit.cos() + (t.sin() * f) / 10.0,
            y: self.anchor.y + orbit.sin() + ((t * 2.0).cos() * f) / 10.0,
            z: self.anchor.z + orbit.cos() + ((t * 3.0).sin() * f) / 10.0,
        }
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    positions: Vec<Point3>,
    rotation_x: f64,
    rotation_y: f64,
}

impl ParticleField {
    /// A field of `count` particles. With a seed the layout is reproducible.
    pub fn new(count: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let particles: Vec<Particle> = (0..count).map(|_| Particle::random(&mut rng)).collect();
        let positions = particles.iter().map(|p| p.anchor).collect();
        Self {
            particles,
            positions,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }

    /// Advance every particle by one frame and set the view rotation from the
    /// total elapsed time.
    pub fn advance(&mut self, elapsed: Duration) {
        for (particle, slot) in self.particles.iter_mut().zip(self.positions.iter_mut()) {
            particle.t += particle.speed / 2.0;
            *slot = particle.position();
        }
        let secs = elapsed.as_secs_f64();
        self.rotation_x = secs * ROTATE_X_PER_SEC;
        self.rotation_y = secs * ROTATE_Y_PER_SEC;
    }

    /// Unrotated particle positions after the last `advance`.
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    pub fn rotation(&self) -> (f64, f64) {
        (self.rotation_x, self.rotation_y)
    }

    /// Positions rotated into view space and projected onto the XY plane.
    pub fn projected(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let (sx, cx) = self.rotation_x.sin_cos();
        let (sy, cy) = self.rotation_y.sin_cos();
        self.positions.iter().map(move |p| {
            // about X
            let y1 = p.y * cx - p.z * sx;
            let z1 = p.y * sx + p.z * cx;
            // about Y
            let x2 = p.x * cy + z1 * sy;
            (x2, y1)
        })
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_fields_are_identical() {
        let mut a = ParticleField::new(20, Some(7));
        let mut b = ParticleField::new(20, Some(7));
        a.advance(Duration::from_millis(16));
        b.advance(Duration::from_millis(16));
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn positions_follow_orbit_formula() {
        let mut field = ParticleField::new(1, Some(1));
        let p = field.particles[0].clone();
        field.advance(Duration::ZERO);
        let t = p.t + p.speed / 2.0;
        let expected_x = p.anchor.x + ((t / 10.0) * p.factor).cos() + (t.sin() * p.factor) / 10.0;
        assert!((field.positions()[0].x - expected_x).abs() < 1e-9);
    }

    #[test]
    fn particles_stay_near_their_anchor() {
        let mut field = ParticleField::new(50, Some(3));
        for frame in 0..500 {
            field.advance(Duration::from_millis(frame * 16));
        }
        for (particle, pos) in field.particles.iter().zip(field.positions()) {
            // |cos| + |sin| * factor / 10 <= 1 + 12
            assert!((pos.x - particle.anchor.x).abs() <= 13.0);
            assert!((pos.y - particle.anchor.y).abs() <= 13.0);
            assert!((pos.z - particle.anchor.z).abs() <= 13.0);
        }
    }

    #[test]
    fn rotation_tracks_elapsed_time() {
        let mut field = ParticleField::new(3, Some(0));
        field.advance(Duration::from_secs(10));
        let (rx, ry) = field.rotation();
        assert!((rx - 0.5).abs() < 1e-12);
        assert!((ry - 0.75).abs() < 1e-12);
    }

    #[test]
    fn projection_without_rotation_is_identity_on_xy() {
        let mut field = ParticleField::new(5, Some(9));
        field.advance(Duration::ZERO);
        for ((x, y), p) in field.projected().zip(field.positions()) {
            assert!((x - p.x).abs() < 1e-12);
            assert!((y - p.y).abs() < 1e-12);
        }
    }
}
