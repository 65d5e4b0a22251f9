//! Scene: the primitive collection, its BVH, and light sampling.

use crate::bvh::{Bvh, SplitMethod};
use crate::primitive::{Intersection, Primitive};
use crate::sampling::gen_f32;
use crate::EPSILON;
use ivar_math::Ray;
use rand::RngCore;
use std::time::Instant;

/// Default probability that a path continues at each bounce.
pub const DEFAULT_RUSSIAN_ROULETTE: f32 = 0.8;

/// Default hard cap on path length, on top of Russian roulette.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// A renderable scene.
///
/// The primitive list and BVH are fixed at [`Scene::build`]; the scene is
/// read-only afterwards and can be shared across render threads.
pub struct Scene {
    primitives: Vec<Box<dyn Primitive>>,
    bvh: Bvh,
    /// Indices of primitives with emissive materials
    emitters: Vec<usize>,
    emissive_area: f32,
    russian_roulette: f32,
    max_depth: u32,
}

impl Scene {
    /// Take ownership of `primitives` and build the BVH over them.
    pub fn build(primitives: Vec<Box<dyn Primitive>>, split_method: SplitMethod) -> Self {
        let start = Instant::now();
        let bvh = Bvh::build(&primitives, split_method);

        let emitters: Vec<usize> = primitives
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_emission())
            .map(|(i, _)| i)
            .collect();
        let emissive_area = emitters.iter().map(|&i| primitives[i].area()).sum();

        log::info!(
            "Scene built: {} primitives ({} emissive, area {:.3}), BVH {} nodes, depth {}, {:?}",
            primitives.len(),
            emitters.len(),
            emissive_area,
            bvh.node_count(),
            bvh.depth(),
            start.elapsed()
        );
        if emitters.is_empty() && !primitives.is_empty() {
            log::warn!("Scene has no emissive primitives; direct lighting will be black");
        }

        Self {
            primitives,
            bvh,
            emitters,
            emissive_area,
            russian_roulette: DEFAULT_RUSSIAN_ROULETTE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the Russian roulette continuation probability (clamped to [0, 1]).
    pub fn with_russian_roulette(mut self, probability: f32) -> Self {
        self.russian_roulette = probability.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum path depth.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nearest hit along `ray`, or "no hit".
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(&self.primitives, ray)
    }

    /// Pick a point on an emissive surface, weighting each emitter by its area.
    ///
    /// The returned pdf is the chosen emitter's own area density; it is not
    /// multiplied by the probability of choosing that emitter. Returns `None`
    /// when the scene has no emissive area.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<(Intersection<'_>, f32)> {
        if self.emissive_area < EPSILON {
            return None;
        }

        let target = gen_f32(rng) * self.emissive_area;
        let mut running = 0.0;
        for &index in &self.emitters {
            running += self.primitives[index].area();
            if target < running {
                return Some(self.primitives[index].sample(rng));
            }
        }

        // Rounding left the target past the last running sum
        self.emitters
            .last()
            .map(|&index| self.primitives[index].sample(rng))
    }

    /// Total surface area of all emissive primitives.
    pub fn emissive_area(&self) -> f32 {
        self.emissive_area
    }

    pub fn russian_roulette(&self) -> f32 {
        self.russian_roulette
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn primitives(&self) -> &[Box<dyn Primitive>] {
        &self.primitives
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Get the number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, DiffuseLight, Lambertian, Sphere, TriangleMesh};
    use ivar_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::PI;

    #[test]
    fn test_empty_scene() {
        let scene = Scene::build(Vec::new(), SplitMethod::Sah);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(scene.is_empty());
        assert!(!scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Z)).happened);
        assert!(scene.sample_light(&mut rng).is_none());
    }

    #[test]
    fn test_no_lights_returns_none() {
        let scene = Scene::build(
            vec![Box::new(Sphere::new(Vec3::ZERO, 1.0, Lambertian::new(Color::ONE)))],
            SplitMethod::Naive,
        );
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(scene.emissive_area(), 0.0);
        assert!(scene.sample_light(&mut rng).is_none());
    }

    #[test]
    fn test_emissive_area_sums_lights_only() {
        let scene = Scene::build(
            vec![
                Box::new(Sphere::new(Vec3::ZERO, 1.0, DiffuseLight::new(Color::ONE))),
                Box::new(Sphere::new(Vec3::X * 5.0, 3.0, Lambertian::new(Color::ONE))),
                Box::new(Sphere::new(Vec3::X * 10.0, 2.0, DiffuseLight::new(Color::ONE))),
            ],
            SplitMethod::Naive,
        );

        assert!((scene.emissive_area() - 4.0 * PI * 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_square_light_pdf_is_inverse_area() {
        let side = 3.0;
        let light = TriangleMesh::quad(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, 5.0, side),
            Vec3::new(side, 5.0, side),
            Vec3::new(side, 5.0, 0.0),
            DiffuseLight::new(Color::splat(10.0)),
        )
        .unwrap();
        let scene = Scene::build(vec![Box::new(light)], SplitMethod::Naive);
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..1000 {
            let (isect, pdf) = scene.sample_light(&mut rng).unwrap();
            assert!((pdf - 1.0 / (side * side)).abs() < 1e-6);
            assert!((isect.point.y - 5.0).abs() < 1e-5);
            assert_eq!(isect.emission, Color::splat(10.0));
        }
    }

    #[test]
    fn test_light_choice_follows_area() {
        // Radii 1 and 2: areas in ratio 1:4
        let scene = Scene::build(
            vec![
                Box::new(Sphere::new(-10.0 * Vec3::X, 1.0, DiffuseLight::new(Color::ONE))),
                Box::new(Sphere::new(Vec3::ZERO, 1.0, Lambertian::new(Color::ONE))),
                Box::new(Sphere::new(10.0 * Vec3::X, 2.0, DiffuseLight::new(Color::ONE))),
            ],
            SplitMethod::Sah,
        );
        let mut rng = StdRng::seed_from_u64(31);

        let draws = 50_000;
        let mut small = 0;
        for _ in 0..draws {
            let (isect, _) = scene.sample_light(&mut rng).unwrap();
            if isect.point.x < 0.0 {
                small += 1;
            }
        }
        let freq = small as f32 / draws as f32;
        assert!((freq - 0.2).abs() < 0.01, "frequency {}", freq);
    }

    #[test]
    fn test_builder_settings() {
        let scene = Scene::build(Vec::new(), SplitMethod::Naive)
            .with_russian_roulette(1.5)
            .with_max_depth(8);

        assert_eq!(scene.russian_roulette(), 1.0);
        assert_eq!(scene.max_depth(), 8);
        assert_eq!(
            Scene::build(Vec::new(), SplitMethod::Naive).russian_roulette(),
            DEFAULT_RUSSIAN_ROULETTE
        );
    }
}
