//! Path tracing integrator.
//!
//! Unidirectional path tracing with next-event estimation: at every hit one
//! point is sampled on the scene's lights for direct lighting, and one BRDF
//! sample continues the path for indirect lighting. Paths end by Russian
//! roulette, with the scene's max depth as a hard cap.

use crate::primitive::Intersection;
use crate::sampling::gen_f32;
use crate::{Color, Material, Scene, EPSILON};
use ivar_math::{Ray, Vec3};
use rand::RngCore;

/// A light sample counts as occluded when the shadow ray hits something
/// closer than the light by more than this distance.
pub const SHADOW_TOLERANCE: f32 = 0.1;

/// Estimate the radiance arriving along `ray`.
///
/// `depth` is the number of bounces already taken (0 for camera rays).
/// Always returns a finite, possibly zero, radiance.
pub fn cast_ray(scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
    let hit = scene.intersect(ray);
    shade(scene, ray, &hit, depth, rng)
}

/// Radiance leaving `hit` back along `ray`.
fn shade(
    scene: &Scene,
    ray: &Ray,
    hit: &Intersection<'_>,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let material = match hit.material {
        Some(material) if hit.happened => material,
        _ => return Color::ZERO,
    };

    let wo = ray.direction();
    let n = hit.normal;

    // Nudge the origin of secondary rays off the surface, on the side the ray arrived from
    let origin = if wo.dot(n) < 0.0 {
        hit.point + n * EPSILON
    } else {
        hit.point - n * EPSILON
    };

    let direct = direct_lighting(scene, material, hit.point, origin, wo, n, rng);
    let indirect = indirect_lighting(scene, material, origin, wo, n, depth, rng);

    hit.emission + direct + indirect
}

/// Next-event estimation: one light sample, tested for occlusion.
fn direct_lighting(
    scene: &Scene,
    material: &dyn Material,
    point: Vec3,
    origin: Vec3,
    wo: Vec3,
    n: Vec3,
    rng: &mut dyn RngCore,
) -> Color {
    let Some((light, pdf_light)) = scene.sample_light(rng) else {
        return Color::ZERO;
    };
    // Area density: tiny for large lights, zero only for degenerate ones
    if !(pdf_light > 0.0) {
        return Color::ZERO;
    }

    let to_light = light.point - point;
    let dist_sq = to_light.length_squared();
    if dist_sq < EPSILON {
        return Color::ZERO;
    }
    let dist = dist_sq.sqrt();
    let ws = to_light / dist;

    let blocker = scene.intersect(&Ray::new(origin, ws));
    if blocker.distance < dist - SHADOW_TOLERANCE {
        return Color::ZERO;
    }

    let cos_surface = n.dot(ws);
    // One-sided emitters: nothing leaves the back of a light
    let cos_light = light.normal.dot(-ws).max(0.0);

    light.emission * material.eval(wo, ws, n) * cos_surface * cos_light / (dist_sq * pdf_light)
}

/// One BRDF-sampled bounce, continued with probability `scene.russian_roulette()`.
///
/// Bounces that land on emitters are dropped: their light was already
/// counted by next-event estimation.
fn indirect_lighting(
    scene: &Scene,
    material: &dyn Material,
    origin: Vec3,
    wo: Vec3,
    n: Vec3,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    if depth + 1 >= scene.max_depth() {
        return Color::ZERO;
    }

    let p_rr = scene.russian_roulette();
    if !survives_roulette(p_rr, rng) {
        return Color::ZERO;
    }

    let wi = material.sample(wo, n, rng);
    let len_sq = wi.length_squared();
    if len_sq < EPSILON {
        return Color::ZERO;
    }
    let wi = wi / len_sq.sqrt();

    let bounce = Ray::new(origin, wi);
    let next = scene.intersect(&bounce);
    let lands_on_surface = next.happened && next.material.is_some_and(|m| !m.has_emission());
    if !lands_on_surface {
        return Color::ZERO;
    }

    let pdf = material.pdf(wo, wi, n);
    if pdf < EPSILON {
        return Color::ZERO;
    }

    shade(scene, &bounce, &next, depth + 1, rng) * material.eval(wo, wi, n) * n.dot(wi)
        / (pdf * p_rr)
}

/// Russian roulette draw: true with probability `p`.
#[inline]
fn survives_roulette(p: f32, rng: &mut dyn RngCore) -> bool {
    p >= EPSILON && gen_f32(rng) <= p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiffuseLight, Lambertian, Primitive, Sphere, SplitMethod, Triangle};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::{FRAC_1_PI, PI};

    /// Diffuse surface whose sampler never produces a direction.
    struct NoScatter {
        albedo: Color,
        emit: Color,
    }

    impl Material for NoScatter {
        fn eval(&self, _wo: Vec3, wi: Vec3, n: Vec3) -> Color {
            if n.dot(wi) > 0.0 {
                self.albedo * FRAC_1_PI
            } else {
                Color::ZERO
            }
        }

        fn sample(&self, _wo: Vec3, _n: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
            Vec3::ZERO
        }

        fn pdf(&self, _wo: Vec3, _wi: Vec3, _n: Vec3) -> f32 {
            0.5 / PI
        }

        fn emission(&self) -> Color {
            self.emit
        }
    }

    /// Triangle in the y=0 plane facing +y, covering the origin.
    fn ground_with<M: Material + 'static>(material: M) -> Box<dyn Primitive> {
        Box::new(Triangle::new(
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, -10.0),
            material,
        ))
    }

    fn ground(albedo: f32) -> Box<dyn Primitive> {
        ground_with(Lambertian::new(Color::splat(albedo)))
    }

    fn sphere_light(center: Vec3, radius: f32, le: f32) -> Box<dyn Primitive> {
        Box::new(Sphere::new(center, radius, DiffuseLight::new(Color::splat(le))))
    }

    fn ray_to_origin() -> Ray {
        Ray::new(Vec3::new(0.0, 1.0, -1.0), Vec3::new(0.0, -1.0, 1.0).normalize())
    }

    fn mean_radiance(scene: &Scene, samples: usize, seed: u64) -> Color {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sum = Color::ZERO;
        for _ in 0..samples {
            let color = cast_ray(scene, &ray_to_origin(), 0, &mut rng);
            assert!(color.is_finite());
            sum += color;
        }
        sum / samples as f32
    }

    fn assert_close(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() < tolerance * expected.abs(),
            "got {} expected {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_miss_returns_zero() {
        let scene = Scene::build(vec![ground(0.5)], SplitMethod::Naive);
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert_eq!(cast_ray(&scene, &ray, 0, &mut rng), Color::ZERO);

        let empty = Scene::build(Vec::new(), SplitMethod::Naive);
        assert_eq!(cast_ray(&empty, &ray, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_hitting_light_returns_emission() {
        let scene = Scene::build(
            vec![sphere_light(Vec3::new(0.0, 0.0, -3.0), 1.0, 5.0)],
            SplitMethod::Naive,
        );
        let mut rng = StdRng::seed_from_u64(0);

        let color = cast_ray(&scene, &Ray::new(Vec3::ZERO, -Vec3::Z), 0, &mut rng);
        assert!((color - Color::splat(5.0)).length() < 1e-4);
    }

    #[test]
    fn test_unlit_scene_is_black() {
        let scene = Scene::build(vec![ground(0.8)], SplitMethod::Naive);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            assert_eq!(cast_ray(&scene, &ray_to_origin(), 0, &mut rng), Color::ZERO);
        }
    }

    #[test]
    fn test_direct_lighting_matches_sphere_irradiance() {
        // A sphere light of radius r at distance d gives irradiance pi * Le * (r/d)^2,
        // so a Lambertian point reflects albedo * Le * (r/d)^2.
        let (albedo, le, r, d) = (0.5_f32, 10.0_f32, 0.5_f32, 5.0_f32);
        let scene = Scene::build(
            vec![ground(albedo), sphere_light(Vec3::new(0.0, d, 0.0), r, le)],
            SplitMethod::Sah,
        )
        .with_russian_roulette(0.0);

        let mean = mean_radiance(&scene, 40_000, 2);
        assert_close(mean.x, albedo * le * (r / d) * (r / d), 0.05);
    }

    #[test]
    fn test_large_light_still_lights() {
        // Area 4 * pi * 30^2 > 1e4, so the light's area density is below 1e-4
        let (albedo, le, r, d) = (0.5_f32, 10.0_f32, 30.0_f32, 200.0_f32);
        let scene = Scene::build(
            vec![ground(albedo), sphere_light(Vec3::new(0.0, d, 0.0), r, le)],
            SplitMethod::Sah,
        )
        .with_russian_roulette(0.0);
        assert!(1.0 / scene.emissive_area() < EPSILON);

        let mean = mean_radiance(&scene, 40_000, 12);
        assert_close(mean.x, albedo * le * (r / d) * (r / d), 0.05);
    }

    #[test]
    fn test_occluded_light_gives_no_direct_light() {
        let scene = Scene::build(
            vec![
                ground(0.5),
                // Blocker between the shading point and the light
                Box::new(Sphere::new(
                    Vec3::new(0.0, 2.5, 0.0),
                    1.0,
                    Lambertian::new(Color::ONE),
                )),
                sphere_light(Vec3::new(0.0, 5.0, 0.0), 0.5, 10.0),
            ],
            SplitMethod::Naive,
        )
        .with_russian_roulette(0.0);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..500 {
            assert_eq!(cast_ray(&scene, &ray_to_origin(), 0, &mut rng), Color::ZERO);
        }
    }

    /// Ground and a large white ceiling at y=2, with a small light between
    /// them that is hidden from the origin. All light reaching the origin
    /// arrives after one bounce off the ceiling.
    fn bounce_scene(p_rr: f32) -> Scene {
        Scene::build(
            vec![
                Box::new(Triangle::new(
                    Vec3::new(-100.0, 0.0, -100.0),
                    Vec3::new(0.0, 0.0, 100.0),
                    Vec3::new(100.0, 0.0, -100.0),
                    Lambertian::new(Color::splat(0.5)),
                )),
                // Ceiling facing -y
                Box::new(Triangle::new(
                    Vec3::new(100.0, 2.0, -100.0),
                    Vec3::new(0.0, 2.0, 100.0),
                    Vec3::new(-100.0, 2.0, -100.0),
                    Lambertian::new(Color::splat(0.8)),
                )),
                // Occluder directly above the origin
                Box::new(Sphere::new(
                    Vec3::new(0.0, 0.5, 0.0),
                    0.15,
                    Lambertian::new(Color::ZERO),
                )),
                sphere_light(Vec3::new(0.0, 1.0, 0.0), 0.25, 10.0),
            ],
            SplitMethod::Sah,
        )
        .with_russian_roulette(p_rr)
        .with_max_depth(2)
    }

    #[test]
    fn test_indirect_bounce_adds_light() {
        let direct_only = mean_radiance(&bounce_scene(0.0), 2000, 4);
        let with_bounce = mean_radiance(&bounce_scene(0.8), 2000, 4);

        assert_eq!(direct_only, Color::ZERO);
        assert!(with_bounce.x > 0.0);
    }

    #[test]
    fn test_roulette_keeps_indirect_unbiased() {
        // Dividing by the survival probability makes the mean independent of it
        let samples = 50_000;
        let always = mean_radiance(&bounce_scene(1.0), samples, 5);
        let often = mean_radiance(&bounce_scene(0.8), samples, 6);
        let half = mean_radiance(&bounce_scene(0.5), samples, 7);

        assert!(always.x > 0.0);
        assert_close(often.x, always.x, 0.05);
        assert_close(half.x, always.x, 0.05);
    }

    #[test]
    fn test_degenerate_sample_direction_ends_path() {
        // Lone emitter: light samples lie in its own plane and carry nothing
        let emit = Color::splat(2.0);
        let scene = Scene::build(
            vec![ground_with(NoScatter {
                albedo: Color::ONE,
                emit,
            })],
            SplitMethod::Naive,
        )
        .with_russian_roulette(1.0);
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..200 {
            assert_eq!(cast_ray(&scene, &ray_to_origin(), 0, &mut rng), emit);
        }
    }

    #[test]
    fn test_degenerate_sample_direction_keeps_direct_light() {
        // Every path survives roulette, but the bounce direction is zero,
        // so only the direct term remains.
        let (albedo, le, r, d) = (0.5_f32, 10.0_f32, 0.5_f32, 5.0_f32);
        let scene = Scene::build(
            vec![
                ground_with(NoScatter {
                    albedo: Color::splat(albedo),
                    emit: Color::ZERO,
                }),
                sphere_light(Vec3::new(0.0, d, 0.0), r, le),
            ],
            SplitMethod::Sah,
        )
        .with_russian_roulette(1.0);

        let mean = mean_radiance(&scene, 40_000, 9);
        assert_close(mean.x, albedo * le * (r / d) * (r / d), 0.05);
    }

    #[test]
    fn test_max_depth_bounds_recursion() {
        // Closed white sphere, roulette never terminates: only the depth cap ends paths
        let scene = Scene::build(
            vec![Box::new(Sphere::new(Vec3::ZERO, 5.0, Lambertian::new(Color::ONE)))],
            SplitMethod::Naive,
        )
        .with_russian_roulette(1.0)
        .with_max_depth(16);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..50 {
            let color = cast_ray(&scene, &Ray::new(Vec3::ZERO, Vec3::X), 0, &mut rng);
            assert_eq!(color, Color::ZERO);
        }
    }

    #[test]
    fn test_roulette_expected_length() {
        // Number of consecutive survivals is geometric with mean p / (1 - p)
        let mut rng = StdRng::seed_from_u64(6);
        for p in [0.5_f32, 0.8] {
            let trials = 50_000;
            let mut total = 0u64;
            for _ in 0..trials {
                while survives_roulette(p, &mut rng) {
                    total += 1;
                }
            }
            let mean = total as f32 / trials as f32;
            assert_close(mean, p / (1.0 - p), 0.05);
        }
    }

    #[test]
    fn test_zero_roulette_never_continues() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..1000).all(|_| !survives_roulette(0.0, &mut rng)));
    }
}
