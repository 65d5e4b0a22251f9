//! Triangle meshes as a single primitive.
//!
//! A mesh owns its faces and an inner BVH over them, so the scene-level
//! tree sees one leaf per mesh. All faces share one material, and light
//! sampling picks a face proportionally to its area.

use crate::bvh::{Bvh, SplitMethod};
use crate::error::{RenderError, RenderResult};
use crate::primitive::{Intersection, Primitive};
use crate::sampling::gen_f32;
use crate::{Material, Triangle};
use ivar_math::{Bounds3, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// An indexed triangle mesh with one shared material.
pub struct TriangleMesh<M: Material> {
    faces: Vec<Triangle<Arc<M>>>,
    bvh: Bvh,
    bounds: Bounds3,
    /// Running sum of face areas, one entry per face
    area_cdf: Vec<f32>,
    area: f32,
    material: Arc<M>,
}

impl<M: Material + 'static> TriangleMesh<M> {
    /// Build a mesh from vertex positions and counter-clockwise index triples.
    ///
    /// Fails if there are no faces or an index points past the vertex list.
    pub fn new(
        positions: &[Vec3],
        indices: &[[usize; 3]],
        material: M,
        split_method: SplitMethod,
    ) -> RenderResult<Self> {
        if indices.is_empty() {
            return Err(RenderError::EmptyMesh);
        }

        let material = Arc::new(material);
        let mut faces = Vec::with_capacity(indices.len());

        for (face, triple) in indices.iter().enumerate() {
            if let Some(&index) = triple.iter().find(|&&i| i >= positions.len()) {
                return Err(RenderError::MeshIndexOutOfRange {
                    face,
                    index,
                    vertex_count: positions.len(),
                });
            }
            let [a, b, c] = *triple;
            faces.push(Triangle::new(
                positions[a],
                positions[b],
                positions[c],
                Arc::clone(&material),
            ));
        }

        let bounds = faces
            .iter()
            .fold(Bounds3::EMPTY, |acc, f| acc.union(&f.bounds()));

        let area_cdf: Vec<f32> = faces
            .iter()
            .scan(0.0, |sum, f| {
                *sum += f.area();
                Some(*sum)
            })
            .collect();
        let area = area_cdf.last().copied().unwrap_or(0.0);

        let bvh = Bvh::build(&faces, split_method);

        Ok(Self {
            faces,
            bvh,
            bounds,
            area_cdf,
            area,
            material,
        })
    }

    /// Convenience constructor for a planar quad `a, b, c, d` (counter-clockwise).
    pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: M) -> RenderResult<Self> {
        Self::new(&[a, b, c, d], &[[0, 1, 2], [0, 2, 3]], material, SplitMethod::Naive)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn material(&self) -> &M {
        &self.material
    }
}

impl<M: Material + 'static> Primitive for TriangleMesh<M> {
    fn bounds(&self) -> Bounds3 {
        self.bounds
    }

    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(&self.faces, ray)
    }

    fn has_emission(&self) -> bool {
        self.material.has_emission()
    }

    fn area(&self) -> f32 {
        self.area
    }

    /// Picks a face with probability `face_area / area`, then a uniform
    /// point on it, so the combined density is `1 / area`.
    fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32) {
        let target = gen_f32(rng) * self.area;
        let face = self
            .area_cdf
            .partition_point(|&sum| sum <= target)
            .min(self.faces.len() - 1);

        let (isect, _) = self.faces[face].sample(rng);
        let pdf = if self.area > 0.0 { 1.0 / self.area } else { 0.0 };
        (isect, pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{DiffuseLight, Lambertian};
    use crate::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_cube_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_mesh_rejects_bad_indices() {
        let result = TriangleMesh::new(
            &unit_cube_positions(),
            &[[0, 1, 2], [0, 2, 7]],
            Lambertian::new(Color::ONE),
            SplitMethod::Naive,
        );
        assert_eq!(
            result.err(),
            Some(RenderError::MeshIndexOutOfRange {
                face: 1,
                index: 7,
                vertex_count: 4
            })
        );

        let empty = TriangleMesh::new(
            &unit_cube_positions(),
            &[],
            Lambertian::new(Color::ONE),
            SplitMethod::Naive,
        );
        assert_eq!(empty.err(), Some(RenderError::EmptyMesh));
    }

    #[test]
    fn test_quad_area_and_hit() {
        let p = unit_cube_positions();
        let quad = TriangleMesh::quad(p[0], p[1], p[2], p[3], Lambertian::new(Color::ONE)).unwrap();

        assert_eq!(quad.face_count(), 2);
        assert!((quad.area() - 1.0).abs() < 1e-6);

        let isect = quad.intersect(&Ray::new(Vec3::new(0.25, 0.75, 2.0), -Vec3::Z));
        assert!(isect.happened);
        assert!((isect.distance - 2.0).abs() < 1e-5);
        assert!((isect.normal - Vec3::Z).length() < 1e-6);

        let miss = quad.intersect(&Ray::new(Vec3::new(1.5, 0.5, 2.0), -Vec3::Z));
        assert!(!miss.happened);
    }

    #[test]
    fn test_mesh_sample_is_uniform_over_area() {
        // One face of area 2, one of area 0.5: the larger takes 80% of samples
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(11.0, 0.0, 0.0),
            Vec3::new(10.0, 1.0, 0.0),
        ];
        let mesh = TriangleMesh::new(
            &positions,
            &[[0, 1, 2], [3, 4, 5]],
            DiffuseLight::new(Color::ONE),
            SplitMethod::Sah,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(123);

        let draws = 20_000;
        let mut large = 0;
        for _ in 0..draws {
            let (isect, pdf) = mesh.sample(&mut rng);
            assert!((pdf - 1.0 / 2.5).abs() < 1e-6);
            if isect.point.x < 5.0 {
                large += 1;
            }
        }
        let freq = large as f32 / draws as f32;
        assert!((freq - 0.8).abs() < 0.02, "frequency {}", freq);
    }
}
