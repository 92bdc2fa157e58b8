use truck_polymesh::{PolygonMesh, StandardVertex};

use super::bvh::Bvh;
use super::math::{Aabb, Vec3};
use super::pick::ray_intersect_triangle;
use super::transform::Ray;

type TriangleUvs = [[f32; 2]; 3];

/// Where a pick ray meets the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// Ray parameter; world distance when the ray direction is unit length.
    pub t: f64,
    pub point: Vec3,
    pub triangle: usize,
}

/// Triangulated target surface in world space.
///
/// This is the only geometry ray picks are tested against; grids, markers and
/// other aids never enter it.
#[derive(Clone, Debug, Default)]
pub struct ViewerMesh {
    pub positions: Vec<Vec3>,
    pub tri_faces: Vec<[usize; 3]>,
    /// Per-corner texture coordinates, parallel to `tri_faces`.
    pub tri_uvs: Vec<Option<TriangleUvs>>,
    pub bounds: Option<Aabb>,
    bvh: Bvh,
}

impl ViewerMesh {
    /// Fans every polygon of the loaded model into triangles.
    pub fn from_mesh(mesh: &PolygonMesh) -> Self {
        let uv_coords = mesh.uv_coords();
        let uv_of = |vertex: &StandardVertex| {
            let uv = uv_coords.get(vertex.uv?)?;
            Some([uv.x as f32, uv.y as f32])
        };
        let corner_uvs = |a: &StandardVertex, b: &StandardVertex, c: &StandardVertex| {
            Some([uv_of(a)?, uv_of(b)?, uv_of(c)?])
        };
        let polygons = mesh
            .tri_faces()
            .iter()
            .map(|face| face.as_slice())
            .chain(mesh.quad_faces().iter().map(|face| face.as_slice()))
            .chain(mesh.faces().other_faces().iter().map(Vec::as_slice));

        let mut tri_faces = Vec::new();
        let mut tri_uvs = Vec::new();
        for polygon in polygons {
            for [a, b, c] in fan(polygon) {
                tri_faces.push([a.pos, b.pos, c.pos]);
                tri_uvs.push(corner_uvs(a, b, c));
            }
        }

        let positions = mesh.positions().iter().copied().map(Vec3::from).collect();
        Self::assemble(positions, tri_faces, tri_uvs)
    }

    /// Untextured mesh from raw triangles. Triangles referencing missing
    /// positions are dropped.
    pub fn from_triangles(positions: Vec<Vec3>, tri_faces: Vec<[usize; 3]>) -> Self {
        let tri_uvs = vec![None; tri_faces.len()];
        Self::assemble(positions, tri_faces, tri_uvs)
    }

    fn assemble(
        positions: Vec<Vec3>,
        tri_faces: Vec<[usize; 3]>,
        tri_uvs: Vec<Option<TriangleUvs>>,
    ) -> Self {
        let count = positions.len();
        let (tri_faces, tri_uvs): (Vec<_>, Vec<_>) = tri_faces
            .into_iter()
            .zip(tri_uvs)
            .filter(|(tri, _)| tri.iter().all(|&idx| idx < count))
            .unzip();
        let boxes: Vec<Aabb> = tri_faces
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.map(|idx| positions[idx]);
                Aabb::new(a, b).union(Aabb::new(c, c))
            })
            .collect();
        Self {
            bounds: Aabb::enclosing(positions.iter().copied()),
            bvh: Bvh::build(&boxes),
            positions,
            tri_faces,
            tri_uvs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tri_faces.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.tri_faces.len()
    }

    pub fn has_uvs(&self) -> bool {
        self.tri_uvs.iter().any(Option::is_some)
    }

    pub fn triangle(&self, idx: usize) -> Option<[Vec3; 3]> {
        let tri = self.tri_faces.get(idx)?;
        Some(tri.map(|corner| self.positions[corner]))
    }

    /// Nearest surface crossing along the ray.
    pub fn ray_pick(&self, ray: &Ray) -> Option<SurfaceHit> {
        let (triangle, t) = self
            .bvh
            .nearest(ray.origin, ray.dir, |idx| self.crossing(idx, ray))?;
        Some(SurfaceHit {
            t,
            point: ray.at(t),
            triangle,
        })
    }

    /// Same answer as `ray_pick`, testing every triangle.
    pub fn ray_pick_exhaustive(&self, ray: &Ray) -> Option<SurfaceHit> {
        (0..self.tri_faces.len())
            .filter_map(|idx| self.crossing(idx, ray).map(|t| (idx, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(triangle, t)| SurfaceHit {
                t,
                point: ray.at(t),
                triangle,
            })
    }

    fn crossing(&self, idx: usize, ray: &Ray) -> Option<f64> {
        let [a, b, c] = self.triangle(idx)?;
        ray_intersect_triangle(ray.origin, ray.dir, a, b, c)
    }
}

/// Triangle fan around the first corner; fewer than three corners give nothing.
fn fan<T>(polygon: &[T]) -> impl Iterator<Item = [&T; 3]> {
    (1..polygon.len().saturating_sub(1)).map(move |i| [&polygon[0], &polygon[i], &polygon[i + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
v 0 0 0
v 4 0 0
v 4 2 0
v 0 2 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    fn down_at(x: f64, y: f64) -> Ray {
        Ray {
            origin: Vec3::new(x, y, 5.0),
            dir: -Vec3::UNIT_Z,
        }
    }

    #[test]
    fn quad_fans_into_two_textured_triangles() -> anyhow::Result<()> {
        let mesh = truck_polymesh::obj::read(QUAD_OBJ.as_bytes())?;
        let surface = ViewerMesh::from_mesh(&mesh);
        assert_eq!(surface.triangle_count(), 2);
        assert!(surface.tri_uvs.iter().all(Option::is_some));
        assert_eq!(
            surface.bounds,
            Some(Aabb::new(Vec3::ZERO, Vec3::new(4.0, 2.0, 0.0)))
        );

        let lower = surface.ray_pick(&down_at(3.0, 0.5)).map(|hit| hit.triangle);
        let upper = surface.ray_pick(&down_at(1.0, 1.5)).map(|hit| hit.triangle);
        assert_eq!(lower, Some(0));
        assert_eq!(upper, Some(1));
        Ok(())
    }

    #[test]
    fn out_of_range_triangles_are_dropped() {
        let positions = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let mesh = ViewerMesh::from_triangles(positions, vec![[0, 1, 7], [0, 1, 2]]);
        assert_eq!(mesh.tri_faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.tri_uvs.len(), 1);
        let hit = mesh.ray_pick(&down_at(0.2, 0.2));
        assert_eq!(hit.map(|hit| (hit.triangle, hit.t)), Some((0, 5.0)));
    }

    #[test]
    fn fan_skips_degenerate_polygons() {
        assert_eq!(fan(&[1, 2]).count(), 0);
        let pentagon: Vec<[&i32; 3]> = fan(&[0, 1, 2, 3, 4]).collect();
        assert_eq!(pentagon, vec![[&0, &1, &2], [&0, &2, &3], [&0, &3, &4]]);
    }
}
