use trestle_view::viewer::{Aabb, Vec3, ViewerMesh};

pub struct ModelInfo {
    pub label: String,
    pub vertices: usize,
    pub triangles: usize,
    pub textured: bool,
    pub bounds: Option<Aabb>,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            label: "None".to_string(),
            vertices: 0,
            triangles: 0,
            textured: false,
            bounds: None,
        }
    }
}

impl ModelInfo {
    pub fn from_mesh(label: impl Into<String>, mesh: &ViewerMesh) -> Self {
        Self {
            label: label.into(),
            vertices: mesh.positions.len(),
            triangles: mesh.triangle_count(),
            textured: mesh.has_uvs(),
            bounds: mesh.bounds,
        }
    }

    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Model", self.label.clone()),
            ("Vertices", self.vertices.to_string()),
            ("Triangles", self.triangles.to_string()),
            ("UVs", if self.textured { "yes" } else { "no" }.to_string()),
        ];
        if let Some(bounds) = self.bounds {
            rows.push(("Min", format_point(&bounds.min)));
            rows.push(("Max", format_point(&bounds.max)));
            rows.push(("Size", format_point(&bounds.size())));
        }
        rows
    }
}

pub fn format_point(point: &Vec3) -> String {
    format!("{:.3}, {:.3}, {:.3}", point.x, point.y, point.z)
}
