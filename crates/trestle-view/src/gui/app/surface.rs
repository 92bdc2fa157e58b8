use std::sync::Arc;

use egui::epaint::{Vertex, WHITE_UV};
use trestle_view::viewer::{ClipVertex, Rect, ViewTransform, ViewerMesh};

const BASE_COLOR: [f32; 3] = [196.0, 192.0, 184.0];
const AMBIENT: f32 = 0.3;

#[derive(Clone, Copy, PartialEq)]
struct SurfaceKey {
    view: ViewTransform,
    rect: egui::Rect,
    texture: Option<egui::TextureId>,
    revision: u64,
}

/// Projected model triangles, rebuilt only when the view or model changes.
#[derive(Default)]
pub struct SurfaceCache {
    key: Option<SurfaceKey>,
    mesh: Arc<egui::Mesh>,
}

impl SurfaceCache {
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn shape(
        &mut self,
        mesh: &ViewerMesh,
        view: &ViewTransform,
        viewport: Rect,
        screen_rect: egui::Rect,
        texture: Option<egui::TextureId>,
        revision: u64,
    ) -> egui::Shape {
        let key = SurfaceKey {
            view: *view,
            rect: screen_rect,
            texture,
            revision,
        };
        if self.key != Some(key) {
            self.mesh = Arc::new(build_surface_mesh(
                mesh,
                view,
                viewport,
                screen_rect.min.to_vec2(),
                texture,
            ));
            self.key = Some(key);
        }
        egui::Shape::Mesh(Arc::clone(&self.mesh))
    }
}

struct ProjectedTriangle {
    screen: [egui::Pos2; 3],
    uvs: Option<[egui::Pos2; 3]>,
    depth: f64,
    shade: f32,
}

/// Back-to-front, Lambert-lit triangles with an optional texture. Triangles
/// crossing the near plane are cut so the visible part still draws.
fn build_surface_mesh(
    mesh: &ViewerMesh,
    view: &ViewTransform,
    viewport: Rect,
    offset: egui::Vec2,
    texture: Option<egui::TextureId>,
) -> egui::Mesh {
    let mut projected = Vec::with_capacity(mesh.triangle_count());
    for index in 0..mesh.triangle_count() {
        let Some(corners) = mesh.triangle(index) else {
            continue;
        };
        let uvs = texture.and(mesh.tri_uvs.get(index).copied().flatten());
        let [a, b, c] = corners;
        let facing = (b - a).cross(c - a).normalized().dot(view.forward).abs() as f32;
        let shade = AMBIENT + (1.0 - AMBIENT) * facing;

        let tri = [0, 1, 2].map(|corner| ClipVertex {
            position: corners[corner],
            uv: uvs.map_or([0.0, 0.0], |uvs| uvs[corner]),
        });
        for piece in view.clip_near(tri) {
            let (Some((sa, da)), Some((sb, db)), Some((sc, dc))) = (
                view.project(piece[0].position, viewport),
                view.project(piece[1].position, viewport),
                view.project(piece[2].position, viewport),
            ) else {
                continue;
            };
            projected.push(ProjectedTriangle {
                screen: [sa, sb, sc].map(|p| egui::pos2(p.x + offset.x, p.y + offset.y)),
                uvs: uvs.map(|_| piece.map(|v| egui::pos2(v.uv[0], 1.0 - v.uv[1]))),
                depth: (da + db + dc) / 3.0,
                shade,
            });
        }
    }
    projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    let mut out = match texture {
        Some(id) => egui::Mesh::with_texture(id),
        None => egui::Mesh::default(),
    };
    out.vertices.reserve(projected.len() * 3);
    out.indices.reserve(projected.len() * 3);
    for tri in projected {
        let color = shade_color(tri.shade, tri.uvs.is_some());
        let base = out.vertices.len() as u32;
        for corner in 0..3 {
            out.vertices.push(Vertex {
                pos: tri.screen[corner],
                uv: tri.uvs.map_or(WHITE_UV, |uvs| uvs[corner]),
                color,
            });
        }
        out.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    out
}

fn shade_color(shade: f32, textured: bool) -> egui::Color32 {
    let shade = shade.clamp(0.0, 1.0);
    if textured {
        let value = (255.0 * shade) as u8;
        egui::Color32::from_rgb(value, value, value)
    } else {
        egui::Color32::from_rgb(
            (BASE_COLOR[0] * shade) as u8,
            (BASE_COLOR[1] * shade) as u8,
            (BASE_COLOR[2] * shade) as u8,
        )
    }
}
