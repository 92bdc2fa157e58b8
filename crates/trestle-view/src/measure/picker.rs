use crate::viewer::{Point2, Ray, Rect, Vec3, ViewTransform, ViewerMesh, normalize_device};

/// World-space ray under a screen position, or `None` outside the viewport.
pub fn pick_ray(screen: Point2, viewport: Rect, view: &ViewTransform) -> Option<Ray> {
    let ndc = normalize_device(screen, viewport)?;
    Some(view.ray(ndc))
}

/// Nearest point on `target` under the pointer.
///
/// Only the target surface is tested. An absent or empty target never hits.
pub fn pick(
    screen: Point2,
    viewport: Rect,
    view: &ViewTransform,
    target: Option<&ViewerMesh>,
) -> Option<Vec3> {
    let target = target.filter(|mesh| !mesh.is_empty())?;
    let ray = pick_ray(screen, viewport, view)?;
    target.ray_pick(&ray).map(|hit| hit.point)
}
