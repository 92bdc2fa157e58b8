use anyhow::{Context, Result};
use std::f64::consts::FRAC_PI_2;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;
use trestle_base::Error;
use truck_base::cgmath64::{Matrix4, Rad};
use truck_meshalgo::prelude::*;
use truck_polymesh::{PolygonMesh, Transformed, obj};

/// Up direction of an asset as authored. The viewer world is Z-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpAxis {
    #[default]
    Y,
    Z,
}

impl UpAxis {
    /// Rotation taking the asset into the Z-up world, `(x, y, z) -> (x, -z, y)` for Y-up input.
    pub fn correction(self) -> Option<Matrix4> {
        match self {
            Self::Y => Some(Matrix4::from_angle_x(Rad(FRAC_PI_2))),
            Self::Z => None,
        }
    }
}

pub fn load_obj(path: impl AsRef<Path>, up_axis: UpAxis) -> Result<PolygonMesh> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open OBJ file {}", path.display()))?;
    let mesh = read_obj(BufReader::new(file), up_axis)
        .with_context(|| format!("read OBJ file {}", path.display()))?;
    info!(
        path = %path.display(),
        vertices = mesh.positions().len(),
        faces = mesh.faces().len(),
        "model loaded"
    );
    Ok(mesh)
}

pub fn read_obj<R: Read>(reader: R, up_axis: UpAxis) -> Result<PolygonMesh> {
    let mut mesh = obj::read(reader).context("parse OBJ data")?;
    if mesh.positions().is_empty() || mesh.faces().len() == 0 {
        return Err(Error::EmptyMesh("OBJ data contains no faces".to_string()).into());
    }

    if let Some(matrix) = up_axis.correction() {
        mesh.transform_by(matrix);
    }
    if mesh.normals().is_empty() {
        mesh.add_naive_normals(true);
    }
    mesh.put_together_same_attrs(truck_base::tolerance::TOLERANCE);
    mesh.remove_unused_attrs();
    Ok(mesh)
}
