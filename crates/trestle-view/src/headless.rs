use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;
use trestle_base::LengthUnit;
use trestle_io::{InspectionReport, export_report, load_json, load_obj};
use trestle_view::measure::{DistanceFormat, MeasureController, RecordOutcome};
use trestle_view::viewer::{Aabb, OrbitCamera, Point2, ProjectionKind, Rect, ViewerMesh, pos2, vec2};

use crate::cli::{HeadlessCommand, InspectArgs, MeasureArgs, ReportArgs};

pub fn run_headless(command: HeadlessCommand) -> Result<()> {
    match command {
        HeadlessCommand::Inspect(args) => inspect(args),
        HeadlessCommand::Measure(args) => measure(args),
        HeadlessCommand::Report(args) => report(args),
    }
}

fn inspect(args: InspectArgs) -> Result<()> {
    let mesh = load_obj(&args.model, args.up_axis.into())?;
    let viewer_mesh = ViewerMesh::from_mesh(&mesh);
    println!("model: {}", args.model.display());
    println!("vertices: {}", viewer_mesh.positions.len());
    println!("triangles: {}", viewer_mesh.triangle_count());
    println!("texture coordinates: {}", if viewer_mesh.has_uvs() { "yes" } else { "no" });
    if let Some(Aabb { min, max }) = viewer_mesh.bounds {
        println!("bounds min: {:.3}, {:.3}, {:.3}", min.x, min.y, min.z);
        println!("bounds max: {:.3}, {:.3}, {:.3}", max.x, max.y, max.z);
    }
    Ok(())
}

fn measure(args: MeasureArgs) -> Result<()> {
    if !(args.width > 0.0 && args.height > 0.0) {
        bail!("--width and --height must be positive");
    }
    let picks = args
        .picks
        .iter()
        .map(|text| parse_pick(text))
        .collect::<Result<Vec<_>>>()?;

    let mesh = load_obj(&args.model, args.up_axis.into())?;
    let viewer_mesh = ViewerMesh::from_mesh(&mesh);
    let viewport = Rect::from_min_size(pos2(0.0, 0.0), vec2(args.width, args.height));
    let format = DistanceFormat::new(args.decimals, LengthUnit::Meter);
    let controller = replay_picks(
        &viewer_mesh,
        args.projection.into(),
        viewport,
        &picks,
        format,
    );

    let text = controller.display_text();
    println!("distance: {text}");

    if let Some(dir) = args.report.as_deref() {
        let mut report = InspectionReport::new(model_title(&args.model));
        report.measurement = text;
        let files = export_report(&report, dir)?;
        println!("CSV exported: {}", files.csv.display());
        println!("Document exported: {}", files.document.display());
    }
    Ok(())
}

fn report(args: ReportArgs) -> Result<()> {
    let mut report = load_json(&args.fields)?;
    if let Some(measurement) = args.measurement {
        report.measurement = measurement;
    }
    let files = export_report(&report, &args.out)?;
    println!("CSV exported: {}", files.csv.display());
    println!("Document exported: {}", files.document.display());
    Ok(())
}

/// Frames the model, arms measurement mode and feeds each press in order.
pub fn replay_picks(
    mesh: &ViewerMesh,
    projection: ProjectionKind,
    viewport: Rect,
    picks: &[Point2],
    format: DistanceFormat,
) -> MeasureController {
    let mut camera = OrbitCamera::new(projection);
    if let Some(bounds) = mesh.bounds {
        camera.fit_bounds(bounds);
    }
    let view = camera.transform(viewport);

    let mut controller = MeasureController::new(format);
    controller.toggle_measurement_mode();
    for (index, pick) in picks.iter().enumerate() {
        let outcome = controller.on_pointer_down(*pick, viewport, &view, Some(mesh));
        let text = controller.display_text();
        match outcome {
            RecordOutcome::Missed => info!(index, x = pick.x, y = pick.y, "pick missed the model"),
            _ => info!(index, ?outcome, distance = %text, "pick replayed"),
        }
    }
    controller
}

fn parse_pick(text: &str) -> Result<Point2> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 2 {
        bail!("--pick expects two comma-separated pixel coordinates, e.g. 640,360");
    }

    let x: f32 = parts[0].trim().parse().context("invalid pick x")?;
    let y: f32 = parts[1].trim().parse().context("invalid pick y")?;
    Ok(pos2(x, y))
}

fn model_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| format!("{} inspection", stem.to_string_lossy()))
        .unwrap_or_else(|| "Bridge inspection".to_string())
}
