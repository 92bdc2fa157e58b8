use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use trestle_io::UpAxis;
use trestle_view::ViewerConfig;
use trestle_view::viewer::ProjectionKind;

#[derive(Parser)]
#[command(name = "trestle-view")]
#[command(about = "Trestle bridge model viewer with surface distance measurement")]
pub struct CliArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Args)]
pub struct ViewArgs {
    /// OBJ model to open at startup.
    #[arg(long)]
    pub model: Option<PathBuf>,
    /// Image applied to the model's texture coordinates.
    #[arg(long)]
    pub texture: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = UpAxisArg::Y)]
    pub up_axis: UpAxisArg,
    #[arg(long, value_enum, default_value_t = ProjectionArg::Perspective)]
    pub projection: ProjectionArg,
    /// Distance precision; values below 2 are raised to 2.
    #[arg(long, default_value_t = 2)]
    pub decimals: usize,
}

impl ViewArgs {
    pub fn to_config(&self) -> ViewerConfig {
        ViewerConfig {
            model: self.model.clone(),
            texture: self.texture.clone(),
            up_axis: self.up_axis.into(),
            projection: self.projection.into(),
            ..ViewerConfig::default()
        }
        .with_decimals(self.decimals)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UpAxisArg {
    Y,
    Z,
}

impl From<UpAxisArg> for UpAxis {
    fn from(value: UpAxisArg) -> Self {
        match value {
            UpAxisArg::Y => UpAxis::Y,
            UpAxisArg::Z => UpAxis::Z,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProjectionArg {
    Perspective,
    Parallel,
}

impl From<ProjectionArg> for ProjectionKind {
    fn from(value: ProjectionArg) -> Self {
        match value {
            ProjectionArg::Perspective => ProjectionKind::Perspective,
            ProjectionArg::Parallel => ProjectionKind::Parallel,
        }
    }
}

#[derive(Subcommand)]
pub enum Mode {
    Headless {
        #[command(subcommand)]
        command: HeadlessCommand,
    },
}

#[derive(Subcommand)]
pub enum HeadlessCommand {
    Inspect(InspectArgs),
    Measure(MeasureArgs),
    Report(ReportArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    #[arg(long)]
    pub model: PathBuf,
    #[arg(long, value_enum, default_value_t = UpAxisArg::Y)]
    pub up_axis: UpAxisArg,
}

#[derive(Args)]
pub struct MeasureArgs {
    #[arg(long)]
    pub model: PathBuf,
    #[arg(long, value_enum, default_value_t = UpAxisArg::Y)]
    pub up_axis: UpAxisArg,
    #[arg(long, value_enum, default_value_t = ProjectionArg::Perspective)]
    pub projection: ProjectionArg,
    /// Screen position as `x,y` in pixels. Repeat for each click.
    #[arg(long = "pick", required = true)]
    pub picks: Vec<String>,
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,
    #[arg(long, default_value_t = 720.0)]
    pub height: f32,
    #[arg(long, default_value_t = 2)]
    pub decimals: usize,
    /// Directory for a CSV and document report of the final measurement.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Report fields and rows as JSON.
    #[arg(long)]
    pub fields: PathBuf,
    #[arg(long)]
    pub out: PathBuf,
    /// Overrides the stored measurement text.
    #[arg(long)]
    pub measurement: Option<String>,
}
