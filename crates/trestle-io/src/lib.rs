pub mod mesh;
pub mod report;
pub mod texture;

pub use mesh::{UpAxis, load_obj, read_obj};
pub use report::{
    DEFAULT_REPORT_STEM, InspectionReport, ReportFiles, ReportRow, export_csv, export_document,
    export_report, load_json, save_json,
};
pub use texture::load_texture;
