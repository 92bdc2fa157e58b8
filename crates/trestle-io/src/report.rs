//! Inspection report model and its file exports.
//!
//! The report carries the last measurement as display text exactly as the
//! viewer shows it; no reformatting happens here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;
use trestle_base::Guid;

pub const DEFAULT_REPORT_STEM: &str = "inspection-report";

const NO_MEASUREMENT: &str = "-";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub component: String,
    pub condition: String,
    #[serde(default)]
    pub remarks: String,
}

impl ReportRow {
    pub fn new(
        component: impl Into<String>,
        condition: impl Into<String>,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            condition: condition.into(),
            remarks: remarks.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InspectionReport {
    #[serde(default)]
    pub id: Guid,
    pub title: String,
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub inspector: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    #[serde(default = "no_measurement")]
    pub measurement: String,
}

fn no_measurement() -> String {
    NO_MEASUREMENT.to_string()
}

impl Default for InspectionReport {
    fn default() -> Self {
        Self::new("Bridge inspection")
    }
}

impl InspectionReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Guid::new(),
            title: title.into(),
            structure: String::new(),
            location: String::new(),
            inspector: String::new(),
            date: String::new(),
            rows: Vec::new(),
            measurement: no_measurement(),
        }
    }

    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Title", self.title.as_str()),
            ("Structure", self.structure.as_str()),
            ("Location", self.location.as_str()),
            ("Inspector", self.inspector.as_str()),
            ("Date", self.date.as_str()),
            ("Last measurement", self.measurement.as_str()),
        ]
    }

    /// File name stem derived from the title, lowercase ASCII with dashes.
    pub fn file_stem(&self) -> String {
        let mut stem = String::new();
        for ch in self.title.trim().chars() {
            if ch.is_ascii_alphanumeric() {
                stem.push(ch.to_ascii_lowercase());
            } else if !stem.ends_with('-') && !stem.is_empty() {
                stem.push('-');
            }
        }
        let stem = stem.trim_end_matches('-');
        if stem.is_empty() {
            DEFAULT_REPORT_STEM.to_string()
        } else {
            stem.to_string()
        }
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str("Field,Value\r\n");
        let _ = write!(out, "Report id,{}\r\n", self.id);
        for (label, value) in self.fields() {
            let _ = write!(out, "{},{}\r\n", csv_field(label), csv_field(value));
        }
        out.push_str("\r\n");
        out.push_str("Component,Condition,Remarks\r\n");
        for row in &self.rows {
            let _ = write!(
                out,
                "{},{},{}\r\n",
                csv_field(&row.component),
                csv_field(&row.condition),
                csv_field(&row.remarks)
            );
        }
        out
    }

    /// HTML flavoured for word processors; saved with a `.doc` extension.
    pub fn to_document(&self) -> String {
        let mut out = String::new();
        out.push_str("<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" ");
        out.push_str("xmlns:w=\"urn:schemas-microsoft-com:office:word\" ");
        out.push_str("xmlns=\"http://www.w3.org/TR/REC-html40\">\n");
        out.push_str("<head><meta charset=\"utf-8\">");
        let _ = write!(out, "<title>{}</title>", html_escape(&self.title));
        out.push_str("</head>\n<body>\n");
        let _ = writeln!(out, "<h1>{}</h1>", html_escape(&self.title));

        out.push_str("<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\n");
        for (label, value) in self.fields().into_iter().skip(1) {
            let _ = writeln!(
                out,
                "<tr><th align=\"left\">{}</th><td>{}</td></tr>",
                html_escape(label),
                html_escape(value)
            );
        }
        out.push_str("</table>\n");

        out.push_str("<h2>Findings</h2>\n");
        if self.rows.is_empty() {
            out.push_str("<p>No findings recorded.</p>\n");
        } else {
            out.push_str("<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\n");
            out.push_str("<tr><th>Component</th><th>Condition</th><th>Remarks</th></tr>\n");
            for row in &self.rows {
                let _ = writeln!(
                    out,
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    html_escape(&row.component),
                    html_escape(&row.condition),
                    html_escape(&row.remarks)
                );
            }
            out.push_str("</table>\n");
        }

        let _ = writeln!(out, "<p><small>Report {}</small></p>", self.id);
        out.push_str("</body>\n</html>\n");
        out
    }
}

#[derive(Clone, Debug)]
pub struct ReportFiles {
    pub csv: PathBuf,
    pub document: PathBuf,
}

pub fn export_csv(report: &InspectionReport, path: impl AsRef<Path>) -> Result<()> {
    write_text(path.as_ref(), &report.to_csv(), "CSV report")
}

pub fn export_document(report: &InspectionReport, path: impl AsRef<Path>) -> Result<()> {
    write_text(path.as_ref(), &report.to_document(), "document report")
}

/// Writes `<stem>.csv` and `<stem>.doc` into `dir`.
pub fn export_report(report: &InspectionReport, dir: impl AsRef<Path>) -> Result<ReportFiles> {
    let dir = dir.as_ref();
    let stem = report.file_stem();
    let files = ReportFiles {
        csv: dir.join(format!("{stem}.csv")),
        document: dir.join(format!("{stem}.doc")),
    };
    export_csv(report, &files.csv)?;
    export_document(report, &files.document)?;
    info!(
        csv = %files.csv.display(),
        document = %files.document.display(),
        "report exported"
    );
    Ok(files)
}

pub fn save_json(report: &InspectionReport, path: impl AsRef<Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(report).context("serialize report")?;
    write_text(path.as_ref(), &text, "report JSON")
}

pub fn load_json(path: impl AsRef<Path>) -> Result<InspectionReport> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read report JSON {}", path.display()))?;
    let report = serde_json::from_str(&text)
        .with_context(|| format!("parse report JSON {}", path.display()))?;
    Ok(report)
}

fn write_text(path: &Path, text: &str, what: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, text).with_context(|| format!("write {what} {}", path.display()))?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
