//! Machine-readable validation report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use xform_model::{ValidationError, ValidationResult};

const REPORT_SCHEMA: &str = "xform-validator.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct ValidationReportPayload<'a> {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    pub is_valid: bool,
    pub error_count: usize,
    pub errors: &'a [ValidationError],
}

/// Write the validation result as a versioned JSON document.
pub fn write_report_json(path: &Path, result: &ValidationResult) -> Result<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report directory: {}", parent.display()))?;
    }
    let payload = ValidationReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        is_valid: result.is_valid,
        error_count: result.error_count(),
        errors: &result.errors,
    };
    let json = serde_json::to_string_pretty(&payload).context("serialize report")?;
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write report: {}", path.display()))?;
    Ok(path.to_path_buf())
}
