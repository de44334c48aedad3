use serde::{Deserialize, Serialize};

use crate::{error::DomainError, report::PitchReport};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Yaml,
}

pub trait ReportExporter {
    fn export(&self, reports: &[PitchReport], format: ExportFormat)
        -> Result<Vec<u8>, DomainError>;
}

pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn export(
        &self,
        reports: &[PitchReport],
        format: ExportFormat,
    ) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::Json => serde_json::to_vec_pretty(reports)
                .map_err(|err| DomainError::Serialization(err.to_string())),
            other => Err(DomainError::validation(format!(
                "JsonExporter cannot handle {:?}",
                other
            ))),
        }
    }
}

pub struct YamlExporter;

impl ReportExporter for YamlExporter {
    fn export(
        &self,
        reports: &[PitchReport],
        format: ExportFormat,
    ) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::Yaml => serde_yaml::to_string(reports)
                .map(String::into_bytes)
                .map_err(|err| DomainError::Serialization(err.to_string())),
            other => Err(DomainError::validation(format!(
                "YamlExporter cannot handle {:?}",
                other
            ))),
        }
    }
}

/// Picks the exporter matching `format`.
pub fn export_reports(
    reports: &[PitchReport],
    format: ExportFormat,
) -> Result<Vec<u8>, DomainError> {
    match format {
        ExportFormat::Json => JsonExporter.export(reports, format),
        ExportFormat::Yaml => YamlExporter.export(reports, format),
    }
}
