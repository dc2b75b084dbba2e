//! CsvSink - append-only CSV persistence
//!
//! Writes each saved run to two files with a `;` delimiter:
//! - the summary file: one row per run, header written exactly once
//! - the samples file: one row per raw spectral sample of the run
//!
//! Header-once is keyed on file existence, so restarts keep appending to
//! the same files without repeating headers.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use contracts::{CalibrationError, ExportRecord, ExportSink, Reading, CHANNEL_ORDER};

use crate::format;

/// CSV export delimiter
const DELIMITER: u8 = b';';

/// Append-only CSV sink for summary rows and raw samples
pub struct CsvSink {
    name: String,
    summary_path: PathBuf,
    samples_path: PathBuf,
}

impl CsvSink {
    pub fn new(
        name: impl Into<String>,
        summary_path: impl Into<PathBuf>,
        samples_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            summary_path: summary_path.into(),
            samples_path: samples_path.into(),
        }
    }

    /// Build from sink params, falling back to the given storage paths
    pub fn from_params(
        name: &str,
        params: &HashMap<String, String>,
        summary_path: &Path,
        samples_path: &Path,
    ) -> Self {
        let summary = params
            .get("summary_csv")
            .map(PathBuf::from)
            .unwrap_or_else(|| summary_path.to_path_buf());
        let samples = params
            .get("samples_csv")
            .map(PathBuf::from)
            .unwrap_or_else(|| samples_path.to_path_buf());
        Self::new(name, summary, samples)
    }

    fn open_writer(
        &self,
        path: &Path,
    ) -> Result<(csv::Writer<std::fs::File>, bool), CalibrationError> {
        let write_header = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_writer(file);
        Ok((writer, write_header))
    }

    fn append_summary(&self, record: &ExportRecord) -> Result<(), CalibrationError> {
        let (mut writer, write_header) = self.open_writer(&self.summary_path)?;
        if write_header {
            writer
                .write_record(format::summary_header())
                .map_err(|e| CalibrationError::sink_write(&self.name, e.to_string()))?;
        }
        writer
            .write_record(format::summary_row(record))
            .map_err(|e| CalibrationError::sink_write(&self.name, e.to_string()))?;
        writer
            .flush()
            .map_err(|e| CalibrationError::sink_write(&self.name, e.to_string()))?;
        info!(file = %self.summary_path.display(), "CSV file saved");
        Ok(())
    }

    fn append_samples(&self, record: &ExportRecord) -> Result<(), CalibrationError> {
        let (mut writer, write_header) = self.open_writer(&self.samples_path)?;
        if write_header {
            writer
                .write_record(Self::samples_header())
                .map_err(|e| CalibrationError::sink_write(&self.name, e.to_string()))?;
        }
        for reading in &record.raw_samples {
            if let Some(row) = Self::sample_row(reading) {
                writer
                    .write_record(row)
                    .map_err(|e| CalibrationError::sink_write(&self.name, e.to_string()))?;
            }
        }
        writer
            .flush()
            .map_err(|e| CalibrationError::sink_write(&self.name, e.to_string()))?;
        info!(
            file = %self.samples_path.display(),
            samples = record.raw_samples.len(),
            "CSV file saved"
        );
        Ok(())
    }

    fn samples_header() -> Vec<String> {
        let mut columns = vec![
            "tstamp".to_string(),
            "type".to_string(),
            "seq".to_string(),
            "millis".to_string(),
            "exptime".to_string(),
            "gain".to_string(),
            "temp".to_string(),
        ];
        columns.extend(CHANNEL_ORDER.iter().map(|c| c.name().to_string()));
        columns
    }

    fn sample_row(reading: &Reading) -> Option<Vec<String>> {
        let data = reading.spectral()?;
        let mut row = vec![
            format::format_timestamp(reading.timestamp),
            "AS7262".to_string(),
            reading.sequence.to_string(),
            data.millis.to_string(),
            format!("{}", data.exposure_ms),
            format!("{}", data.gain),
            format!("{}", data.temperature),
        ];
        row.extend(data.channels.iter().map(|v| format!("{v}")));
        Some(row)
    }
}

impl ExportSink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "csv_sink_write", skip(self, record), fields(sink = %self.name))]
    async fn write(&mut self, record: &ExportRecord) -> Result<(), CalibrationError> {
        self.append_summary(record)?;
        self.append_samples(record)?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), CalibrationError> {
        // Writers flush per record
        Ok(())
    }

    async fn close(&mut self) -> Result<(), CalibrationError> {
        info!(sink = %self.name, "CsvSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::{ChannelStats, ReadingPayload, SpectralData, StatsReport, CHANNEL_COUNT};

    fn record(samples: usize) -> ExportRecord {
        let raw_samples = (1..=samples as u64)
            .map(|sequence| Reading {
                sequence,
                timestamp: Utc::now(),
                payload: ReadingPayload::Spectral(SpectralData {
                    millis: sequence * 100,
                    exposure_ms: 50.0,
                    gain: 16.0,
                    temperature: 25.0,
                    channels: [3.5; CHANNEL_COUNT],
                }),
            })
            .collect();

        ExportRecord {
            timestamp: Utc::now(),
            report: StatsReport {
                sample_count: samples,
                wavelength_nm: 525,
                exposure_ms: 50.0,
                gain: 16.0,
                channels: CHANNEL_ORDER
                    .iter()
                    .map(|c| {
                        (
                            *c,
                            ChannelStats {
                                mean: 3.5,
                                stddev: 0.0,
                            },
                        )
                    })
                    .collect(),
            },
            photodiode_na: 250.0,
            quantum_efficiency: 0.539,
            raw_samples,
        }
    }

    #[tokio::test]
    async fn test_header_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let samples = dir.path().join("samples.csv");
        let mut sink = CsvSink::new("csv", &summary, &samples);

        sink.write(&record(2)).await.unwrap();
        sink.write(&record(2)).await.unwrap();

        let content = std::fs::read_to_string(&summary).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3, "header + two rows:\n{content}");
        assert!(lines[0].starts_with("Timestamp;# Samples;Wavelength"));
        assert!(lines[1].contains(";525;250;0.539;"));
        assert_eq!(
            content.matches("Timestamp").count(),
            1,
            "header must not repeat"
        );
    }

    #[tokio::test]
    async fn test_samples_file_has_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let samples = dir.path().join("samples.csv");
        let mut sink = CsvSink::new("csv", &summary, &samples);

        sink.write(&record(3)).await.unwrap();

        let content = std::fs::read_to_string(&samples).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4, "header + three samples:\n{content}");
        assert!(lines[0].starts_with("tstamp;type;seq;millis;exptime;gain;temp;violet;raw_violet"));
        assert!(lines[1].contains(";AS7262;1;"));
    }

    #[tokio::test]
    async fn test_uses_semicolon_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let mut sink = CsvSink::new("csv", &summary, dir.path().join("samples.csv"));

        sink.write(&record(1)).await.unwrap();

        let content = std::fs::read_to_string(&summary).unwrap();
        assert!(content.contains(';'));
        assert_eq!(content.lines().next().unwrap().matches(';').count(), 28);
    }
}
