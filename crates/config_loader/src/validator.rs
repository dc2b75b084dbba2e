//! Config validation module
//!
//! Validation rules:
//! - sample_count >= 2 (sample stddev needs N-1 > 0)
//! - wavelength within the 380-780 nm visible range (when present)
//! - baud rate in the device-supported whitelist
//! - queue capacities > 0
//! - sink names unique and non-empty
//! - storage paths non-empty

use std::collections::HashSet;

use contracts::{CalibrationBlueprint, CalibrationError};

/// Baud rates the device firmware supports
const SUPPORTED_BAUD: [u32; 2] = [9_600, 115_200];

/// Wavelength bounds (nm) of the reference dataset
const WAVELENGTH_RANGE: std::ops::RangeInclusive<u32> = 380..=780;

/// Validate a CalibrationBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &CalibrationBlueprint) -> Result<(), CalibrationError> {
    validate_device(blueprint)?;
    validate_stats(blueprint)?;
    validate_queues(blueprint)?;
    validate_storage(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_device(blueprint: &CalibrationBlueprint) -> Result<(), CalibrationError> {
    let device = &blueprint.device;

    if device.port.is_empty() {
        return Err(CalibrationError::config_validation(
            "device.port",
            "serial port path cannot be empty",
        ));
    }

    if !SUPPORTED_BAUD.contains(&device.baud) {
        return Err(CalibrationError::config_validation(
            "device.baud",
            format!(
                "baud rate {} not supported (expected one of {:?})",
                device.baud, SUPPORTED_BAUD
            ),
        ));
    }

    Ok(())
}

fn validate_stats(blueprint: &CalibrationBlueprint) -> Result<(), CalibrationError> {
    let stats = &blueprint.stats;

    if stats.sample_count < 2 {
        return Err(CalibrationError::config_validation(
            "stats.sample_count",
            format!(
                "sample_count must be >= 2 for a sample standard deviation, got {}",
                stats.sample_count
            ),
        ));
    }

    if let Some(wavelength) = stats.wavelength_nm {
        if !WAVELENGTH_RANGE.contains(&wavelength) {
            return Err(CalibrationError::config_validation(
                "stats.wavelength_nm",
                format!(
                    "wavelength {} nm outside supported range {}..={} nm",
                    wavelength,
                    WAVELENGTH_RANGE.start(),
                    WAVELENGTH_RANGE.end()
                ),
            ));
        }
    }

    Ok(())
}

fn validate_queues(blueprint: &CalibrationBlueprint) -> Result<(), CalibrationError> {
    if blueprint.queues.capacity == 0 {
        return Err(CalibrationError::config_validation(
            "queues.capacity",
            "queue capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_storage(blueprint: &CalibrationBlueprint) -> Result<(), CalibrationError> {
    let storage = &blueprint.storage;

    if storage.summary_csv.as_os_str().is_empty() {
        return Err(CalibrationError::config_validation(
            "storage.summary_csv",
            "summary CSV path cannot be empty",
        ));
    }

    if storage.samples_csv.as_os_str().is_empty() {
        return Err(CalibrationError::config_validation(
            "storage.samples_csv",
            "samples CSV path cannot be empty",
        ));
    }

    if storage.summary_csv == storage.samples_csv {
        return Err(CalibrationError::config_validation(
            "storage.samples_csv",
            "summary and per-sample CSV must be different files",
        ));
    }

    Ok(())
}

fn validate_sinks(blueprint: &CalibrationBlueprint) -> Result<(), CalibrationError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(CalibrationError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(CalibrationError::config_validation(
                format!("sinks[{idx}].name"),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(CalibrationError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "sink queue capacity must be > 0",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::CalibrationBlueprint;

    #[test]
    fn test_default_blueprint_is_valid() {
        let bp = CalibrationBlueprint::default();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_rejects_single_sample_window() {
        let mut bp = CalibrationBlueprint::default();
        bp.stats.sample_count = 1;
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("sample_count"));
    }

    #[test]
    fn test_rejects_out_of_range_wavelength() {
        let mut bp = CalibrationBlueprint::default();
        bp.stats.wavelength_nm = Some(1200);
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("wavelength"));
    }

    #[test]
    fn test_rejects_unsupported_baud() {
        let mut bp = CalibrationBlueprint::default();
        bp.device.baud = 57_600;
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("baud"));
    }

    #[test]
    fn test_rejects_colliding_csv_paths() {
        let mut bp = CalibrationBlueprint::default();
        bp.storage.samples_csv = bp.storage.summary_csv.clone();
        assert!(validate(&bp).is_err());
    }
}
