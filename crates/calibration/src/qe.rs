//! Quantum efficiency lookup
//!
//! Reference detector quantum efficiency keyed by integer nanometer. The
//! default table ships embedded in the binary; a file can override it for
//! a different reference detector. A missing wavelength is a per-save
//! error, not a reason to stop an otherwise healthy session.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use contracts::CalibrationError;

/// Embedded reference dataset
const EMBEDDED_TABLE: &str = include_str!("../data/quantum_efficiency.csv");

/// Wavelength (nm) to quantum efficiency table
#[derive(Debug, Clone, Default)]
pub struct QeTable {
    entries: HashMap<u32, f64>,
}

impl QeTable {
    /// Load the embedded reference dataset
    ///
    /// # Errors
    /// Only fails if the embedded dataset is malformed, which a unit test
    /// guards against.
    pub fn embedded() -> Result<Self, CalibrationError> {
        Self::parse(EMBEDDED_TABLE)
    }

    /// Load a table from a CSV file (`wavelength_nm,quantum_efficiency`)
    pub fn from_path(path: &Path) -> Result<Self, CalibrationError> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse(&content)?;
        info!(path = %path.display(), entries = table.len(), "loaded quantum efficiency table");
        Ok(table)
    }

    /// Parse CSV content, skipping blank and `#` comment lines
    pub fn parse(content: &str) -> Result<Self, CalibrationError> {
        let mut entries = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (wavelength, qe) = line.split_once(',').ok_or_else(|| {
                CalibrationError::config_parse(format!(
                    "quantum efficiency line {}: expected 'wavelength,qe'",
                    line_no + 1
                ))
            })?;
            let wavelength: u32 = wavelength.trim().parse().map_err(|_| {
                CalibrationError::config_parse(format!(
                    "quantum efficiency line {}: bad wavelength '{wavelength}'",
                    line_no + 1
                ))
            })?;
            let qe: f64 = qe.trim().parse().map_err(|_| {
                CalibrationError::config_parse(format!(
                    "quantum efficiency line {}: bad value '{qe}'",
                    line_no + 1
                ))
            })?;
            entries.insert(wavelength, qe);
        }
        Ok(Self { entries })
    }

    /// Quantum efficiency at an exact integer wavelength
    pub fn lookup(&self, wavelength_nm: u32) -> Option<f64> {
        self.entries.get(&wavelength_nm).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_parses() {
        let table = QeTable::embedded().unwrap();
        assert!(table.len() > 50);
        // 380..=780 at 5 nm steps
        assert!(table.lookup(380).is_some());
        assert!(table.lookup(525).is_some());
        assert!(table.lookup(780).is_some());
    }

    #[test]
    fn test_lookup_is_exact_integer_match() {
        let table = QeTable::embedded().unwrap();
        assert!(table.lookup(527).is_none());
        assert!(table.lookup(0).is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(QeTable::parse("525;0.5").is_err());
        assert!(QeTable::parse("abc,0.5").is_err());
        assert!(QeTable::parse("525,xyz").is_err());
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let table = QeTable::parse("# header\n\n525,0.54\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(525), Some(0.54));
    }
}
