//! Wire codec for device lines
//!
//! Each line is a positional array of fields. The canonical encoding is a
//! JSON array; a bare comma-separated rendition of the same fields is also
//! accepted, since some firmware builds emit lines without brackets.
//!
//! Field order:
//! - spectral: `[tag, seq, millis, exposure, gain, temperature, v, rv, b, rb, g, rg, y, ry, o, ro, r, rr]`
//! - ambient:  `[tag, seq, millis, exposure, lux]`
//!
//! The tag selects the field layout: `"A"` is spectral, any other tag is
//! the ambient light sensor. The layout is chosen after tag remapping, so a
//! spectral line with an ambient field count (or vice versa) is a decode
//! failure, not a partial read.

use contracts::{AmbientData, Reading, ReadingPayload, SensorKind, SpectralData, CHANNEL_COUNT};

use crate::error::IngestionError;

/// Tag identifying a spectral frame
pub const SPECTRAL_TAG: &str = "A";

/// Tag used when encoding ambient frames
pub const AMBIENT_TAG: &str = "L";

/// Total field count of a spectral line (tag + 5 scalars + 12 channels)
const SPECTRAL_FIELD_COUNT: usize = 6 + CHANNEL_COUNT;

/// Total field count of an ambient line
const AMBIENT_FIELD_COUNT: usize = 5;

/// A decoded line, before the receipt timestamp is stamped
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Device-side sequence counter
    pub sequence: u64,
    /// Sensor payload
    pub payload: ReadingPayload,
}

impl DecodedFrame {
    pub fn kind(&self) -> SensorKind {
        match self.payload {
            ReadingPayload::Spectral(_) => SensorKind::Spectral,
            ReadingPayload::Ambient(_) => SensorKind::Ambient,
        }
    }
}

/// Decode one wire line
///
/// # Errors
/// Returns [`IngestionError::Decode`] for malformed JSON, non-numeric
/// fields, or a field count that does not match the tagged layout.
pub fn decode(line: &str) -> Result<DecodedFrame, IngestionError> {
    let (tag, fields) = tokenize(line)?;

    let kind = if tag == SPECTRAL_TAG {
        SensorKind::Spectral
    } else {
        SensorKind::Ambient
    };

    let expected = match kind {
        SensorKind::Spectral => SPECTRAL_FIELD_COUNT,
        SensorKind::Ambient => AMBIENT_FIELD_COUNT,
    };
    // fields excludes the tag
    if fields.len() + 1 != expected {
        return Err(IngestionError::decode(format!(
            "{kind:?} frame has {} fields, expected {expected}",
            fields.len() + 1
        )));
    }

    let sequence = as_counter(fields[0], "sequence")?;
    let millis = as_counter(fields[1], "millis")?;

    let payload = match kind {
        SensorKind::Spectral => {
            let mut channels = [0.0; CHANNEL_COUNT];
            channels.copy_from_slice(&fields[5..5 + CHANNEL_COUNT]);
            ReadingPayload::Spectral(SpectralData {
                millis,
                exposure_ms: fields[2],
                gain: fields[3],
                temperature: fields[4],
                channels,
            })
        }
        SensorKind::Ambient => ReadingPayload::Ambient(AmbientData {
            millis,
            exposure_ms: fields[2],
            lux: fields[3],
        }),
    };

    Ok(DecodedFrame { sequence, payload })
}

/// Encode a reading back into its canonical JSON-array line
pub fn encode(reading: &Reading) -> String {
    let mut fields: Vec<serde_json::Value> = Vec::with_capacity(SPECTRAL_FIELD_COUNT);
    match &reading.payload {
        ReadingPayload::Spectral(data) => {
            fields.push(SPECTRAL_TAG.into());
            fields.push(reading.sequence.into());
            fields.push(data.millis.into());
            fields.push(json_number(data.exposure_ms));
            fields.push(json_number(data.gain));
            fields.push(json_number(data.temperature));
            for value in data.channels {
                fields.push(json_number(value));
            }
        }
        ReadingPayload::Ambient(data) => {
            fields.push(AMBIENT_TAG.into());
            fields.push(reading.sequence.into());
            fields.push(data.millis.into());
            fields.push(json_number(data.exposure_ms));
            fields.push(json_number(data.lux));
        }
    }
    // Vec<Value> serialization cannot fail
    serde_json::to_string(&fields).unwrap_or_default()
}

fn json_number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Split a line into tag + numeric fields, accepting JSON array or bare CSV
fn tokenize(line: &str) -> Result<(String, Vec<f64>), IngestionError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::decode("empty line"));
    }

    if trimmed.starts_with('[') {
        tokenize_json(trimmed)
    } else {
        tokenize_csv(trimmed)
    }
}

fn tokenize_json(line: &str) -> Result<(String, Vec<f64>), IngestionError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(line)
        .map_err(|e| IngestionError::decode(format!("invalid JSON array: {e}")))?;

    let mut iter = values.into_iter();
    let tag = match iter.next() {
        Some(serde_json::Value::String(tag)) => tag,
        Some(other) => {
            return Err(IngestionError::decode(format!(
                "first field must be a string tag, got {other}"
            )))
        }
        None => return Err(IngestionError::decode("empty array")),
    };

    let mut fields = Vec::new();
    for value in iter {
        let number = value
            .as_f64()
            .ok_or_else(|| IngestionError::decode(format!("non-numeric field {value}")))?;
        fields.push(number);
    }
    Ok((tag, fields))
}

fn tokenize_csv(line: &str) -> Result<(String, Vec<f64>), IngestionError> {
    let mut tokens = line.split(',').map(str::trim);
    let tag = tokens
        .next()
        .ok_or_else(|| IngestionError::decode("empty line"))?
        .to_string();

    let mut fields = Vec::new();
    for token in tokens {
        let number: f64 = token
            .parse()
            .map_err(|_| IngestionError::decode(format!("non-numeric field '{token}'")))?;
        fields.push(number);
    }
    Ok((tag, fields))
}

fn as_counter(value: f64, name: &str) -> Result<u64, IngestionError> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(IngestionError::decode(format!(
            "{name} must be a non-negative integer, got {value}"
        )));
    }
    Ok(value as u64)
}
