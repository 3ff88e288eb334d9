use std::num::ParseFloatError;
use std::str::FromStr;

/// Number of gauge channels on the instrument. The wire protocol is fixed
/// to this width; lines with any other token count are rejected whole.
pub const CHANNEL_COUNT: usize = 3;

/// Field delimiter between channel values within one message.
pub const FIELD_DELIMITER: char = '\t';

#[derive(Debug, thiserror::Error)]
pub enum RecordParseError {
    #[error("expected {CHANNEL_COUNT} fields, got {found} in {line:?}")]
    Arity { found: usize, line: String },

    #[error("field {token:?} is not a valid number: {source}")]
    Number {
        token: String,
        source: ParseFloatError,
    },
}

/// One parsed 3-channel gauge reading.
///
/// Each field is the distance reading of one channel at one sampling
/// instant. A `Record` is only ever constructed from a line that carried
/// exactly three numeric fields; partial records do not exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub west: f64,
    pub center: f64,
    pub east: f64,
}

impl Record {
    pub fn new(west: f64, center: f64, east: f64) -> Self {
        Self { west, center, east }
    }
}

impl FromStr for Record {
    type Err = RecordParseError;

    /// Parse one framed message into a record.
    ///
    /// The field order on the wire is fixed: west, center, east.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut values = [0.0_f64; CHANNEL_COUNT];
        let mut count = 0;

        for token in line.split(FIELD_DELIMITER) {
            if count < CHANNEL_COUNT {
                values[count] =
                    token
                        .parse::<f64>()
                        .map_err(|source| RecordParseError::Number {
                            token: token.to_string(),
                            source,
                        })?;
            }
            count += 1;
        }

        if count != CHANNEL_COUNT {
            return Err(RecordParseError::Arity {
                found: count,
                line: line.to_string(),
            });
        }

        Ok(Self::new(values[0], values[1], values[2]))
    }
}
