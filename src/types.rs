use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resolved desired state for the worker slot.
///
/// - `Stop`: no worker should run.
/// - `Active(n)`: a worker should run with throughput argument `n`.
///   `Active(0)` still runs a worker; it is not the same as `Stop`.
///
/// In the speed table a value is written either as `"stop"` or as a signed
/// integer; negative integers mean `Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "RawSpeed", into = "RawSpeed")]
pub enum SpeedValue {
    Stop,
    Active(u32),
}

impl SpeedValue {
    pub fn is_stop(&self) -> bool {
        matches!(self, SpeedValue::Stop)
    }

    /// The argument handed to the worker, or `None` for `Stop`.
    pub fn argument(&self) -> Option<u32> {
        match self {
            SpeedValue::Stop => None,
            SpeedValue::Active(n) => Some(*n),
        }
    }

    fn from_code(code: i64) -> Result<Self, String> {
        if code < 0 {
            return Ok(SpeedValue::Stop);
        }
        u32::try_from(code)
            .map(SpeedValue::Active)
            .map_err(|_| format!("speed {code} is out of range"))
    }
}

impl fmt::Display for SpeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedValue::Stop => write!(f, "stop"),
            SpeedValue::Active(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for SpeedValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stop" | "off" => Ok(SpeedValue::Stop),
            other => {
                let code: i64 = other.parse().map_err(|_| {
                    format!("invalid speed: {other} (expected \"stop\" or an integer)")
                })?;
                SpeedValue::from_code(code)
            }
        }
    }
}

/// Wire form of a speed table entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum RawSpeed {
    Code(i64),
    Name(String),
}

impl TryFrom<RawSpeed> for SpeedValue {
    type Error = String;

    fn try_from(raw: RawSpeed) -> Result<Self, Self::Error> {
        match raw {
            RawSpeed::Code(code) => SpeedValue::from_code(code),
            RawSpeed::Name(name) => name.parse(),
        }
    }
}

impl From<SpeedValue> for RawSpeed {
    fn from(speed: SpeedValue) -> Self {
        match speed {
            SpeedValue::Stop => RawSpeed::Name("stop".to_string()),
            SpeedValue::Active(n) => RawSpeed::Code(i64::from(n)),
        }
    }
}
