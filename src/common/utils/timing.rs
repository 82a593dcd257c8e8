use std::time::{Duration, SystemTime};

use crate::Error;

/// Measures how long a resolution step takes, for log lines
#[must_use]
pub struct Timing {
    start: SystemTime,
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

impl Timing {
    /// Start measuring now
    pub fn new() -> Self {
        Self {
            start: SystemTime::now(),
        }
    }

    /// Human readable time since creation, with the coarsest unit that is not zero
    #[inline]
    pub fn elapsed(&self) -> Result<String, Error> {
        Ok(format_duration(self.start.elapsed()?))
    }
}

fn format_duration(time: Duration) -> String {
    if time.as_millis() > 1 {
        format!("{}ms", time.as_millis())
    } else if time.as_micros() > 1 {
        format!("{}μs", time.as_micros())
    } else {
        format!("{}ns", time.as_nanos())
    }
}
