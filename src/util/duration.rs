// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::{self, Display, Write};
use std::ops::{Add, Mul, Neg};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DURATION_RE: Regex = Regex::new(
        r"(?x)
^
((?P<y>[0-9]+)y)?
((?P<w>[0-9]+)w)?
((?P<d>[0-9]+)d)?
((?P<h>[0-9]+)h)?
((?P<m>[0-9]+)m)?
((?P<s>[0-9]+)s)?
((?P<ms>[0-9]+)ms)?
$",
    )
    .unwrap();
}

const NANOS_PER_MILLI: i64 = 1_000_000;

/// A PromQL duration. Negative values are only legal in `offset` clauses.
///
/// A year is always 365 days and a week always 7 days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct Duration {
    nanos: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { nanos: 0 };
    pub const MILLISECOND: Duration = Duration {
        nanos: NANOS_PER_MILLI,
    };
    pub const SECOND: Duration = Duration {
        nanos: 1_000 * NANOS_PER_MILLI,
    };
    pub const MINUTE: Duration = Duration {
        nanos: 60 * 1_000 * NANOS_PER_MILLI,
    };
    pub const HOUR: Duration = Duration {
        nanos: 60 * 60 * 1_000 * NANOS_PER_MILLI,
    };
    pub const DAY: Duration = Duration {
        nanos: 24 * 60 * 60 * 1_000 * NANOS_PER_MILLI,
    };
    pub const WEEK: Duration = Duration {
        nanos: 7 * 24 * 60 * 60 * 1_000 * NANOS_PER_MILLI,
    };
    pub const YEAR: Duration = Duration {
        nanos: 365 * 24 * 60 * 60 * 1_000 * NANOS_PER_MILLI,
    };

    pub fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self {
            nanos: millis * NANOS_PER_MILLI,
        }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self::from_millis(secs * 1_000)
    }

    pub fn as_nanos(&self) -> i64 {
        self.nanos
    }

    pub fn as_millis(&self) -> i64 {
        self.nanos / NANOS_PER_MILLI
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    pub fn abs(&self) -> Duration {
        Duration {
            nanos: self.nanos.abs(),
        }
    }

    /// Parses a PromQL duration string such as `1h30m` or `4d1h`.
    /// Units must appear at most once each, largest first.
    pub fn parse(ds: &str) -> Result<Duration, String> {
        if ds.is_empty() {
            return Err("empty duration string".into());
        }

        if ds == "0" {
            return Err("duration must be greater than 0".into());
        }

        let caps = match DURATION_RE.captures(ds) {
            Some(caps) => caps,
            None => return Err(format!("not a valid duration string: {ds}")),
        };

        let units = [
            ("y", Duration::YEAR),
            ("w", Duration::WEEK),
            ("d", Duration::DAY),
            ("h", Duration::HOUR),
            ("m", Duration::MINUTE),
            ("s", Duration::SECOND),
            ("ms", Duration::MILLISECOND),
        ];

        let mut nanos: i64 = 0;
        for (name, unit) in units {
            if let Some(cap) = caps.name(name) {
                let v: i64 = cap
                    .as_str()
                    .parse()
                    .map_err(|_| format!("not a valid duration string: {ds}"))?;
                nanos = unit
                    .nanos
                    .checked_mul(v)
                    .and_then(|n| nanos.checked_add(n))
                    .ok_or_else(|| "duration out of range".to_string())?;
            }
        }

        if nanos == 0 {
            return Err("duration must be greater than 0".into());
        }
        Ok(Duration { nanos })
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration { nanos: -self.nanos }
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration {
            nanos: self.nanos + rhs.nanos,
        }
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        Duration {
            nanos: self.nanos * rhs,
        }
    }
}

// Canonical form decomposes greedily into days, hours, minutes, seconds and
// milliseconds. Weeks and years are never emitted, so `2w` prints as `14d`.
impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0s");
        }
        if self.is_negative() {
            write!(f, "-")?;
        }

        let mut ms = self.abs().as_millis();
        let mut s = String::new();
        let mut emit = |unit: &str, mult: i64| {
            let v = ms / mult;
            if v > 0 {
                write!(s, "{v}{unit}").unwrap();
                ms -= v * mult;
            }
        };

        emit("d", 1000 * 60 * 60 * 24);
        emit("h", 1000 * 60 * 60);
        emit("m", 1000 * 60);
        emit("s", 1000);
        emit("ms", 1);

        write!(f, "{s}")
    }
}
