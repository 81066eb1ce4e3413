use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

const WC_FORMAT: &str = "%I:%M %p";
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const ZONE_TOKENS: [&str; 4] = ["EST", "EDT", "CST", "CDT"];

pub const SECS_PER_DAY: i64 = 24 * 60 * 60;
const HALF_DAY: i64 = SECS_PER_DAY / 2;

/// Time of day taken from a `WCTIMESTRING` cell ("8:24 PM", "10:02 pm EST").
/// The feed only carries minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallClock(NaiveTime);

impl WallClock {
    pub fn parse(raw: &str) -> Option<WallClock> {
        let mut cleaned = raw.trim().to_uppercase();
        if cleaned.is_empty() {
            return None;
        }
        for zone in ZONE_TOKENS {
            cleaned = cleaned.replace(zone, "");
        }
        let cleaned = cleaned.split_whitespace().collect::<Vec<&str>>().join(" ");
        NaiveTime::parse_from_str(&cleaned, WC_FORMAT).ok().map(WallClock)
    }

    /// Seconds since midnight.
    pub fn secs(&self) -> i64 {
        self.0.num_seconds_from_midnight() as i64
    }

    pub fn minutes(&self) -> i64 {
        self.secs() / 60
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%-I:%M %p"))
    }
}

/// `end - start` in seconds. A result more than twelve hours negative is read
/// as the end falling on the next day; smaller negative values are kept.
pub fn signed_delta_secs(start: Option<WallClock>, end: Option<WallClock>) -> Option<i64> {
    let (start, end) = (start?, end?);
    let delta = end.secs() - start.secs();
    if delta < -HALF_DAY {
        Some(delta + SECS_PER_DAY)
    } else {
        Some(delta)
    }
}

/// `end - start` in seconds, rolling the end over midnight whenever it is
/// earlier than the start.
pub fn forward_delta_secs(start: WallClock, end: WallClock) -> i64 {
    let delta = end.secs() - start.secs();
    if delta < 0 {
        delta + SECS_PER_DAY
    } else {
        delta
    }
}

/// Seconds from the earliest to the latest time of a game. Times are placed
/// around the first one, so a game that crosses midnight rolls over once and
/// a row logged a minute early only widens the span by that minute.
pub fn wall_span_secs(times: &[WallClock]) -> Option<i64> {
    let anchor = *times.first()?;
    let offsets = times
        .iter()
        .filter_map(|t| signed_delta_secs(Some(anchor), Some(*t)));
    let (low, high) = offsets.fold((0, 0), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(high - low)
}

/// Full timestamp cell ("2019-06-01 19:00:00", RFC 3339). Offsets are
/// folded into UTC.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
}

/// Wall clock seconds made non-decreasing across a game. Every drop below the
/// previous value adds a day from that row on. Missing values carry the
/// previous value, or stay missing before the first parsed time.
pub fn monotonic_seconds(times: &[Option<WallClock>]) -> Vec<Option<i64>> {
    let mut day_offset = 0;
    let mut prev: Option<i64> = None;
    times
        .iter()
        .map(|t| match t {
            None => prev,
            Some(t) => {
                let mut secs = t.secs() + day_offset;
                if let Some(p) = prev {
                    if secs < p {
                        day_offset += SECS_PER_DAY;
                        secs = t.secs() + day_offset;
                    }
                }
                prev = Some(secs);
                prev
            }
        })
        .collect()
}
