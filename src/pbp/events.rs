//! Event detection over the free-text description columns.
//!
//! Feeds describe the same event several ways ("Timeout: Regular",
//! "SHOOTING FOUL", "Instant Replay - Challenge"), so detection is plain
//! case-insensitive substring matching against any of the three columns.

pub const TIMEOUT: &[&str] = &["timeout", "20-second timeout", "full timeout"];
pub const CHALLENGE: &[&str] = &["challenge", "coach's challenge", "coaches challenge", "coach challenge"];
pub const REPLAY: &[&str] = &["instant replay", "replay review", "reviewed", "review"];
pub const INSTANT_REPLAY: &[&str] = &["instant replay"];
pub const FOUL: &[&str] = &["foul"];
pub const FREE_THROW: &[&str] = &["free throw"];

// "tip to " catches games whose start marker is missing.
pub const GAME_START: &[&str] = &[
    "start of 1st half",
    "start of 1st period",
    "start of first period",
    "start of game",
    "tip to ",
];
pub const GAME_END: &[&str] = &["end of game", "final", "end of 4th period", "end of 4th quarter"];

pub const END_FIRST_HALF: &[&str] = &["end of 1st half", "end of first half"];
pub const START_SECOND_HALF: &[&str] = &["start of 2nd half", "start of second half"];
pub const END_SECOND_PERIOD: &[&str] = &["end of 2nd period"];
pub const START_THIRD_PERIOD: &[&str] = &["start of 3rd period"];
pub const START_FOURTH: &[&str] = &["start of 4th period", "start of 4th quarter"];
pub const END_FOURTH: &[&str] = &["end of 4th period", "end of 4th quarter", "end of game"];
pub const END_OF_GAME: &str = "end of game";

/// `EVENTMSGTYPE` codes used by the NBA/WNBA stats feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    FreeThrow,
    Foul,
    Timeout,
    PeriodStart,
    PeriodEnd,
}

impl EventType {
    pub fn from_code(code: i64) -> Option<EventType> {
        match code {
            3 => Some(EventType::FreeThrow),
            6 => Some(EventType::Foul),
            9 => Some(EventType::Timeout),
            12 => Some(EventType::PeriodStart),
            13 => Some(EventType::PeriodEnd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

/// "Start of 1st Period", "End of 4th Period", "Start of 5th Period"...
pub fn period_boundary_text(period: u32, boundary: Boundary) -> String {
    let suffix = match period {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    let kind = match boundary {
        Boundary::Start => "Start",
        Boundary::End => "End",
    };
    format!("{} of {}{} Period", kind, period, suffix)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptions {
    pub home: Option<String>,
    pub neutral: Option<String>,
    pub visitor: Option<String>,
}

impl Descriptions {
    pub fn new(home: Option<&str>, neutral: Option<&str>, visitor: Option<&str>) -> Self {
        Descriptions {
            home: home.map(str::to_lowercase),
            neutral: neutral.map(str::to_lowercase),
            visitor: visitor.map(str::to_lowercase),
        }
    }

    fn texts(&self) -> impl Iterator<Item = &str> {
        [&self.home, &self.neutral, &self.visitor]
            .into_iter()
            .filter_map(|t| t.as_deref())
    }

    pub fn mentions(&self, pattern: &str) -> bool {
        let pattern = pattern.to_lowercase();
        self.texts().any(|t| t.contains(&pattern))
    }

    pub fn mentions_any(&self, patterns: &[&str]) -> bool {
        patterns.iter().any(|p| self.mentions(p))
    }

    /// Only the home and visitor columns, where team actions are logged.
    pub fn team_mentions(&self, pattern: &str) -> bool {
        let pattern = pattern.to_lowercase();
        [&self.home, &self.visitor]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .any(|t| t.contains(&pattern))
    }

    pub fn neutral_mentions(&self, pattern: &str) -> bool {
        let pattern = pattern.to_lowercase();
        self.neutral.as_deref().map_or(false, |t| t.contains(&pattern))
    }
}
