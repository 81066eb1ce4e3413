use chrono::Datelike;
use std::fmt::{self, Display};
use std::str::FromStr;

pub enum GameID {
    ID(String),
}

pub enum TeamID {
    ID(i64),
}

pub enum Period {
    P(i8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueID {
    NBA,
    WNBA,
    GLeague,
}

/// `2006-07` for the NBA, a bare year such as `2014` for the WNBA.
pub enum Season {
    S(String),
}

pub struct StartPeriod(pub Period);
pub struct EndPeriod(pub Period);

impl Display for GameID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameID::ID(id) => write!(f, "GameID={}", id),
        }
    }
}

impl Display for TeamID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TeamID::ID(id) => write!(f, "TeamID={}", id),
        }
    }
}

impl Display for StartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Period::P(period_num) => write!(f, "StartPeriod={}", period_num),
        }
    }
}

impl Display for EndPeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Period::P(period_num) => write!(f, "EndPeriod={}", period_num),
        }
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Season::S(season) => write!(f, "Season={}", season),
        }
    }
}

impl LeagueID {
    pub fn code(&self) -> &'static str {
        match self {
            LeagueID::NBA => "00",
            LeagueID::WNBA => "10",
            LeagueID::GLeague => "20",
        }
    }
}

impl Display for LeagueID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LeagueID={}", self.code())
    }
}

impl FromStr for LeagueID {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nba" | "00" => Ok(LeagueID::NBA),
            "wnba" | "10" => Ok(LeagueID::WNBA),
            "gleague" | "g-league" | "20" => Ok(LeagueID::GLeague),
            other => Err(format!("unknown league '{}', use nba, wnba or gleague", other)),
        }
    }
}

impl Default for LeagueID {
    fn default() -> Self {
        LeagueID::NBA
    }
}

impl Season {
    /// The season in progress: `2024-25` from October 2024 on.
    pub fn current() -> Season {
        let today = chrono::Utc::now();
        let start = if today.month() >= 10 { today.year() } else { today.year() - 1 };
        Season::S(format!("{}-{:02}", start, (start + 1) % 100))
    }
}

impl Default for Season {
    fn default() -> Self {
        Season::current()
    }
}

/// `StartPeriod=0&EndPeriod=0` asks for every period.
impl Default for StartPeriod {
    fn default() -> Self {
        StartPeriod(Period::P(0))
    }
}

impl Default for EndPeriod {
    fn default() -> Self {
        EndPeriod(Period::P(0))
    }
}
