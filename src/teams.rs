use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

const TEAMS: [(&str, &str); 30] = [
    ("ATL", "Atlanta Hawks"),
    ("BOS", "Boston Celtics"),
    ("BKN", "Brooklyn Nets"),
    ("CHA", "Charlotte Hornets"),
    ("CHI", "Chicago Bulls"),
    ("CLE", "Cleveland Cavaliers"),
    ("DAL", "Dallas Mavericks"),
    ("DEN", "Denver Nuggets"),
    ("DET", "Detroit Pistons"),
    ("GSW", "Golden State Warriors"),
    ("HOU", "Houston Rockets"),
    ("IND", "Indiana Pacers"),
    ("LAC", "LA Clippers"),
    ("LAL", "Los Angeles Lakers"),
    ("MEM", "Memphis Grizzlies"),
    ("MIA", "Miami Heat"),
    ("MIL", "Milwaukee Bucks"),
    ("MIN", "Minnesota Timberwolves"),
    ("NOP", "New Orleans Pelicans"),
    ("NYK", "New York Knicks"),
    ("OKC", "Oklahoma City Thunder"),
    ("ORL", "Orlando Magic"),
    ("PHI", "Philadelphia 76ers"),
    ("PHX", "Phoenix Suns"),
    ("POR", "Portland Trail Blazers"),
    ("SAC", "Sacramento Kings"),
    ("SAS", "San Antonio Spurs"),
    ("TOR", "Toronto Raptors"),
    ("UTA", "Utah Jazz"),
    ("WAS", "Washington Wizards"),
];

static MATCHUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<away>[A-Z]{3})@(?P<home>[A-Z]{3})$").expect("hardcoded matchup regex is valid")
});

#[must_use]
pub fn team_name(abbreviation: &str) -> Option<&'static str> {
    TEAMS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(abbreviation))
        .map(|(_, name)| *name)
}

/// `AWAY@HOME` as printed in the report's matchup column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    pub away: String,
    pub home: String,
}

impl Matchup {
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let captures = MATCHUP_RE.captures(text.trim())?;
        let away = captures.name("away")?.as_str();
        let home = captures.name("home")?.as_str();
        if team_name(away).is_none() || team_name(home).is_none() {
            return None;
        }
        Some(Self {
            away: away.to_string(),
            home: home.to_string(),
        })
    }

    /// True when `team` is the full name of either side of the game.
    #[must_use]
    pub fn involves_team(&self, team: &str) -> bool {
        [&self.away, &self.home]
            .into_iter()
            .filter_map(|abbr| team_name(abbr))
            .any(|name| name.eq_ignore_ascii_case(team.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Available,
    Probable,
    Questionable,
    Doubtful,
    Out,
}

impl FromStr for Status {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "probable" => Ok(Self::Probable),
            "questionable" => Ok(Self::Questionable),
            "doubtful" => Ok(Self::Doubtful),
            "out" => Ok(Self::Out),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}
