use crate::errors::InputError;
use crate::reset::{ResetAction, ResetState};
use crate::scoring::{score_day, DailyInputs, DayScore, DietMistakes};
use crate::stats::Leaderboard;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROSTER: [&str; 5] = ["Theju", "Udaya", "Teju", "Tushara", "Kavya"];

/// One user's scored self-report for one calendar date.
///
/// Built from inputs through [`Record::scored`], so the stored score always
/// comes from the scoring rule. Rows restored from storage keep whatever score
/// was persisted at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub(crate) name: String,
    pub(crate) date: NaiveDate,
    pub(crate) took_break: bool,
    pub(crate) diet_ok: bool,
    pub(crate) workout_ok: bool,
    pub(crate) social_ok: bool,
    pub(crate) diet_penalty: i64,
    pub(crate) score: i64,
}

impl Record {
    pub fn scored(name: impl Into<String>, date: NaiveDate, inputs: &DailyInputs) -> Self {
        let DayScore {
            diet_penalty,
            score,
        } = score_day(inputs);
        Self {
            name: name.into(),
            date,
            took_break: inputs.took_break,
            diet_ok: inputs.diet_ok,
            workout_ok: inputs.workout_ok,
            social_ok: inputs.social_ok,
            diet_penalty,
            score,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn took_break(&self) -> bool {
        self.took_break
    }

    pub fn diet_ok(&self) -> bool {
        self.diet_ok
    }

    pub fn workout_ok(&self) -> bool {
        self.workout_ok
    }

    pub fn social_ok(&self) -> bool {
        self.social_ok
    }

    pub fn diet_penalty(&self) -> i64 {
        self.diet_penalty
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn is_for(&self, name: &str, date: NaiveDate) -> bool {
        self.name == name && self.date == date
    }

    /// Score the current rule would give this record's inputs.
    pub fn rescored(&self) -> i64 {
        let mistakes = DietMistakes::new(self.diet_penalty).unwrap_or_default();
        score_day(&DailyInputs {
            took_break: self.took_break,
            diet_ok: self.diet_ok,
            workout_ok: self.workout_ok,
            social_ok: self.social_ok,
            diet_mistakes: mistakes,
        })
        .score
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

pub fn parse_yes_no(value: &str) -> Option<bool> {
    match value.trim() {
        "Yes" => Some(true),
        "No" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Returns `None` when no usable name is left after trimming.
    pub fn new<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !cleaned.iter().any(|known| known == name) {
                cleaned.push(name.to_string());
            }
        }
        if cleaned.is_empty() {
            None
        } else {
            Some(Self { names: cleaned })
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn resolve(&self, name: &str) -> Result<&str, InputError> {
        let name = name.trim();
        self.names
            .iter()
            .find(|known| known.as_str() == name)
            .map(String::as_str)
            .ok_or_else(|| InputError::UnknownName(name.to_string()))
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            names: DEFAULT_ROSTER.iter().map(|name| name.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRequest {
    pub name: String,
    #[serde(flatten)]
    pub inputs: DailyInputs,
}

/// Dashboard form post. Flags arrive as the literal strings `Yes`/`No`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionForm {
    pub name: String,
    pub diet: String,
    pub workout: String,
    pub social: String,
    #[serde(default)]
    pub took_break: Option<String>,
    #[serde(default)]
    pub diet_mistakes: Option<String>,
}

impl SubmissionForm {
    pub fn into_request(self) -> Result<SubmissionRequest, InputError> {
        let diet_ok = form_flag("diet", &self.diet)?;
        let workout_ok = form_flag("workout", &self.workout)?;
        let social_ok = form_flag("social", &self.social)?;
        let took_break = match self.took_break.as_deref() {
            Some(value) if !value.trim().is_empty() => form_flag("break", value)?,
            _ => false,
        };

        let diet_mistakes = match self.diet_mistakes.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() && !diet_ok => {
                let count = raw
                    .parse::<i64>()
                    .map_err(|_| InputError::InvalidNumber(raw.to_string()))?;
                DietMistakes::new(count)?
            }
            _ => DietMistakes::default(),
        };

        Ok(SubmissionRequest {
            name: self.name,
            inputs: DailyInputs {
                took_break,
                diet_ok,
                workout_ok,
                social_ok,
                diet_mistakes,
            },
        })
    }
}

fn form_flag(field: &'static str, value: &str) -> Result<bool, InputError> {
    parse_yes_no(value).ok_or_else(|| InputError::InvalidFlag {
        field,
        value: value.to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub today: NaiveDate,
    pub entries: Vec<Record>,
    pub daily: Leaderboard,
    pub weekly: Leaderboard,
    pub monthly: Leaderboard,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub action: ResetAction,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub state: ResetState,
    pub cleared: bool,
}
