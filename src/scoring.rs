use crate::errors::InputError;
use serde::{Deserialize, Serialize};

pub const MIN_DIET_MISTAKES: u8 = 1;
pub const MAX_DIET_MISTAKES: u8 = 10;

/// Number of diet mistakes reported for a day, always within 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DietMistakes(u8);

impl DietMistakes {
    pub fn new(count: i64) -> Result<Self, InputError> {
        if (i64::from(MIN_DIET_MISTAKES)..=i64::from(MAX_DIET_MISTAKES)).contains(&count) {
            Ok(Self(count as u8))
        } else {
            Err(InputError::DietMistakesOutOfRange(count))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for DietMistakes {
    fn default() -> Self {
        Self(MIN_DIET_MISTAKES)
    }
}

/// One day's raw self-report, already decoded to booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDailyInputs")]
pub struct DailyInputs {
    pub took_break: bool,
    pub diet_ok: bool,
    pub workout_ok: bool,
    pub social_ok: bool,
    pub diet_mistakes: DietMistakes,
}

#[derive(Deserialize)]
struct RawDailyInputs {
    took_break: bool,
    diet_ok: bool,
    workout_ok: bool,
    social_ok: bool,
    #[serde(default)]
    diet_mistakes: Option<i64>,
}

// The mistake count only matters, and is only checked, when the diet failed.
impl TryFrom<RawDailyInputs> for DailyInputs {
    type Error = InputError;

    fn try_from(raw: RawDailyInputs) -> Result<Self, Self::Error> {
        let diet_mistakes = match raw.diet_mistakes {
            Some(count) if !raw.diet_ok => DietMistakes::new(count)?,
            _ => DietMistakes::default(),
        };
        Ok(Self {
            took_break: raw.took_break,
            diet_ok: raw.diet_ok,
            workout_ok: raw.workout_ok,
            social_ok: raw.social_ok,
            diet_mistakes,
        })
    }
}

impl DailyInputs {
    /// A break can only be taken on a day without a workout; with a workout
    /// the break flag is dropped.
    pub fn normalized(mut self) -> Self {
        if self.workout_ok {
            self.took_break = false;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScore {
    pub diet_penalty: i64,
    pub score: i64,
}

pub fn score_day(inputs: &DailyInputs) -> DayScore {
    if inputs.took_break {
        return DayScore {
            diet_penalty: 0,
            score: 0,
        };
    }

    let diet_penalty = if inputs.diet_ok {
        1
    } else {
        i64::from(inputs.diet_mistakes.get())
    };

    let mut score = 0;
    score += if inputs.diet_ok { 1 } else { -diet_penalty };
    score += if inputs.workout_ok { 1 } else { -1 };
    // social media never costs points
    score += if inputs.social_ok { 1 } else { 0 };

    DayScore {
        diet_penalty,
        score,
    }
}
