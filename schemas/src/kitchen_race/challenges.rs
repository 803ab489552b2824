use chrono::{DateTime, Utc};
use entity::{kitchen_race_challenges, sea_orm_active_enums::KitchenRaceContentType};
use poem_openapi::{Enum, Object, Union};
use uuid::Uuid;

#[derive(Debug, Clone, Object)]
pub struct Challenge {
    /// The unique identifier of the challenge.
    pub id: Uuid,
    /// The title of the challenge.
    pub title: String,
    /// The description of the challenge.
    pub body: String,
    /// The beginning of the active window.
    pub start: DateTime<Utc>,
    /// The end of the active window.
    pub end: DateTime<Utc>,
    /// The content of the challenge. Responses must carry the matching
    /// content variant.
    pub content: ChallengeContent,
    /// The number of points a cohouse earns for a validated response.
    pub points: Option<u64>,
    /// The current state of the challenge, derived from the active window.
    pub state: ChallengeState,
    /// The administrator who created the challenge.
    pub creator: Uuid,
    /// The creation timestamp of the challenge.
    pub creation_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeState {
    NotStarted,
    Ongoing,
    Done,
}

impl ChallengeState {
    /// Derive the state of a challenge from its active window. Both
    /// boundaries are inclusive.
    pub fn of(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now > end {
            Self::Done
        } else if now >= start {
            Self::Ongoing
        } else {
            Self::NotStarted
        }
    }
}

/// The derived views of the challenge list. All views except `ALL` are
/// derived from the responses of one cohouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeFilter {
    /// Every challenge, regardless of responses.
    All,
    /// Ongoing challenges the cohouse has not responded to yet.
    Todo,
    /// Challenges whose response awaits an administrator review.
    Waiting,
    /// Challenges whose response has been validated or invalidated.
    Reviewed,
}

#[derive(Debug, Clone, Union)]
#[oai(discriminator_name = "type", rename_all = "snake_case")]
pub enum ChallengeContent {
    Picture(PictureChallenge),
    MultipleChoice(MultipleChoiceChallenge),
    SingleAnswer(SingleAnswerChallenge),
    NoChoice(NoChoiceChallenge),
}

/// The cohouse answers by uploading a picture.
#[derive(Debug, Clone, Object)]
pub struct PictureChallenge {}

#[derive(Debug, Clone, Object)]
pub struct MultipleChoiceChallenge {
    /// The texts of the possible choices.
    #[oai(validator(min_items = 1, max_items = 32))]
    pub choices: Vec<String>,
    /// Indices into `choices` marking the correct ones. Omitted if the
    /// challenge has no predefined solution.
    pub correct_choices: Option<Vec<u64>>,
    /// Whether clients should present the choices in random order.
    pub shuffle_choices: bool,
}

/// The cohouse answers with a free text.
#[derive(Debug, Clone, Object)]
pub struct SingleAnswerChallenge {}

/// The challenge is completed off-app; the response carries no content.
#[derive(Debug, Clone, Object)]
pub struct NoChoiceChallenge {}

#[derive(Debug, Clone, Object)]
pub struct CreateChallengeRequest {
    /// The title of the challenge.
    #[oai(validator(max_length = 256))]
    pub title: String,
    /// The description of the challenge.
    #[oai(validator(max_length = 4096))]
    pub body: String,
    /// The beginning of the active window.
    pub start: DateTime<Utc>,
    /// The end of the active window. Must not lie before `start`.
    pub end: DateTime<Utc>,
    /// The content of the challenge.
    pub content: ChallengeContent,
    /// The number of points a cohouse earns for a validated response.
    pub points: Option<u64>,
}

impl ChallengeContent {
    pub fn content_type(&self) -> KitchenRaceContentType {
        match self {
            Self::Picture(_) => KitchenRaceContentType::Picture,
            Self::MultipleChoice(_) => KitchenRaceContentType::MultipleChoice,
            Self::SingleAnswer(_) => KitchenRaceContentType::SingleAnswer,
            Self::NoChoice(_) => KitchenRaceContentType::NoChoice,
        }
    }
}

impl Challenge {
    pub fn from(challenge: kitchen_race_challenges::Model, now: DateTime<Utc>) -> Self {
        let start = challenge.start_timestamp.and_utc();
        let end = challenge.end_timestamp.and_utc();
        Self {
            id: challenge.id,
            title: challenge.title,
            body: challenge.body,
            start,
            end,
            content: match challenge.content_type {
                KitchenRaceContentType::Picture => Self::picture_content(),
                KitchenRaceContentType::MultipleChoice => {
                    let choices = challenge.choices.unwrap_or_default();
                    let correct = challenge
                        .correct_choices
                        .map(|mask| decode_choice_set(mask, choices.len()));
                    ChallengeContent::MultipleChoice(MultipleChoiceChallenge {
                        choices,
                        correct_choices: correct,
                        shuffle_choices: challenge.shuffle_choices,
                    })
                }
                KitchenRaceContentType::SingleAnswer => {
                    ChallengeContent::SingleAnswer(SingleAnswerChallenge {})
                }
                KitchenRaceContentType::NoChoice => ChallengeContent::NoChoice(NoChoiceChallenge {}),
            },
            points: challenge.points.map(|x| x as _),
            state: ChallengeState::of(start, end, now),
            creator: challenge.creator,
            creation_timestamp: challenge.creation_timestamp.and_utc(),
        }
    }

    fn picture_content() -> ChallengeContent {
        ChallengeContent::Picture(PictureChallenge {})
    }
}

/// Encode a set of choice indices as a bitmask.
pub fn encode_choice_set(indices: &[u64]) -> i64 {
    indices.iter().fold(0, |acc, &i| acc | (1 << i))
}

/// Decode a choice bitmask into the sorted list of indices below `len`.
pub fn decode_choice_set(mask: i64, len: usize) -> Vec<u64> {
    (0..len.min(63) as u64)
        .filter(|i| mask & (1 << i) != 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_challenge_state() {
        let now = Utc::now();
        let hour = Duration::hours(1);

        assert_eq!(
            ChallengeState::of(now + hour, now + hour * 2, now),
            ChallengeState::NotStarted
        );
        assert_eq!(
            ChallengeState::of(now - hour, now + hour, now),
            ChallengeState::Ongoing
        );
        assert_eq!(
            ChallengeState::of(now - hour * 2, now - hour, now),
            ChallengeState::Done
        );
        // window boundaries are inclusive
        assert_eq!(ChallengeState::of(now, now, now), ChallengeState::Ongoing);
    }

    #[test]
    fn test_encode_choice_set() {
        assert_eq!(encode_choice_set(&[]), 0);
        assert_eq!(encode_choice_set(&[0, 1]), 0b011);
        assert_eq!(encode_choice_set(&[0, 3]), 0b1001);
        assert_eq!(encode_choice_set(&[2]), 0b100);
    }

    #[test]
    fn test_decode_choice_set() {
        assert_eq!(decode_choice_set(0, 4), Vec::<u64>::new());
        assert_eq!(decode_choice_set(0b1001, 4), [0, 3]);
        assert_eq!(decode_choice_set(0b011, 3), [0, 1]);
        // indices past the number of choices are dropped
        assert_eq!(decode_choice_set(0b1100, 2), Vec::<u64>::new());
    }
}
