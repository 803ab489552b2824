use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct KitchenRaceConfig {
    pub host: String,
    pub port: u16,
    pub server: Url,
    pub challenges: ChallengeLimits,
    pub responses: ResponseLimits,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeLimits {
    /// Maximum number of choices of a multiple choice challenge.
    pub max_choices: usize,
    /// Maximum number of points a challenge can award.
    pub max_points: u64,
}

#[derive(Debug, Deserialize)]
pub struct ResponseLimits {
    /// Maximum length of a single answer text.
    pub max_answer_length: usize,
    /// Maximum size of an uploaded picture in bytes.
    pub max_picture_bytes: usize,
}
