#![forbid(unsafe_code)]
#![warn(clippy::dbg_macro, clippy::use_debug, clippy::todo)]

pub mod kitchen_race_challenge_responses;
pub mod kitchen_race_challenges;
pub mod kitchen_race_cohouse_members;
pub mod sea_orm_active_enums;
