pub mod challenges;
pub mod cohouses;
pub mod leaderboard;
pub mod responses;
