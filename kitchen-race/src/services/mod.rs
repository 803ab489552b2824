pub mod challenges;
pub mod cohouses;
pub mod filter;
pub mod leaderboard;
pub mod responses;
pub mod watch;
