pub mod config;
pub mod logging;
pub mod matchup;
pub mod replay;
pub mod training;
