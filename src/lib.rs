pub mod nba;
pub mod pbp;
