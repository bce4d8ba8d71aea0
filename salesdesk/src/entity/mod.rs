pub mod dsr;
pub mod profile;
pub mod region;
pub mod sale;
pub mod stock;
pub mod team;
pub mod team_leader;
pub mod user_role;
