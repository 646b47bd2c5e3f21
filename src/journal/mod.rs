pub mod emotions;
pub mod streak;
