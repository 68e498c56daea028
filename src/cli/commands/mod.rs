pub mod check_db;
pub mod migrate;
pub mod serve;
pub mod token;
