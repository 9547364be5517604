pub mod export;
pub mod groups;
pub mod init;
pub mod load;
pub mod query;
pub mod student;
pub mod summary;
