pub mod analyze;
pub mod clear;
pub mod history;
pub mod init;
pub mod latest;
pub mod resume;
pub mod status;
pub mod upload;
pub mod version;
