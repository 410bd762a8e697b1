pub mod init;
pub mod mock;
