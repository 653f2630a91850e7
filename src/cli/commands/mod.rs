pub mod init;
pub mod migrate;
pub mod restore;
pub mod scan;
