pub mod init;
pub mod list;
pub mod theme;
pub mod view;
