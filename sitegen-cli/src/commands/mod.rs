pub mod clean;
pub mod diff;
pub mod edits;
pub mod extract;
pub mod init;
pub mod stats;
pub mod sync;
