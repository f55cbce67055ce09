pub mod init;
pub mod nodes;
pub mod stage;
pub mod status;
pub mod trophy;
pub mod xp;
