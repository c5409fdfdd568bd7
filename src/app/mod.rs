pub mod init;

pub use init::{init_tracing, make_session};
