//! Library surface of the CLI crate; kept small so logging setup is
//! reachable from integration tests.

pub mod logging;
