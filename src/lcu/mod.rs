// League Client Update (LCU) API access

mod client;
mod lockfile;

pub use client::{classify_status, LcuClient, StatusClass};
pub use lockfile::{parse_lockfile, read_lockfile, LcuCredentials};
