//! The extraction engine: tokens, keyword and flag tables, the arglist
//! state machine, and the message committer.

pub mod accumulator;
pub mod arglist;
pub mod comments;
pub mod committer;
pub mod driver;
pub mod flags;
pub mod keywords;
pub mod session;
pub mod token;
