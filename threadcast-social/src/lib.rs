//! Social network clients used by Threadcast.
//!
//! Only the X/Twitter v2 posting surface is implemented: create a post,
//! reply to a post, and verify the account credentials at startup.
pub mod twitter;
