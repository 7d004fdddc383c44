//! Integration testing module
//!
//! End-to-end tests for the playlist model and encoder:
//! - Live window behaviour (append, remove, slide, bulk insert)
//! - Encoder output checked against structural validation
//! - Master playlists with shared renditions
