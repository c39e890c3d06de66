//! API Behavior Tests
//!
//! Each module drives one service through the in-memory repositories
//! from `common`, covering the behavior behind the matching route group.

mod auth_tests;
mod comment_tests;
mod reaction_tests;
