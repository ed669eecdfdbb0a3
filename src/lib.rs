//! Journal: a small server-rendered blog backed by PostgreSQL.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
