//! `workspace-licenses` — collect the third-party dependencies reachable from a
//! project's workspaces and audit their licenses.
//!
//! # Flow
//! 1. Load the resolved project graph ([`graph::snapshot`]).
//! 2. Collect reachable external packages ([`graph::collector`]).
//! 3. Look up license metadata per package with bounded concurrency
//!    ([`metadata`], [`fanout`]) and assemble entries ([`entries`]),
//!    canonicalizing repository URLs ([`repository`]).
//! 4. Optionally audit entries against an allow-list ([`license::audit`]).
//! 5. Render the result ([`report`]).

pub mod cli;
pub mod config;
pub mod entries;
pub mod error;
pub mod fanout;
pub mod graph;
pub mod license;
pub mod metadata;
pub mod models;
pub mod report;
pub mod repository;
