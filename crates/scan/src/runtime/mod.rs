//! Runtime: logging bootstrap and the `logscan` entry point.

pub mod boot;
pub mod run;
