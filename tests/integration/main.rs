//! Integration tests

mod e2e_test;
mod snapshot_test;
