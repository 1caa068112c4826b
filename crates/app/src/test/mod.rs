//! Shared test support.

mod helpers;

pub(crate) use context::{PgTestContext, TestContext};
pub(crate) use db::TestDb;
pub(crate) use helpers::{flat_draft, percent_draft};
