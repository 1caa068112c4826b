use std::error::Error;

use clap::{Args, Subcommand};
use coupons_app::context::AppContext;

use crate::config::DatabaseConfig;

mod issue_flat;
mod issue_percent;
mod validate;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// Issue a coupon worth a fixed amount
    IssueFlat(issue_flat::IssueFlatArgs),

    /// Issue a coupon worth a capped percentage of the cart
    IssuePercent(issue_percent::IssuePercentArgs),

    /// Check a coupon against a cart total
    Validate(validate::ValidateArgs),
}

pub(crate) async fn run(command: CouponCommand) -> Result<(), String> {
    let ctx = AppContext::from_database_url(&command.database.database_url)
        .await
        .map_err(|error| describe(&error))?;

    match command.command {
        CouponSubcommand::IssueFlat(args) => issue_flat::run(&ctx, args).await,
        CouponSubcommand::IssuePercent(args) => issue_percent::run(&ctx, args).await,
        CouponSubcommand::Validate(args) => validate::run(&ctx, args).await,
    }
}

/// Render an error with its source chain on one line.
fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
