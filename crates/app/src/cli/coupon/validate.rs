use clap::Args;
use coupons_app::{context::AppContext, domain::coupons::CouponsService};
use jiff::Timestamp;

use super::describe;

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    /// Coupon code to look up
    #[arg(long)]
    code: String,

    /// Cart total in minor units
    #[arg(long, allow_negative_numbers = true)]
    total_amount: i64,
}

pub(crate) async fn run(ctx: &AppContext, args: ValidateArgs) -> Result<(), String> {
    let decision = ctx
        .coupons
        .validate_coupon(&args.code, args.total_amount, Timestamp::now())
        .await
        .map_err(|error| format!("failed to validate coupon: {}", describe(&error)))?;

    println!("valid: {}", decision.is_valid());
    println!("outcome: {}", decision.outcome());
    println!("discount: {}", decision.discount());
    println!("message: {}", decision.message());

    Ok(())
}
