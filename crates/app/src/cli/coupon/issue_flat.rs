use clap::Args;
use coupons_app::{
    context::AppContext,
    domain::coupons::{CouponsService, data::FlatCouponDraft},
};
use jiff::Timestamp;

use super::describe;

#[derive(Debug, Args)]
pub(crate) struct IssueFlatArgs {
    /// Code customers enter at checkout
    #[arg(long)]
    code: Option<String>,

    /// Smallest cart total the coupon applies to, in minor units
    #[arg(long, allow_negative_numbers = true)]
    minimum_amount: Option<i64>,

    /// Amount taken off the cart, in minor units
    #[arg(long, allow_negative_numbers = true)]
    discount_amount: Option<i64>,

    /// Days the coupon stays valid (0 to 30)
    #[arg(long, allow_negative_numbers = true)]
    validity: Option<i64>,
}

pub(crate) async fn run(ctx: &AppContext, args: IssueFlatArgs) -> Result<(), String> {
    let draft = FlatCouponDraft {
        coupon_code: args.code,
        minimum_amount: args.minimum_amount,
        discount_amount: args.discount_amount,
        validity: args.validity,
    };

    let coupon = ctx
        .coupons
        .issue_flat_coupon(draft, Timestamp::now())
        .await
        .map_err(|error| format!("failed to issue coupon: {}", describe(&error)))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("coupon_code: {}", coupon.coupon_code);
    println!("discount_type: {}", coupon.discount_type);
    println!("minimum_amount: {}", coupon.minimum_amount);
    println!("start_date: {}", coupon.start_date);
    println!("end_date: {}", coupon.end_date);

    Ok(())
}
