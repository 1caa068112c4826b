//! Coupons
//!
//! Discount strategies for checkout coupons. Amounts are integer minor units.

pub mod discounts;
