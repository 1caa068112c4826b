//! Coupons

pub mod data;
pub mod decision;
mod errors;
mod issuer;
pub mod records;
pub mod service;
pub mod store;
mod validator;

pub use errors::{CouponsServiceError, FieldError, FieldIssue, IntegrityFault, ValidationErrors};
pub use service::*;
