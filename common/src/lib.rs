pub mod req;
pub mod validate;
