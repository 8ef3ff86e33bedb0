mod activity;
mod envelope;
mod user;

#[rustfmt::skip]
pub use {
    activity::*,
    envelope::*,
    user::*,
};
