mod asset;

#[rustfmt::skip]
pub use {
    asset::Asset,
};
