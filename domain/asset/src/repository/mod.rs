mod asset;

#[rustfmt::skip]
pub use {
    asset::AssetRepo,
};
