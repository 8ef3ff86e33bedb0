mod asset;
mod avatar;
mod user_created;

#[rustfmt::skip]
pub use {
    asset::AssetServiceImpl,
    avatar::DEFAULT_AVATAR,
    user_created::UserCreatedHandler,
};
