mod access_level;
mod filter;
mod hash_algo;
mod patch;
mod resource;

#[rustfmt::skip]
pub use {
    access_level::*,
    filter::*,
    hash_algo::*,
    patch::*,
    resource::*,
};
