pub mod error;
pub mod export;
pub mod post;

pub use error::{Error, Result};
pub use post::{Post, PostSet, RawPost};
