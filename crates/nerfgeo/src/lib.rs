#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use nerfgeo_lie as lie;

#[doc(inline)]
pub use nerfgeo_scene as scene;
