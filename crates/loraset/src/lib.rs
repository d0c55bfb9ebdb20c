#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use loraset_dataset as dataset;

#[doc(inline)]
pub use loraset_imgproc as imgproc;

#[doc(inline)]
pub use loraset_text as text;

#[doc(inline)]
pub use loraset_vlm as vlm;
