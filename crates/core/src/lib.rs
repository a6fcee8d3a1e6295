//! Core conversion pipeline: chart documents in, renderer-ready slide-deck
//! documents out.

pub mod convert;
pub mod error;
pub mod normalize;
pub mod types;
pub mod validate;

pub use convert::{
    clean_code_value, is_echarts_config, process_code_markers, DocumentShape, SlideConverter,
};
pub use error::{Error, Result};
pub use normalize::{normalize, ForeignValue, RawValue};
pub use types::{Slide, SlideData, SlideDocument, SlideStyle, Widget};
pub use validate::validate;
