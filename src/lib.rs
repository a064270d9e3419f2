pub mod error;
pub mod buffer;
pub mod boundary;
pub mod index;
pub mod fill;
pub mod codec;
pub mod writer;
pub mod discovery;
pub mod config;
pub mod logging;
pub mod batch;

pub use buffer::PixelBuffer;
pub use boundary::{detect_seeds, Seed};
pub use error::{PrismError, Result};
pub use fill::{fill_transparent, run, FillReport, FillSettings};
pub use index::{IndexKind, KdTree, LinearIndex, NearestSeed};
