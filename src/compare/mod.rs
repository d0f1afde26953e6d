pub mod codec;
pub mod differ;
pub mod orchestrator;
pub mod scanner;
pub mod types;

pub use codec::{ImageCodec, PixelBuffer, PngCodec};
pub use differ::{PixelDiff, PixelDiffer, Pixelmatch};
pub use orchestrator::{CompareOptions, Comparator, Presence, compare, exit_code, merge};
pub use scanner::list_screenshots;
pub use types::{CompareError, CompareResult};
