mod result;

pub use result::{Detection, DetectionFrame, PixelBox, RawDetection};
