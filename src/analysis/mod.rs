//! Cross-file analysis facts shared by all detectors.

mod context;

pub use context::{
    AnalysisContext, CallInfo, Frequency, LoopBound, LoopFacts, SizeInfo, SizeSource,
};
