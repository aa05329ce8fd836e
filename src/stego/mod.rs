//! Hidden-object steganography: injection and extraction

mod extractor;
mod injector;

pub use extractor::{HiddenObjectExtractor, OrphanSurvey, RecoveredFile};
pub use injector::{HiddenObjectInjector, InjectionOutcome};

/// Dictionary key marking a hidden text payload
pub(crate) const MARKER_NAME: &str = "Asd";
