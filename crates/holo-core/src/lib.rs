//! HoloFrame core: annotation attach and grouped temporal means over
//! cell × trial × time recording tables.

pub mod aggregate;
pub mod annotation;
pub mod augment;
pub mod frame;
pub mod merge;
pub mod normalize;
pub mod volume;

pub use aggregate::aggregate;
pub use annotation::{Annotation, AnnotationUnit};
pub use augment::{attach, distinct_count};
pub use frame::HoloFrame;
pub use merge::merge_unit;
pub use normalize::normalize;
pub use volume::VolumeOptions;
