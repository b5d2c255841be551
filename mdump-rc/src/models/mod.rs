//! Data model for the annotation result client

mod history;
mod segment;
mod session;

pub use history::SessionRecord;
pub use segment::{
    RenderDirective, Representation, Segment, SegmentField, SegmentInfo, SENTINEL,
};
pub use session::{AnnotationSession, SessionStatus};
