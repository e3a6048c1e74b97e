//! Temporal place inference for records without coordinates.

mod spans;

pub use spans::{PlaceSpan, SpanTable, SpanTableBuilder};
