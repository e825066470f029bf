pub mod detail_enricher;
pub mod listing_extractor;
pub mod question_store;

pub use detail_enricher::{DetailEnricher, DetailParser, Enrichment};
pub use listing_extractor::{ListingExtractor, ListingPage};
pub use question_store::{JsonlSink, QuestionSink};
