//! Pure computation: token parsing, extraction, window resolution and
//! classification. Nothing here touches storage.

pub mod classifier;
pub mod extraction;
pub mod token;
pub mod window;

pub use classifier::{classify, summarize};
pub use extraction::{active_planet, extract, extract_topic_numbers};
pub use token::parse_element_number;
pub use window::{DateSequenceResolver, WindowError};
