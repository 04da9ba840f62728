pub mod assessor;
pub mod extractor;
pub mod response_parser;

pub use assessor::Assessor;
pub use extractor::{Extractor, EXTRACTION_PROMPT};
pub use response_parser::ResponseParser;
