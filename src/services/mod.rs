pub mod classifier;
pub mod deterministic_grader;
pub mod equivalence_oracle;
pub mod extraction_service;
pub mod llm_service;
pub mod normalizer;
pub mod number_parser;
pub mod review_writer;

pub use classifier::classify;
pub use deterministic_grader::{effective_tolerance, grade_deterministic};
pub use equivalence_oracle::{EquivalenceOracle, EquivalenceVerdict, LlmEquivalenceOracle};
pub use extraction_service::{AnswerExtractor, LlmExtractionService};
pub use llm_service::LlmService;
pub use normalizer::normalize;
pub use number_parser::parse_number;
pub use review_writer::ReviewWriter;
