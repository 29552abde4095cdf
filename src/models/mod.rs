pub mod answer_kind;
pub mod canonical;
pub mod grade;
pub mod loaders;
pub mod sheet;
pub mod submission;

pub use answer_kind::AnswerKind;
pub use canonical::CanonicalAnswer;
pub use grade::{GradeResponse, GradeResult, ReasonCode};
pub use loaders::{load_all_toml_files, load_toml_to_grading_sheet};
pub use sheet::{GradingItem, GradingSheet};
pub use submission::{
    ExtractedAnswer, ExtractionOutcome, Provenance, SubmissionPayload, SubmittedAnswer,
};
