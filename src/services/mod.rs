pub mod code_service;
pub mod design_service;
pub mod exam_service;
pub mod paper_service;
pub mod question_service;
pub mod selection_service;
pub mod taxonomy_service;

pub use code_service::CodeGenerationSession;
pub use design_service::DesignService;
pub use exam_service::ExamService;
pub use question_service::{ImportStats, QuestionService};
pub use selection_service::SelectionRequest;
