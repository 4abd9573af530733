pub mod context;
pub mod design;
pub mod exam;
pub mod loaders;
pub mod question;
pub mod taxonomy;

pub use context::{Scope, UserContext};
pub use design::{
    CodeSelection, CurriculumGroup, DesignRecord, DesignRequest, DesignResult, DesignStatus,
    GroupKind, PaperRecord, PaperView, RemovalResult, SelectionOutcome, ShortfallInfo,
};
pub use exam::{ExamRecord, ExamStatus, ExamUpdate, ExamView};
pub use loaders::{load_all_bank_files, load_all_design_requests};
pub use question::{BankFile, BankQuestion, QuestionRecord, QuestionStatus};
pub use taxonomy::{TaxonomyContext, TaxonomyInput, TaxonomyRecord};
