use std::collections::HashSet;

use exam_paper_gen::error::{AppError, ImmutableError, ValidationError};
use exam_paper_gen::models::design::{
    CodeSelection, CurriculumGroup, DesignRequest, DesignStatus, GroupKind,
};
use exam_paper_gen::models::exam::{ExamStatus, ExamUpdate};
use exam_paper_gen::models::question::{BankFile, BankQuestion, QuestionStatus};
use exam_paper_gen::services::{DesignService, ExamService, QuestionService};
use exam_paper_gen::store::{questions, sequence, taxonomy, Store};
use exam_paper_gen::{Config, UserContext};

// ========== 测试辅助 ==========

fn test_config() -> Config {
    Config {
        rng_seed: Some(42),
        ..Config::default()
    }
}

async fn setup() -> (Store, QuestionService, DesignService) {
    let store = Store::open_in_memory().expect("内存数据库应当可用");
    let question_service = QuestionService::new(store.clone());
    let design_service = DesignService::new(store.clone(), &test_config());
    (store, question_service, design_service)
}

fn bank_question(index: usize, chapter: &str, status: QuestionStatus) -> BankQuestion {
    BankQuestion {
        text: format!("{} 第 {} 题", chapter, index),
        options: vec![
            "选项一".to_string(),
            "选项二".to_string(),
            "选项三".to_string(),
            "选项四".to_string(),
        ],
        correct_answer: "A".to_string(),
        chapter: chapter.to_string(),
        topic: String::new(),
        subtopic: String::new(),
        status,
        media_urls: Vec::new(),
    }
}

fn bank_file(name: &str, chapter: &str, count: usize, status: QuestionStatus) -> BankFile {
    BankFile {
        name: name.to_string(),
        subject_code: "MATH10".to_string(),
        subject_name: "数学".to_string(),
        medium_code: "EN".to_string(),
        medium_name: "English".to_string(),
        board_name: "State Board".to_string(),
        state_name: "Maharashtra".to_string(),
        standard: "10".to_string(),
        questions: (1..=count)
            .map(|i| bank_question(i, chapter, status))
            .collect(),
    }
}

fn chapter_group(code: &str, qn_count: Option<u32>) -> CurriculumGroup {
    CurriculumGroup {
        kind: GroupKind::Chapter,
        codes: vec![CodeSelection {
            code: code.to_string(),
            qn_count,
        }],
    }
}

fn design_request(
    name: &str,
    is_ai_selected: bool,
    status: u8,
    sets: u32,
    versions: u32,
    questions_per_paper: u32,
    groups: Vec<CurriculumGroup>,
) -> DesignRequest {
    DesignRequest {
        exam_name: name.to_string(),
        status,
        is_ai_selected,
        subject_code: "MATH10".to_string(),
        medium_code: "EN".to_string(),
        board_id: Some(1),
        state_id: Some(1),
        exam_mode: Some("offline".to_string()),
        standard: Some("10".to_string()),
        total_time: 90,
        total_questions: questions_per_paper,
        no_of_sets: sets,
        no_of_versions: versions,
        qtn_codes_to_exclude: Vec::new(),
        chapters_topics: groups,
    }
}

fn all_paper_codes(result: &exam_paper_gen::DesignResult) -> Vec<String> {
    result
        .question_papers
        .iter()
        .flat_map(|p| p.qns.iter().map(|q| q.id.clone()))
        .collect()
}

// ========== 场景 A：AI 模式 ==========

#[tokio::test]
async fn ai_mode_draws_exact_total_without_shortfall() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    // 2 套 × 每卷 10 题，池里有 25 道
    let request = design_request("期末卷A", true, 2, 2, 1, 10, vec![chapter_group("C000", None)]);
    let result = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect("AI 选题应当成功");

    assert_eq!(result.status, DesignStatus::Closed);
    assert!(result.shortfall_info.is_empty(), "AI 模式不产生缺口台账");
    assert_eq!(result.question_papers.len(), 2, "2 套 × 1 版本 = 2 份试卷");

    for paper in &result.question_papers {
        assert_eq!(paper.qns.len(), 10, "每份试卷必须恰好 10 题");
    }

    let codes = all_paper_codes(&result);
    let distinct: HashSet<&String> = codes.iter().collect();
    assert_eq!(distinct.len(), 20, "AI 模式抽取 20 个互不相同的编码");

    // 试卷编码格式：QP{设计:02}S{套:02}V{版本:02}
    assert_eq!(result.question_papers[0].id, "QP01S01V01");
    assert_eq!(result.question_papers[1].id, "QP01S02V01");
}

#[tokio::test]
async fn ai_mode_fails_hard_when_pool_is_short() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("小题库", "代数", 15, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("超配卷", true, 2, 2, 1, 10, vec![chapter_group("C000", None)]);
    let err = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect_err("15 道题凑不出 20 道，必须失败");

    match err {
        AppError::Insufficient {
            required,
            available,
        } => {
            assert_eq!(required, 20);
            assert_eq!(available, 15);
        }
        other => panic!("应为 Insufficient，实际 {:?}", other),
    }
}

#[tokio::test]
async fn ai_mode_rejects_entries_with_qn_count() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("非法卷", true, 2, 1, 1, 10, vec![chapter_group("C000", Some(10))]);
    let err = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect_err("AI 模式携带 qn_count 必须被拒绝");

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::QnCountNotAllowed { .. })
    ));
}

#[tokio::test]
async fn excluded_codes_never_appear_in_papers() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let mut request =
        design_request("排除卷", true, 2, 2, 1, 10, vec![chapter_group("C000", None)]);
    request.qtn_codes_to_exclude = vec![
        "Q1".to_string(),
        "Q2".to_string(),
        "Q3".to_string(),
        "Q4".to_string(),
        "Q5".to_string(),
    ];

    let result = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect("剩余 20 道正好够用");

    let codes = all_paper_codes(&result);
    for excluded in &request.qtn_codes_to_exclude {
        assert!(!codes.contains(excluded), "{} 不应入选", excluded);
    }
    let distinct: HashSet<&String> = codes.iter().collect();
    assert_eq!(distinct.len(), 20, "恰好用光剩余的 20 道");
}

// ========== 场景 B / C：手动模式 ==========

#[tokio::test]
async fn manual_mode_repeat_fills_and_records_shortfall() {
    let (store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    // 只有 6 道题的章节，配额 5 × 2 套 = 需要 10
    question_service
        .import_bank_file(&bank_file("几何题库", "几何", 6, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("几何卷", false, 2, 2, 1, 5, vec![chapter_group("C000", Some(5))]);
    let result = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect("重复补齐后应当成功");

    let shortfall = result
        .shortfall_info
        .get("C000")
        .expect("缺口台账必须包含 C000");
    assert_eq!(shortfall.required, 10);
    assert_eq!(shortfall.available, 6);

    // 返回池保留重复：2 份试卷共 10 个条目，其中 6 个唯一
    let codes = all_paper_codes(&result);
    assert_eq!(codes.len(), 10);
    let distinct: HashSet<&String> = codes.iter().collect();
    assert_eq!(distinct.len(), 6);

    // 设计记录的编码全集同样保留重复
    let design = store
        .with_conn(|conn| {
            exam_paper_gen::store::designs::find_by_code_scoped(
                conn,
                &result.exam_code,
                exam_paper_gen::Scope::All,
            )
        })
        .await
        .expect("查询应当成功")
        .expect("设计应当存在");
    assert_eq!(design.total_question_codes.len(), 10);
}

#[tokio::test]
async fn manual_mode_quota_sum_mismatch_rejected_before_selection() {
    let (store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    // Σ qn_count = 8 ≠ 每卷 10 题
    let request = design_request("错配卷", false, 2, 1, 1, 10, vec![chapter_group("C000", Some(8))]);
    let err = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect_err("配额错配必须被拒绝");

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::QuotaSumMismatch {
            sum: 8,
            expected: 10
        })
    ));

    // 校验失败不允许留下任何设计记录
    let leftover = store
        .with_conn(|conn| {
            exam_paper_gen::store::designs::find_by_code_scoped(
                conn,
                "EXM00001",
                exam_paper_gen::Scope::All,
            )
        })
        .await
        .expect("查询应当成功");
    assert!(leftover.is_none(), "失败的创建不应落库");
}

#[tokio::test]
async fn manual_mode_requires_qn_count_on_every_entry() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("缺额卷", false, 2, 1, 1, 10, vec![chapter_group("C000", None)]);
    let err = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect_err("手动模式缺 qn_count 必须被拒绝");

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::QnCountRequired { .. })
    ));
}

// ========== 场景 D：移除题目 ==========

#[tokio::test]
async fn removing_review_question_hard_deletes_bank_record() {
    let (store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("审核题库", "代数", 25, QuestionStatus::Review))
        .await
        .expect("导入应当成功");

    let request = design_request("审核卷", true, 2, 2, 1, 10, vec![chapter_group("C000", None)]);
    let result = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect("创建应当成功");

    let paper_code = result.question_papers[0].id.clone();
    let question_code = result.question_papers[0].qns[0].id.clone();

    let removal = design_service
        .remove_question_from_paper(&result.exam_code, &paper_code, &question_code, &ctx)
        .await
        .expect("移除应当成功");

    assert!(removal.question_deleted, "review 状态的题目必须被硬删除");
    assert_eq!(removal.total_questions_in_paper, 9);
    assert_eq!(removal.total_questions_in_design, 19);

    let deleted = store
        .with_conn(|conn| questions::find_by_code(conn, &question_code))
        .await
        .expect("查询应当成功");
    assert!(deleted.is_none(), "题库记录应当已被删除");
}

#[tokio::test]
async fn removing_approved_question_only_unlinks() {
    let (store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("常规卷", true, 2, 2, 1, 10, vec![chapter_group("C000", None)]);
    let result = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect("创建应当成功");

    let paper_code = result.question_papers[0].id.clone();
    let question_code = result.question_papers[0].qns[0].id.clone();

    let removal = design_service
        .remove_question_from_paper(&result.exam_code, &paper_code, &question_code, &ctx)
        .await
        .expect("移除应当成功");

    assert!(!removal.question_deleted, "approved 题目只解除挂接");
    assert_eq!(removal.total_questions_in_paper, 9);
    assert_eq!(removal.total_questions_in_design, 19);

    let kept = store
        .with_conn(|conn| questions::find_by_code(conn, &question_code))
        .await
        .expect("查询应当成功");
    assert!(kept.is_some(), "题库记录必须原样保留");
}

#[tokio::test]
async fn removing_question_from_foreign_paper_is_rejected() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request_a = design_request("甲卷", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]);
    let result_a = design_service
        .create_design(&request_a, &ctx, None)
        .await
        .expect("创建应当成功");
    let request_b = design_request("乙卷", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]);
    let result_b = design_service
        .create_design(&request_b, &ctx, None)
        .await
        .expect("创建应当成功");

    // 甲设计 + 乙设计的试卷：归属错配
    let foreign_paper = result_b.question_papers[0].id.clone();
    let question_code = result_b.question_papers[0].qns[0].id.clone();
    let err = design_service
        .remove_question_from_paper(&result_a.exam_code, &foreign_paper, &question_code, &ctx)
        .await
        .expect_err("跨设计移题必须被拒绝");

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::PaperNotInDesign { .. })
    ));
}

// ========== 生命周期与不可变性 ==========

#[tokio::test]
async fn closed_design_rejects_update_and_delete() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("定稿卷", true, 2, 2, 1, 10, vec![chapter_group("C000", None)]);
    let result = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect("创建应当成功");

    let update_err = design_service
        .update_design(&result.exam_code, &request, &ctx)
        .await
        .expect_err("定稿设计不可编辑");
    assert!(matches!(
        update_err,
        AppError::Immutable(ImmutableError::DesignClosed { .. })
    ));

    let delete_err = design_service
        .delete_design(&result.exam_code, &ctx)
        .await
        .expect_err("定稿设计不可删除");
    assert!(matches!(
        delete_err,
        AppError::Immutable(ImmutableError::DesignClosed { .. })
    ));
}

#[tokio::test]
async fn draft_design_can_be_finalized_once() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    // 草稿也会生成试卷
    let draft = design_request("草稿卷", true, 1, 2, 1, 10, vec![chapter_group("C000", None)]);
    let created = design_service
        .create_design(&draft, &ctx, None)
        .await
        .expect("草稿创建应当成功");
    assert_eq!(created.status, DesignStatus::Draft);
    assert_eq!(created.question_papers.len(), 2);

    // 草稿 → 定稿：重新选题并整套重建试卷
    let finalize = design_request("草稿卷", true, 2, 2, 2, 10, vec![chapter_group("C000", None)]);
    let finalized = design_service
        .update_design(&created.exam_code, &finalize, &ctx)
        .await
        .expect("定稿应当成功");
    assert_eq!(finalized.status, DesignStatus::Closed);
    assert_eq!(finalized.question_papers.len(), 4, "2 套 × 2 版本");

    // closed 不可回到 draft
    let back_to_draft = design_request("草稿卷", true, 1, 2, 1, 10, vec![chapter_group("C000", None)]);
    let err = design_service
        .update_design(&created.exam_code, &back_to_draft, &ctx)
        .await
        .expect_err("定稿后不可再编辑");
    assert!(matches!(err, AppError::Immutable(_)));
}

#[tokio::test]
async fn draft_design_can_be_deleted() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let draft = design_request("临时卷", true, 1, 1, 1, 10, vec![chapter_group("C000", None)]);
    let created = design_service
        .create_design(&draft, &ctx, None)
        .await
        .expect("草稿创建应当成功");

    design_service
        .delete_design(&created.exam_code, &ctx)
        .await
        .expect("草稿可以删除");

    let err = design_service
        .get_design(&created.exam_code, &ctx)
        .await
        .expect_err("删除后应当查不到");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_design_name_conflicts() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("重名卷", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]);
    design_service
        .create_design(&request, &ctx, None)
        .await
        .expect("第一次创建应当成功");

    let err = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect_err("重名必须冲突");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn scope_hides_designs_from_other_users() {
    let (_store, question_service, design_service) = setup().await;
    let owner = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("私有卷", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]);
    let result = design_service
        .create_design(&request, &owner, None)
        .await
        .expect("创建应当成功");

    // 范围外用户：与不存在不可区分
    let stranger = UserContext::restricted(2);
    let err = design_service
        .get_design(&result.exam_code, &stranger)
        .await
        .expect_err("越权访问应当返回未找到");
    assert!(matches!(err, AppError::NotFound(_)));
}

// ========== 考试容器 ==========

#[tokio::test]
async fn starting_exam_forces_child_designs_closed() {
    let (store, question_service, design_service) = setup().await;
    let exam_service = ExamService::new(store.clone());
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let exam = exam_service
        .create_exam("期中考试", Some(120), None, &ctx)
        .await
        .expect("考试创建应当成功");
    assert_eq!(exam.status, ExamStatus::Draft);
    assert_eq!(exam.exam_code, "EXAM00001");

    let draft = design_request("期中数学", true, 1, 1, 1, 10, vec![chapter_group("C000", None)]);
    let design = design_service
        .create_design(&draft, &ctx, Some(&exam.exam_code))
        .await
        .expect("考试内创建设计应当成功");
    assert_eq!(design.status, DesignStatus::Draft);

    // 考试开始：策略传导，子设计强制定稿
    let update = ExamUpdate {
        status: Some("started".to_string()),
        ..Default::default()
    };
    let started = exam_service
        .update_exam(&exam.exam_code, &update, &ctx)
        .await
        .expect("状态更新应当成功");
    assert_eq!(started.status, ExamStatus::Started);
    assert_eq!(started.total_questions, 10);

    let fetched = design_service
        .get_design(&design.exam_code, &ctx)
        .await
        .expect("查询应当成功");
    assert_eq!(fetched.status, DesignStatus::Closed);

    // 锁定的父级下既不能删子设计，也不能再挂新设计
    let delete_err = design_service
        .delete_design(&design.exam_code, &ctx)
        .await
        .expect_err("已开始的考试下设计不可删除");
    assert!(matches!(delete_err, AppError::Immutable(_)));

    let another = design_request("期中英语", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]);
    let attach_err = design_service
        .create_design(&another, &ctx, Some(&exam.exam_code))
        .await
        .expect_err("已开始的考试不可再挂设计");
    assert!(matches!(
        attach_err,
        AppError::Immutable(ImmutableError::ParentExamLocked { .. })
    ));
}

#[tokio::test]
async fn deleting_exam_cascades_designs_and_papers() {
    let (store, question_service, design_service) = setup().await;
    let exam_service = ExamService::new(store.clone());
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let exam = exam_service
        .create_exam("季度考试", None, None, &ctx)
        .await
        .expect("考试创建应当成功");
    let request = design_request("季度数学", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]);
    let design = design_service
        .create_design(&request, &ctx, Some(&exam.exam_code))
        .await
        .expect("创建应当成功");

    exam_service
        .delete_exam(&exam.exam_code, &ctx)
        .await
        .expect("删除考试应当成功");

    let err = design_service
        .get_design(&design.exam_code, &ctx)
        .await
        .expect_err("级联删除后设计应当不存在");
    assert!(matches!(err, AppError::NotFound(_)));
}

// ========== 编码与序号 ==========

#[tokio::test]
async fn chapter_codes_are_reused_across_import_sessions() {
    let (store, question_service, _design_service) = setup().await;

    question_service
        .import_bank_file(&bank_file("第一批", "代数", 3, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");
    // 同名章节（带多余空白）第二批必须复用同一编码
    let mut second = bank_file("第二批", "  代数  ", 3, QuestionStatus::Approved);
    second.questions.push(bank_question(99, "几何", QuestionStatus::Approved));
    question_service
        .import_bank_file(&second)
        .await
        .expect("导入应当成功");

    let chapter_codes = store
        .with_conn(|conn| taxonomy::distinct_chapter_codes(conn))
        .await
        .expect("查询应当成功");
    let mut sorted = chapter_codes.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["C000".to_string(), "C001".to_string()]);
}

#[tokio::test]
async fn sequence_ids_strictly_increase_and_self_heal() {
    let (store, question_service, _design_service) = setup().await;

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 5, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let first = store
        .with_tx(|conn| sequence::next_question_id(conn))
        .await
        .expect("取号应当成功");
    let second = store
        .with_tx(|conn| sequence::next_question_id(conn))
        .await
        .expect("取号应当成功");

    assert!(first > 5, "序号必须大于已落库的最大题目 id");
    assert!(second > first, "序号必须严格递增");
}

#[tokio::test]
async fn design_codes_are_sequential() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let first = design_service
        .create_design(
            &design_request("卷一", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]),
            &ctx,
            None,
        )
        .await
        .expect("创建应当成功");
    let second = design_service
        .create_design(
            &design_request("卷二", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]),
            &ctx,
            None,
        )
        .await
        .expect("创建应当成功");

    assert_eq!(first.exam_code, "EXM00001");
    assert_eq!(second.exam_code, "EXM00002");
}

// ========== 洗牌与可复现性 ==========

#[tokio::test]
async fn versions_of_a_set_share_content() {
    let (_store, question_service, design_service) = setup().await;
    let ctx = UserContext::admin(1);

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("多版本卷", true, 2, 1, 3, 10, vec![chapter_group("C000", None)]);
    let result = design_service
        .create_design(&request, &ctx, None)
        .await
        .expect("创建应当成功");

    assert_eq!(result.question_papers.len(), 3, "1 套 × 3 版本");
    let mut content_sets = result.question_papers.iter().map(|p| {
        let mut codes: Vec<String> = p.qns.iter().map(|q| q.id.clone()).collect();
        codes.sort();
        codes
    });
    let first = content_sets.next().expect("至少一份试卷");
    assert!(
        content_sets.all(|codes| codes == first),
        "同一套的所有版本必须含有完全相同的题目集合"
    );
}

#[tokio::test]
async fn same_seed_reproduces_identical_papers() {
    let mut runs = Vec::new();
    for _ in 0..2 {
        let (_store, question_service, design_service) = setup().await;
        let ctx = UserContext::admin(1);
        question_service
            .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
            .await
            .expect("导入应当成功");
        let request =
            design_request("复现卷", true, 2, 2, 2, 10, vec![chapter_group("C000", None)]);
        let result = design_service
            .create_design(&request, &ctx, None)
            .await
            .expect("创建应当成功");
        let sequences: Vec<Vec<String>> = result
            .question_papers
            .iter()
            .map(|p| p.qns.iter().map(|q| q.id.clone()).collect())
            .collect();
        runs.push(sequences);
    }
    assert_eq!(runs[0], runs[1], "相同种子必须产生完全相同的试卷序列");
}

// ========== 答案可见性 ==========

#[tokio::test]
async fn answers_hidden_for_restricted_context() {
    let (_store, question_service, design_service) = setup().await;
    let owner = UserContext {
        user_id: 1,
        scope: exam_paper_gen::Scope::All,
        include_answers: false,
    };

    question_service
        .import_bank_file(&bank_file("代数题库", "代数", 25, QuestionStatus::Approved))
        .await
        .expect("导入应当成功");

    let request = design_request("隐藏答案卷", true, 2, 1, 1, 10, vec![chapter_group("C000", None)]);
    let result = design_service
        .create_design(&request, &owner, None)
        .await
        .expect("创建应当成功");

    for paper in &result.question_papers {
        for question in &paper.qns {
            assert_eq!(question.options.len(), 4);
            assert!(
                question.options.iter().all(|o| o.is_correct.is_none()),
                "不含答案的视图不应暴露 is_correct"
            );
        }
    }
}
