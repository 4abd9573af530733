//! 试卷组装服务
//!
//! 把选好的编码池按套切块，每套按版本数各自独立洗牌成一份试卷。
//! 同一套的不同版本只是题序不同，用于防作弊的多行版本。

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;

use crate::error::{AppError, AppResult};
use crate::models::design::{OptionView, PaperView, QuestionView};
use crate::models::question::QuestionRecord;
use crate::store::{papers, questions};

/// 试卷编码格式：QP{设计ID:02}S{套:02}V{版本:02}
pub fn paper_code(design_id: i64, set_index: usize, version: usize) -> String {
    format!("QP{:02}S{:02}V{:02}", design_id, set_index, version)
}

/// 组装出的一份试卷（尚未落库）
#[derive(Debug, Clone)]
pub struct AssembledPaper {
    pub paper_code: String,
    pub set_index: usize,
    pub version: usize,
    pub q_codes: Vec<String>,
}

/// 把编码池切成 套数×版本数 份试卷
///
/// 选题方保证池大小恰为 套数×每卷题数；不一致说明上游逻辑出错，
/// 这里直接快速失败而不是静默截断。
pub fn assemble<R: Rng>(
    design_id: i64,
    selected_codes: &[String],
    no_of_sets: usize,
    no_of_versions: usize,
    questions_per_paper: usize,
    rng: &mut R,
) -> AppResult<Vec<AssembledPaper>> {
    let expected = no_of_sets * questions_per_paper;
    if selected_codes.len() != expected {
        return Err(AppError::invariant(format!(
            "选题池大小 {} 与 套数×每卷题数 {} 不一致",
            selected_codes.len(),
            expected
        )));
    }

    let mut assembled = Vec::with_capacity(no_of_sets * no_of_versions);
    for set_index in 1..=no_of_sets {
        let chunk = &selected_codes[(set_index - 1) * questions_per_paper
            ..set_index * questions_per_paper];
        for version in 1..=no_of_versions {
            // 每个版本一次独立的 Fisher-Yates 洗牌
            let mut shuffled = chunk.to_vec();
            shuffled.shuffle(rng);
            assembled.push(AssembledPaper {
                paper_code: paper_code(design_id, set_index, version),
                set_index,
                version,
                q_codes: shuffled,
            });
        }
    }
    Ok(assembled)
}

/// 读回一个设计名下的全部试卷并拼装响应视图
pub fn build_papers_response(
    conn: &Connection,
    design_id: i64,
    include_answers: bool,
) -> AppResult<Vec<PaperView>> {
    let paper_records = papers::list_by_design(conn, design_id)?;

    let mut all_codes: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for paper in &paper_records {
        for code in &paper.q_codes {
            if seen.insert(code.as_str()) {
                all_codes.push(code.clone());
            }
        }
    }
    let question_map = questions::find_many_by_codes(conn, &all_codes)?;

    let mut views = Vec::with_capacity(paper_records.len());
    for paper in &paper_records {
        let qns = paper
            .q_codes
            .iter()
            .filter_map(|code| question_map.get(code))
            .map(|record| question_view(record, include_answers))
            .collect();
        views.push(PaperView {
            id: paper.paper_code.clone(),
            qns,
        });
    }
    Ok(views)
}

const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

fn question_view(record: &QuestionRecord, include_answers: bool) -> QuestionView {
    // 答案归一化："option A" / "a" → "A"
    let correct = record
        .correct_answer
        .trim()
        .split_whitespace()
        .last()
        .unwrap_or("")
        .to_uppercase();

    let options = record
        .options()
        .iter()
        .zip(OPTION_LABELS)
        .map(|(text, label)| OptionView {
            id: label,
            text: (*text).to_string(),
            is_correct: if include_answers {
                Some(label == correct)
            } else {
                None
            },
        })
        .collect();

    QuestionView {
        id: record.question_code.clone(),
        text: record.question_text.clone(),
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn codes(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Q{}", i)).collect()
    }

    #[test]
    fn assemble_produces_sets_times_versions_papers() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = codes(20);
        let papers = assemble(3, &pool, 2, 3, 10, &mut rng).expect("组装应当成功");

        assert_eq!(papers.len(), 6);
        for paper in &papers {
            assert_eq!(paper.q_codes.len(), 10);
        }
        assert_eq!(papers[0].paper_code, "QP03S01V01");
        assert_eq!(papers[5].paper_code, "QP03S02V03");
    }

    #[test]
    fn versions_share_content_but_not_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = codes(10);
        let papers = assemble(1, &pool, 1, 2, 10, &mut rng).expect("组装应当成功");

        let mut a = papers[0].q_codes.clone();
        let mut b = papers[1].q_codes.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b, "同一套的版本必须含有相同的题目");
    }

    #[test]
    fn assemble_rejects_mismatched_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = codes(19);
        let result = assemble(1, &pool, 2, 1, 10, &mut rng);
        assert!(result.is_err(), "池大小不符必须快速失败");
    }
}
