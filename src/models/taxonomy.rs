/// 知识分类节点：(章节, 知识点, 子知识点) 挂接到
/// (科目, 授课语言, 年级, 考试局, 邦/州) 上下文。
///
/// 八元组 (chapter_code, topic_code, subtopic_code, subject, medium,
/// standard, board, state) 全局唯一；节点懒创建，本核心从不删除。
#[derive(Debug, Clone)]
pub struct TaxonomyRecord {
    pub id: i64,
    pub taxonomy_code: String,
    pub subject_id: i64,
    pub medium_id: i64,
    pub standard: String,
    pub chapter_code: String,
    pub chapter_name: String,
    pub topic_code: String,
    pub topic_name: String,
    pub subtopic_code: String,
    pub subtopic_name: String,
    pub board_id: i64,
    pub state_id: i64,
}

/// 分类节点解析所需的上下文（全部为已落库的主数据 ID）
#[derive(Debug, Clone, Copy)]
pub struct TaxonomyContext {
    pub subject_id: i64,
    pub medium_id: i64,
    pub board_id: i64,
    pub state_id: i64,
}

/// 分类解析的输入：编码 + 名称（名称可为空，表示复用既有节点的名称）
#[derive(Debug, Clone)]
pub struct TaxonomyInput {
    pub chapter_code: String,
    pub chapter_name: String,
    pub topic_code: String,
    pub topic_name: String,
    pub subtopic_code: String,
    pub subtopic_name: String,
    pub standard: String,
}
