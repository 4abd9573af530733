use rusqlite::Connection;

use crate::error::AppResult;

/// 建表语句集合
///
/// JSON 列（课程配置、题目编码列表、媒体地址）以 TEXT 存储，
/// 由 serde_json 编解码。
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS boards (
    id          INTEGER PRIMARY KEY,
    board_name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS states (
    id          INTEGER PRIMARY KEY,
    state_name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS mediums (
    id           INTEGER PRIMARY KEY,
    medium_code  TEXT NOT NULL UNIQUE,
    medium_name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id            INTEGER PRIMARY KEY,
    subject_code  TEXT NOT NULL UNIQUE,
    subject_name  TEXT NOT NULL,
    standard      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS taxonomy (
    id             INTEGER PRIMARY KEY,
    taxonomy_code  TEXT NOT NULL,
    subject_id     INTEGER NOT NULL REFERENCES subjects(id),
    medium_id      INTEGER NOT NULL REFERENCES mediums(id),
    standard       TEXT NOT NULL,
    chapter_code   TEXT NOT NULL,
    chapter_name   TEXT NOT NULL,
    topic_code     TEXT NOT NULL DEFAULT '',
    topic_name     TEXT NOT NULL DEFAULT '',
    subtopic_code  TEXT NOT NULL DEFAULT '',
    subtopic_name  TEXT NOT NULL DEFAULT '',
    board_id       INTEGER NOT NULL REFERENCES boards(id),
    state_id       INTEGER NOT NULL REFERENCES states(id),
    UNIQUE (chapter_code, topic_code, subtopic_code,
            subject_id, medium_id, standard, board_id, state_id)
);

CREATE TABLE IF NOT EXISTS questions (
    id             INTEGER PRIMARY KEY,
    question_code  TEXT NOT NULL UNIQUE,
    question_text  TEXT NOT NULL,
    option1        TEXT NOT NULL,
    option2        TEXT NOT NULL,
    option3        TEXT NOT NULL,
    option4        TEXT NOT NULL,
    correct_answer TEXT NOT NULL,
    taxonomy_id    INTEGER NOT NULL REFERENCES taxonomy(id),
    taxonomy_code  TEXT NOT NULL,
    is_active      INTEGER NOT NULL DEFAULT 1,
    status         TEXT NOT NULL DEFAULT 'approved',
    subject_id     INTEGER NOT NULL REFERENCES subjects(id),
    medium_id      INTEGER NOT NULL REFERENCES mediums(id),
    board_id       INTEGER NOT NULL REFERENCES boards(id),
    state_id       INTEGER NOT NULL REFERENCES states(id),
    media_urls     TEXT NOT NULL DEFAULT '[]',
    created_at     TEXT
);

CREATE INDEX IF NOT EXISTS idx_questions_taxonomy ON questions (taxonomy_id);
CREATE INDEX IF NOT EXISTS idx_questions_filter
    ON questions (subject_id, medium_id, board_id, state_id, is_active);

CREATE TABLE IF NOT EXISTS question_sequence (
    id                INTEGER PRIMARY KEY,
    last_question_id  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS exams (
    id          INTEGER PRIMARY KEY,
    exam_code   TEXT NOT NULL UNIQUE,
    exam_name   TEXT NOT NULL,
    total_time  INTEGER,
    exam_mode   TEXT,
    status      TEXT NOT NULL DEFAULT 'draft',
    created_by  INTEGER NOT NULL,
    created_at  TEXT,
    updated_at  TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS designs (
    id                    INTEGER PRIMARY KEY,
    design_code           TEXT NOT NULL UNIQUE,
    design_name           TEXT NOT NULL,
    exam_id               INTEGER REFERENCES exams(id),
    subject_id            INTEGER NOT NULL REFERENCES subjects(id),
    medium_id             INTEGER NOT NULL REFERENCES mediums(id),
    board_id              INTEGER REFERENCES boards(id),
    state_id              INTEGER REFERENCES states(id),
    standard              TEXT,
    exam_mode             TEXT,
    total_time            INTEGER NOT NULL,
    total_questions       INTEGER NOT NULL,
    no_of_sets            INTEGER NOT NULL,
    no_of_versions        INTEGER NOT NULL,
    status                TEXT NOT NULL DEFAULT 'draft',
    chapter_topics        TEXT NOT NULL DEFAULT '[]',
    questions_to_exclude  TEXT NOT NULL DEFAULT '[]',
    total_question_codes  TEXT NOT NULL DEFAULT '[]',
    created_by            INTEGER NOT NULL,
    created_at            TEXT,
    updated_at            TEXT,
    is_active             INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS question_papers (
    id               INTEGER PRIMARY KEY,
    paper_code       TEXT NOT NULL UNIQUE,
    design_id        INTEGER NOT NULL REFERENCES designs(id),
    q_codes          TEXT NOT NULL,
    total_questions  INTEGER NOT NULL,
    total_time       INTEGER NOT NULL,
    created_by       INTEGER NOT NULL,
    created_at       TEXT
);

CREATE INDEX IF NOT EXISTS idx_papers_design ON question_papers (design_id);
"#;

/// 初始化数据库结构（可重复执行）
pub fn migrate(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
