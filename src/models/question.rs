use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 答案缺失时写入存储的占位值
pub const ANSWER_SENTINEL: &str = "N/A";
/// 解析缺失时写入存储的占位值
pub const EXPLANATION_SENTINEL: &str = "No explanation";

/// 考试类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExamType {
    #[default]
    Waec,
    Neco,
    Jamb,
}

impl ExamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamType::Waec => "WAEC",
            ExamType::Neco => "NECO",
            ExamType::Jamb => "JAMB",
        }
    }

    /// 不区分大小写解析
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "WAEC" => Some(ExamType::Waec),
            "NECO" => Some(ExamType::Neco),
            "JAMB" => Some(ExamType::Jamb),
            _ => None,
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 题目类别，每个科目按固定顺序依次抓取
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Objective,
    Theory,
    Practical,
}

impl QuestionCategory {
    /// 抓取顺序
    pub const ALL: [QuestionCategory; 3] = [
        QuestionCategory::Objective,
        QuestionCategory::Theory,
        QuestionCategory::Practical,
    ];

    /// 列表页 question_type 参数值
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionCategory::Objective => "objective",
            QuestionCategory::Theory => "theory",
            QuestionCategory::Practical => "practical",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 列表页上提取出的题目（尚未访问详情页）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionStub {
    pub question: String,
    /// 选项，形如 "A. 3.5"；无标签时为纯文本
    pub options: Vec<String>,
    /// 详情页绝对地址
    pub detail_link: String,
    pub exam_type: ExamType,
    /// 四位年份或 "Unknown"
    pub year: String,
}

/// 详情页提取结果，缺失用 None 表示
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailOutcome {
    pub answer: Option<String>,
    pub explanation: Option<String>,
}

/// 合并详情后的完整题目，逐条保存后即丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedQuestion {
    pub stub: QuestionStub,
    pub detail: DetailOutcome,
    pub subject: String,
    pub category: QuestionCategory,
}

impl EnrichedQuestion {
    pub fn new(
        stub: QuestionStub,
        detail: DetailOutcome,
        subject: impl Into<String>,
        category: QuestionCategory,
    ) -> Self {
        Self {
            stub,
            detail,
            subject: subject.into(),
            category,
        }
    }

    /// 转为存储格式，缺失字段在此处替换为占位值
    pub fn to_stored(&self, scraped_at: DateTime<Utc>) -> StoredQuestion {
        StoredQuestion {
            question: self.stub.question.clone(),
            options: self.stub.options.clone(),
            answer: self
                .detail
                .answer
                .clone()
                .unwrap_or_else(|| ANSWER_SENTINEL.to_string()),
            explanation: self
                .detail
                .explanation
                .clone()
                .unwrap_or_else(|| EXPLANATION_SENTINEL.to_string()),
            exam_type: self.stub.exam_type,
            year: self.stub.year.clone(),
            subject: self.subject.clone(),
            question_type: self.category,
            detail_link: self.stub.detail_link.clone(),
            scraped_at,
        }
    }
}

/// 存储层记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
    pub exam_type: ExamType,
    pub year: String,
    pub subject: String,
    pub question_type: QuestionCategory,
    pub detail_link: String,
    pub scraped_at: DateTime<Utc>,
}
