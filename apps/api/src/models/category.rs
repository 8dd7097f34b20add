use std::fmt;

use serde::{Deserialize, Serialize};

/// Support-program field as classified by the announcement registry.
/// The registry addresses each field by a fixed two-digit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "금융")]
    Finance,
    #[serde(rename = "기술")]
    Technology,
    #[serde(rename = "인력")]
    Workforce,
    #[serde(rename = "수출")]
    Export,
    #[serde(rename = "내수")]
    Domestic,
    #[serde(rename = "창업")]
    Startup,
    #[serde(rename = "경영")]
    Management,
    #[serde(rename = "기타")]
    Other,
}

impl Category {
    /// All categories in registry code order.
    pub const ALL: [Category; 8] = [
        Category::Finance,
        Category::Technology,
        Category::Workforce,
        Category::Export,
        Category::Domestic,
        Category::Startup,
        Category::Management,
        Category::Other,
    ];

    /// Korean display name, also used as the key in snapshot documents.
    pub fn name(self) -> &'static str {
        match self {
            Category::Finance => "금융",
            Category::Technology => "기술",
            Category::Workforce => "인력",
            Category::Export => "수출",
            Category::Domestic => "내수",
            Category::Startup => "창업",
            Category::Management => "경영",
            Category::Other => "기타",
        }
    }

    /// Registry `searchLclasId` code. Note there is no "08".
    pub fn code(self) -> &'static str {
        match self {
            Category::Finance => "01",
            Category::Technology => "02",
            Category::Workforce => "03",
            Category::Export => "04",
            Category::Domestic => "05",
            Category::Startup => "06",
            Category::Management => "07",
            Category::Other => "09",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Registry hashtags sent alongside the category filter on refresh.
    pub fn hashtags(self) -> &'static [&'static str] {
        match self {
            Category::Finance => &["금융", "자금", "융자", "보증"],
            Category::Technology => &["기술", "R&D", "개발", "혁신"],
            Category::Workforce => &["인력", "채용", "교육", "훈련"],
            Category::Export => &["수출", "해외", "글로벌", "무역"],
            Category::Domestic => &["내수", "국내", "판로", "마케팅"],
            Category::Startup => &["창업", "스타트업", "신규", "사업화"],
            Category::Management => &["경영", "관리", "시스템", "품질"],
            Category::Other => &["기타", "일반", "종합"],
        }
    }

    /// Lowercase keywords that mark a free-text message as belonging to this field.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Finance => &["금융", "finance", "핀테크", "fintech"],
            Category::Technology => &["기술", "tech", "ai", "개발", "소프트웨어"],
            Category::Workforce => &["인력", "hr", "채용", "교육"],
            Category::Export => &["수출", "export", "해외", "글로벌"],
            Category::Domestic => &["내수", "domestic", "국내", "판로"],
            Category::Startup => &["창업", "startup", "스타트업", "사업화"],
            Category::Management => &["경영", "management", "컨설팅", "consulting"],
            Category::Other => &["기타", "other", "일반"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
