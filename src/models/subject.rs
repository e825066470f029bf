use serde::Serialize;

/// 科目（名称 + 站点 slug）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Subject {
    pub name: &'static str,
    pub slug: &'static str,
}

const fn subject(name: &'static str, slug: &'static str) -> Subject {
    Subject { name, slug }
}

/// WAEC 科目目录
static CATALOG: [Subject; 30] = [
    subject("Mathematics", "mathematics"),
    subject("English Language", "english-language"),
    subject("Further Mathematics", "further-mathematics"),
    subject("Chemistry", "chemistry"),
    subject("Physics", "physics"),
    subject("Biology", "biology"),
    subject("Economics", "economics"),
    subject("Government", "government"),
    subject("Civic Education", "civic-education"),
    subject("Literature in English", "literature-in-english"),
    subject("Geography", "geography"),
    subject("History", "history"),
    subject("Agricultural Science", "agricultural-science"),
    subject("Computer Science", "computer-science"),
    subject("Commerce", "commerce"),
    subject("Christian Religious Knowledge", "christian-religious-knowledge"),
    subject("Islamic Religious Knowledge", "islamic-religious-knowledge"),
    subject("Financial Accounting", "financial-accounting"),
    subject("Marketing", "marketing"),
    subject("Technical Drawing", "technical-drawing"),
    subject("Home Economics", "home-economics"),
    subject("Food and Nutrition", "food-and-nutrition"),
    subject("Health Education", "health-education"),
    subject("Physical Education", "physical-education"),
    subject("Auto Mechanics", "auto-mechanics"),
    subject("Data Processing", "data-processing"),
    subject("Building Construction", "building-construction"),
    subject("Catering Craft Practice", "catering-craft-practice"),
    subject("Insurance", "insurance"),
    subject("Office Practice", "office-practice"),
];

impl Subject {
    /// 全部科目（保持展示顺序）
    pub fn catalog() -> &'static [Subject] {
        &CATALOG
    }

    /// 按 slug 精确查找
    pub fn from_slug(slug: &str) -> Option<Self> {
        CATALOG.iter().copied().find(|s| s.slug == slug)
    }

    /// 按名称查找（忽略大小写）
    pub fn find(name: &str) -> Option<Self> {
        let name = name.trim();
        CATALOG
            .iter()
            .copied()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
