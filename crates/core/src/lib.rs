use serde::{Deserialize, Serialize};

/// Classification bucket for a tracked domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Productive,
    Unproductive,
    Neutral,
    Unknown,
}

impl Category {
    /// Total mapping from a wire label. Labels outside the three known
    /// buckets land in `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "productive" => Self::Productive,
            "unproductive" => Self::Unproductive,
            "neutral" => Self::Neutral,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Productive => "productive",
            Self::Unproductive => "unproductive",
            Self::Neutral => "neutral",
            Self::Unknown => "unknown",
        }
    }
}

/// One attributed slice of time on a domain. Append-only, immutable once
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub domain: String,
    pub time_spent: u64,
    pub category: Category,
    /// RFC 3339 instant; the weekly view matches on its `YYYY-MM-DD` prefix.
    pub timestamp: String,
}

/// Running per-category counters for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSummary {
    pub domain: String,
    /// Classification recorded when the domain was first seen.
    pub category: Category,
    pub productive: u64,
    pub unproductive: u64,
    pub neutral: u64,
    /// Absent in state written before the unknown bucket existed.
    #[serde(default)]
    pub unknown: u64,
    pub total: u64,
}

impl DomainSummary {
    pub fn new(domain: String, category: Category) -> Self {
        Self {
            domain,
            category,
            productive: 0,
            unproductive: 0,
            neutral: 0,
            unknown: 0,
            total: 0,
        }
    }

    /// Increments exactly one category counter plus the running total.
    pub fn add(&mut self, category: Category, seconds: u64) {
        match category {
            Category::Productive => self.productive += seconds,
            Category::Unproductive => self.unproductive += seconds,
            Category::Neutral => self.neutral += seconds,
            Category::Unknown => self.unknown += seconds,
        }
        self.total += seconds;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub productive: u64,
    pub unproductive: u64,
    /// Neutral and unknown merged into one view bucket.
    pub neutral: u64,
    pub total: u64,
    pub productivity_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteStat {
    pub domain: String,
    pub time: u64,
    pub category: Category,
    pub productive: u64,
    pub unproductive: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTrend {
    pub date: String,
    pub productive: u64,
    pub unproductive: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTrend {
    pub days: Vec<DayTrend>,
}

pub const PRODUCTIVE_DOMAINS: &[&str] = &[
    "github.com",
    "stackoverflow.com",
    "leetcode.com",
    "codechef.com",
    "hackerrank.com",
    "coursera.org",
    "udemy.com",
    "udacity.com",
    "edx.org",
    "khanacademy.org",
    "freecodecamp.org",
    "codecademy.com",
    "developer.mozilla.org",
    "docs.python.org",
    "nodejs.org",
    "reactjs.org",
    "vuejs.org",
    "angular.io",
    "w3schools.com",
    "geeksforgeeks.org",
    "medium.com",
    "dev.to",
    "hashnode.dev",
];

pub const UNPRODUCTIVE_DOMAINS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "snapchat.com",
    "tiktok.com",
    "reddit.com",
    "pinterest.com",
    "netflix.com",
    "youtube.com",
    "twitch.tv",
    "discord.com",
    "whatsapp.com",
    "telegram.org",
    "linkedin.com",
];

/// Maps a hostname to its category. The productive list is scanned first,
/// then the unproductive list, each in order, first substring match wins.
/// Substring matching is deliberate so subdomains count; it can also match
/// unrelated domains that contain a listed fragment.
pub fn classify(domain: &str) -> Category {
    if domain.is_empty() {
        return Category::Neutral;
    }
    if PRODUCTIVE_DOMAINS.iter().any(|site| domain.contains(site)) {
        return Category::Productive;
    }
    if UNPRODUCTIVE_DOMAINS.iter().any(|site| domain.contains(site)) {
        return Category::Unproductive;
    }
    Category::Neutral
}
