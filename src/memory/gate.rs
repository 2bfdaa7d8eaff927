//! 检索闸门：决定一次查询是否值得支付评分成本
//!
//! 默认实现是固定的关键词白名单；可替换为任意 RetrievalGate 而不改变 ContextStore 的对外契约。

/// 默认关键词白名单（大小写不敏感的子串匹配）
pub const DEFAULT_RETRIEVAL_KEYWORDS: &[&str] = &[
    "outage",
    "incident",
    "history",
    "historical",
    "previous",
    "past",
    "pattern",
    "similar",
    "trend",
    "latency",
    "packet",
    "failure",
    "degradation",
    "network",
    "region",
    "customer",
    "complaint",
    "feedback",
    "sentiment",
    "churn",
    "remediation",
    "mitigation",
    "runbook",
];

pub trait RetrievalGate: Send + Sync {
    fn should_retrieve(&self, query: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct KeywordGate {
    keywords: Vec<String>,
}

impl KeywordGate {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordGate {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIEVAL_KEYWORDS.iter().copied())
    }
}

impl RetrievalGate for KeywordGate {
    fn should_retrieve(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.keywords.iter().any(|k| query.contains(k.as_str()))
    }
}

/// 总是检索（测试或离线批处理用）
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetrieve;

impl RetrievalGate for AlwaysRetrieve {
    fn should_retrieve(&self, _query: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_gate_default() {
        let gate = KeywordGate::default();
        assert!(gate.should_retrieve("Dallas OUTAGE pattern"));
        assert!(gate.should_retrieve("what do customers say"));
        assert!(!gate.should_retrieve("hello"));
        assert!(!gate.should_retrieve(""));
    }

    #[test]
    fn test_keyword_gate_custom_list() {
        let gate = KeywordGate::new(["  Billing ", ""]);
        assert_eq!(gate.keywords(), &["billing".to_string()]);
        assert!(gate.should_retrieve("billing dispute"));
        assert!(!gate.should_retrieve("network outage"));
    }
}
