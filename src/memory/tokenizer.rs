//! 分词模块
//!
//! 词法评分使用的简单分词：小写化、非单词字符替换为空白、丢弃长度 ≤ 2 的词。

use std::sync::OnceLock;

use regex::Regex;

/// 非单词字符（保留 Unicode 字母数字与下划线）
static NON_WORD: OnceLock<Regex> = OnceLock::new();

fn non_word() -> &'static Regex {
    NON_WORD.get_or_init(|| Regex::new(r"[^\w\s]").expect("static regex"))
}

/// 最短保留词长（字符数大于该值才保留）
const MIN_TOKEN_CHARS: usize = 2;

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    non_word()
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation_and_short_tokens() {
        let tokens = tokenize("Outage in Dallas caused high latency.");
        assert_eq!(tokens, vec!["outage", "dallas", "caused", "high", "latency"]);
    }

    #[test]
    fn test_tokenize_splits_on_symbols() {
        let tokens = tokenize("packet-loss@core_router   (EU-West)");
        assert_eq!(tokens, vec!["packet", "loss", "core_router", "west"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("a an to of").is_empty());
    }
}
