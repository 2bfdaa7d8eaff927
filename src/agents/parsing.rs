//! 模型输出解析：把自由文本映射到固定结构
//!
//! 基于关键词与小节标题的启发式，有损；任何缺失都降级为文档化的默认值，从不报错：
//! - 未提及的区域：status = healthy，note = "No data reported"
//! - 无 Issues 小节：由非 healthy 区域推导，否则为空
//! - 无 Recommendations 小节：DEFAULT_RECOMMENDATION
//! - 无总体状态行：取最差区域状态，否则 healthy
//! - 无摘要段落：DEFAULT_SUMMARY

use std::sync::OnceLock;

use regex::Regex;

use crate::agents::types::{ChurnRisk, HealthAnalysis, HealthStatus, RegionHealth};

pub const NO_DATA_NOTE: &str = "No data reported";
pub const DEFAULT_RECOMMENDATION: &str = "Continue monitoring network health metrics";
pub const DEFAULT_SUMMARY: &str = "No analysis available";

const SUMMARY_MAX_CHARS: usize = 240;

const CRITICAL_TERMS: &[&str] = &["critical", "outage", "down", "severe", "unreachable", "failure"];
const WARNING_TERMS: &[&str] = &[
    "warning",
    "degraded",
    "elevated",
    "high latency",
    "intermittent",
    "congestion",
    "packet loss",
];
const HEALTHY_TERMS: &[&str] = &["healthy", "normal", "stable", "operational", "nominal"];

const ISSUE_HEADERS: &[&str] = &["issues", "issue", "problems", "findings", "concerns"];
const RECOMMENDATION_HEADERS: &[&str] = &["recommendations", "recommendation", "next steps", "actions"];

/// 解析结果与采用默认值的字段
#[derive(Debug, Clone)]
pub struct ParseOutcome<T> {
    pub value: T,
    pub fallbacks: Vec<&'static str>,
}

static LATENCY: OnceLock<Regex> = OnceLock::new();

fn latency_regex() -> &'static Regex {
    LATENCY.get_or_init(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*ms\b").expect("static regex"))
}

/// 按关键词判断状态，critical > warning > healthy；无匹配返回 None
pub fn classify_status(text: &str) -> Option<HealthStatus> {
    let lower = text.to_lowercase();
    let has = |terms: &[&str]| terms.iter().any(|t| contains_word(&lower, t));
    if has(CRITICAL_TERMS) {
        Some(HealthStatus::Critical)
    } else if has(WARNING_TERMS) {
        Some(HealthStatus::Warning)
    } else if has(HEALTHY_TERMS) {
        Some(HealthStatus::Healthy)
    } else {
        None
    }
}

/// 词边界匹配，避免 "download" 命中 "down"
fn contains_word(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(pos, _)| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + term.len()..].chars().next();
        !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
    })
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    let without = trimmed.trim_start_matches(|c: char| c == '-' || c == '*' || c == '•' || c == '+');
    let without = without.trim_start();
    // "1." / "2)" 形式的编号
    let digits = without.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &without[digits..];
        if let Some(r) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return r.trim();
        }
    }
    without.trim()
}

fn is_bullet(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with(['-', '*', '•', '+']) {
        return true;
    }
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && matches!(trimmed[digits..].chars().next(), Some('.') | Some(')'))
}

/// 标题行：去掉 #、*、冒号后以某个关键词开头且足够短
fn header_of(line: &str, headers: &[&str]) -> bool {
    let cleaned = line
        .trim()
        .trim_matches(|c: char| c == '#' || c == '*' || c == ':' || c == ' ')
        .to_lowercase();
    if cleaned.is_empty() || cleaned.chars().count() > 40 {
        return false;
    }
    headers.iter().any(|h| cleaned.starts_with(h))
}

fn is_any_header(line: &str) -> bool {
    header_of(line, ISSUE_HEADERS)
        || header_of(line, RECOMMENDATION_HEADERS)
        || header_of(line, &["summary", "overall", "regions", "region status", "churn"])
}

/// 收集某标题之下的条目，直到下一个标题
pub fn section_items(text: &str, headers: &[&str]) -> Option<Vec<String>> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| header_of(l, headers))?;
    let mut items = Vec::new();
    for line in &lines[start + 1..] {
        if line.trim().is_empty() {
            continue;
        }
        if is_any_header(line) && !is_bullet(line) {
            break;
        }
        let item = strip_bullet(line);
        if !item.is_empty() {
            items.push(item.to_string());
        }
    }
    Some(items)
}

/// 第一段非标题、非条目的正文，截断到 SUMMARY_MAX_CHARS
pub fn first_paragraph(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !is_bullet(l) && !is_any_header(l))
        .map(|l| l.trim_start_matches('#').trim().chars().take(SUMMARY_MAX_CHARS).collect())
}

/// 解析健康分析回复；regions 为需要输出记录的区域（每个区域一条）
pub fn parse_health_report(text: &str, regions: &[String]) -> ParseOutcome<HealthAnalysis> {
    let mut fallbacks = Vec::new();
    let lines: Vec<&str> = text.lines().collect();

    let mut region_records = Vec::with_capacity(regions.len());
    for region in regions {
        let needle = region.to_lowercase();
        let line = lines.iter().find(|l| l.to_lowercase().contains(&needle));
        let record = match line {
            Some(line) => RegionHealth {
                region: region.clone(),
                status: classify_status(line).unwrap_or(HealthStatus::Healthy),
                latency_ms: latency_regex()
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<f32>().ok()),
                note: strip_bullet(line).to_string(),
            },
            None => {
                if !fallbacks.contains(&"regions") {
                    fallbacks.push("regions");
                }
                RegionHealth {
                    region: region.clone(),
                    status: HealthStatus::Healthy,
                    latency_ms: None,
                    note: NO_DATA_NOTE.to_string(),
                }
            }
        };
        region_records.push(record);
    }

    let overall_line = lines
        .iter()
        .find(|l| l.to_lowercase().contains("overall"))
        .and_then(|l| classify_status(l));
    let overall_status = match overall_line {
        Some(s) => s,
        None => {
            fallbacks.push("overall_status");
            region_records
                .iter()
                .map(|r| r.status)
                .max()
                .unwrap_or(HealthStatus::Healthy)
        }
    };

    let issues = match section_items(text, ISSUE_HEADERS) {
        Some(items) => items,
        None => {
            fallbacks.push("issues");
            region_records
                .iter()
                .filter(|r| r.status != HealthStatus::Healthy)
                .map(|r| format!("{}: {}", r.region, r.note))
                .collect()
        }
    };

    let recommendations = match section_items(text, RECOMMENDATION_HEADERS) {
        Some(items) if !items.is_empty() => items,
        _ => {
            fallbacks.push("recommendations");
            vec![DEFAULT_RECOMMENDATION.to_string()]
        }
    };

    let summary = first_paragraph(text).unwrap_or_else(|| {
        fallbacks.push("summary");
        DEFAULT_SUMMARY.to_string()
    });

    ParseOutcome {
        value: HealthAnalysis {
            overall_status,
            regions: region_records,
            issues,
            recommendations,
            summary,
        },
        fallbacks,
    }
}

/// 从回复中读取流失风险等级（"churn" 所在行），无则 None
pub fn parse_churn_risk(text: &str) -> Option<ChurnRisk> {
    let line = text.lines().find(|l| l.to_lowercase().contains("churn"))?;
    let lower = line.to_lowercase();
    if contains_word(&lower, "high") {
        Some(ChurnRisk::High)
    } else if contains_word(&lower, "medium") || contains_word(&lower, "moderate") {
        Some(ChurnRisk::Medium)
    } else if contains_word(&lower, "low") {
        Some(ChurnRisk::Low)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions() -> Vec<String> {
        vec!["Dallas".into(), "Seattle".into(), "Chicago".into()]
    }

    #[test]
    fn test_parse_structured_reply() {
        let reply = "\
Network is under stress in the south.
Overall status: WARNING
- Dallas: degraded, latency 180 ms
- Seattle: stable at 35ms

## Issues
- Congestion on Dallas core routers
- Intermittent packet loss

## Recommendations
1. Reroute traffic via Houston
2) Add capacity to DAL-CORE-2
";
        let out = parse_health_report(reply, &regions());
        let a = out.value;
        assert_eq!(a.overall_status, HealthStatus::Warning);
        assert_eq!(a.summary, "Network is under stress in the south.");
        assert_eq!(a.regions.len(), 3);
        assert_eq!(a.regions[0].status, HealthStatus::Warning);
        assert_eq!(a.regions[0].latency_ms, Some(180.0));
        assert_eq!(a.regions[1].status, HealthStatus::Healthy);
        assert_eq!(a.regions[1].latency_ms, Some(35.0));
        assert_eq!(a.regions[2].note, NO_DATA_NOTE);
        assert_eq!(a.issues, vec!["Congestion on Dallas core routers", "Intermittent packet loss"]);
        assert_eq!(a.recommendations, vec!["Reroute traffic via Houston", "Add capacity to DAL-CORE-2"]);
        assert_eq!(out.fallbacks, vec!["regions"]);
    }

    #[test]
    fn test_parse_garbage_degrades_to_defaults() {
        let out = parse_health_report("", &regions());
        let a = out.value;
        assert_eq!(a.overall_status, HealthStatus::Healthy);
        assert_eq!(a.regions.len(), 3);
        assert!(a.regions.iter().all(|r| r.status == HealthStatus::Healthy && r.note == NO_DATA_NOTE));
        assert!(a.issues.is_empty());
        assert_eq!(a.recommendations, vec![DEFAULT_RECOMMENDATION.to_string()]);
        assert_eq!(a.summary, DEFAULT_SUMMARY);
        assert!(out.fallbacks.contains(&"overall_status"));
        assert!(out.fallbacks.contains(&"summary"));
    }

    #[test]
    fn test_overall_falls_back_to_worst_region_and_derives_issues() {
        let reply = "Chicago has a full outage since 02:00.\nDallas looks normal.";
        let a = parse_health_report(reply, &regions()).value;
        assert_eq!(a.overall_status, HealthStatus::Critical);
        assert_eq!(a.issues, vec!["Chicago: Chicago has a full outage since 02:00.".to_string()]);
    }

    #[test]
    fn test_classify_status_word_boundaries() {
        assert_eq!(classify_status("download speeds nominal"), Some(HealthStatus::Healthy));
        assert_eq!(classify_status("link is DOWN"), Some(HealthStatus::Critical));
        assert_eq!(classify_status("nothing to see"), None);
    }

    #[test]
    fn test_parse_churn_risk() {
        assert_eq!(parse_churn_risk("Churn risk: HIGH"), Some(ChurnRisk::High));
        assert_eq!(parse_churn_risk("summary\nchurn risk is moderate"), Some(ChurnRisk::Medium));
        assert_eq!(parse_churn_risk("no signal"), None);
    }
}
