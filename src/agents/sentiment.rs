//! 情感评分 Agent
//!
//! 词典打分（正负词计数，归一到 [-1, 1]），不依赖模型；
//! 可选请求网关生成一句主题摘要，网关失败时降级为由统计生成的描述。

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::types::{
    SentimentDistribution, SentimentItem, SentimentLabel, SentimentReport, SentimentRequest,
};
use crate::agents::ROLE_SENTIMENT;
use crate::core::{Agent, AgentError, RunContext};
use crate::llm::{GenerateRequest, ModelGateway};
use crate::memory::tokenizer::tokenize;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "fast", "happy", "love", "reliable", "stable", "resolved",
    "helpful", "satisfied", "smooth", "improved", "thanks", "quick", "awesome",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "slow", "terrible", "awful", "outage", "down", "angry", "cancel", "unreliable",
    "dropped", "drops", "lag", "laggy", "broken", "frustrated", "worst", "refund", "complaint",
    "unacceptable", "disconnect", "disconnects", "latency", "poor", "hate",
];

/// 判为正/负面的阈值
const LABEL_THRESHOLD: f32 = 0.2;

/// 单条文本打分：(正词数 - 负词数) / (正词数 + 负词数)，无情感词为 0
pub fn score_text(text: &str) -> f32 {
    let tokens = tokenize(text);
    let positive = tokens.iter().filter(|t| POSITIVE_WORDS.contains(&t.as_str())).count() as f32;
    let negative = tokens.iter().filter(|t| NEGATIVE_WORDS.contains(&t.as_str())).count() as f32;
    if positive + negative == 0.0 {
        0.0
    } else {
        (positive - negative) / (positive + negative)
    }
}

pub fn label_for(score: f32) -> SentimentLabel {
    if score > LABEL_THRESHOLD {
        SentimentLabel::Positive
    } else if score < -LABEL_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// 纯统计分析；texts 为空时返回中性报告
pub fn analyze_texts(texts: &[String]) -> SentimentReport {
    let items: Vec<SentimentItem> = texts
        .iter()
        .map(|t| {
            let score = score_text(t);
            SentimentItem {
                text: t.clone(),
                score,
                label: label_for(score),
            }
        })
        .collect();

    let mut distribution = SentimentDistribution::default();
    for item in &items {
        match item.label {
            SentimentLabel::Positive => distribution.positive += 1,
            SentimentLabel::Neutral => distribution.neutral += 1,
            SentimentLabel::Negative => distribution.negative += 1,
        }
    }
    let average_score = if items.is_empty() {
        0.0
    } else {
        items.iter().map(|i| i.score).sum::<f32>() / items.len() as f32
    };
    let overall = label_for(average_score);
    let summary = format!(
        "{} texts: {} positive, {} neutral, {} negative (average {:.2})",
        items.len(),
        distribution.positive,
        distribution.neutral,
        distribution.negative,
        average_score
    );

    SentimentReport {
        average_score,
        overall,
        distribution,
        items,
        summary,
    }
}

pub struct SentimentAgent {
    gateway: Option<Arc<dyn ModelGateway>>,
}

impl SentimentAgent {
    pub fn new() -> Self {
        Self { gateway: None }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn ModelGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }
}

impl Default for SentimentAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for SentimentAgent {
    type Input = SentimentRequest;
    type Output = SentimentReport;

    fn role(&self) -> &str {
        ROLE_SENTIMENT
    }

    async fn execute(&self, input: SentimentRequest, ctx: &mut RunContext) -> Result<SentimentReport, AgentError> {
        if input.texts.is_empty() {
            return Err(AgentError::InvalidInput("no texts to score".to_string()));
        }

        ctx.progress("scoring texts", 20);
        let mut report = analyze_texts(&input.texts);
        ctx.info(report.summary.clone());

        if input.summarize {
            if let Some(gateway) = &self.gateway {
                ctx.progress("summarizing themes", 60);
                let prompt = format!(
                    "Summarize the main customer themes in one sentence:\n{}",
                    input.texts.join("\n")
                );
                match gateway
                    .generate(GenerateRequest::new(prompt).with_temperature(0.2).with_max_tokens(120))
                    .await
                {
                    Ok(resp) if !resp.content.trim().is_empty() => {
                        report.summary = resp.content.trim().to_string();
                    }
                    Ok(_) => ctx.warn("empty theme summary, keeping computed summary"),
                    Err(e) => ctx.warn(format!("theme summary unavailable: {}", e)),
                }
            }
        }

        ctx.progress("sentiment ready", 90);
        Ok(report)
    }
}
