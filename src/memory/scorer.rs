//! 词法评分器
//!
//! 用廉价、确定性的词重叠代替真正的向量嵌入：
//! relevance = (查询词在文档中出现的比例) × ln(文档词数 + 1)。
//! embed 提供固定维度的哈希词袋向量，供需要向量形式的调用方使用。

use std::collections::HashSet;

use crate::core::ScorerError;
use crate::memory::tokenizer::tokenize;

/// 默认向量维度
pub const DEFAULT_DIMENSIONS: usize = 128;

#[derive(Debug, Clone)]
pub struct LexicalScorer {
    dimensions: usize,
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl LexicalScorer {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// 查询与文档的相关度（≥ 0，越大越相关）；空查询或空文档返回 0
    pub fn relevance(&self, query: &str, document: &str) -> f32 {
        self.relevance_tokens(&tokenize(query), &tokenize(document))
    }

    /// 已分词版本：检索时查询只分词一次，每个块也只分词一次
    pub fn relevance_tokens(&self, query_tokens: &[String], doc_tokens: &[String]) -> f32 {
        if query_tokens.is_empty() || doc_tokens.is_empty() {
            return 0.0;
        }
        let doc_set: HashSet<&str> = doc_tokens.iter().map(String::as_str).collect();
        let matched = query_tokens.iter().filter(|t| doc_set.contains(t.as_str())).count();
        let overlap = matched as f32 / query_tokens.len() as f32;
        overlap * ((doc_tokens.len() + 1) as f32).ln()
    }

    /// 哈希词袋向量，L2 归一化；无有效词时为全零向量
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let bucket = (string_hash(&token) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        vector
    }
}

/// 余弦相似度，范围 [-1, 1]；任一侧为零向量时返回 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, ScorerError> {
    if a.len() != b.len() {
        return Err(ScorerError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// 与平台无关的字符串哈希（31 进制滚动）
fn string_hash(s: &str) -> u64 {
    s.chars()
        .fold(0u64, |h, c| h.wrapping_mul(31).wrapping_add(c as u64))
}
