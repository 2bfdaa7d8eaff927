//! RAG 上下文存储
//!
//! 启动时从语料目录加载纯文本文件并分块，运行期只追加（add_document），
//! 唯一的删除路径是按来源前缀批量清理（clear_by_source_prefix，用于轮换临时来源）。
//! 检索前先经过 RetrievalGate：闸门拒绝时直接返回空结果，不做任何评分。

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{OnceCell, RwLock};

use crate::memory::gate::{KeywordGate, RetrievalGate};
use crate::memory::scorer::{LexicalScorer, DEFAULT_DIMENSIONS};
use crate::memory::tokenizer::tokenize;

/// 文档块：创建后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    /// 来源标识（语料文件名或动态来源名）
    pub source: String,
    /// 在同一来源内唯一
    pub index: usize,
    pub metadata: HashMap<String, String>,
}

/// 单次检索命中的文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub source: String,
    pub score: f32,
    pub metadata: HashMap<String, String>,
}

/// 检索结果：documents 按 score 降序，长度 ≤ top_k
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    pub documents: Vec<RetrievedDocument>,
    pub total_retrieved: usize,
    pub retrieval_time_ms: u64,
}

impl RetrievalResult {
    fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            documents: Vec::new(),
            total_retrieved: 0,
            retrieval_time_ms: 0,
        }
    }

    /// 拼成可直接放进提示词的上下文段落；无命中时为空串
    pub fn as_context(&self) -> String {
        let mut context = String::new();
        for (i, doc) in self.documents.iter().enumerate() {
            context.push_str(&format!(
                "[Context {}] ({}, relevance {:.2})\n{}\n\n",
                i + 1,
                doc.source,
                doc.score,
                doc.content
            ));
        }
        context
    }

    pub fn sources(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.source.clone()).collect()
    }
}

/// 分块策略
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// 块大小上限（字符数）
    pub chunk_size: usize,
    /// 相邻块之间的重叠（字符数）
    pub chunk_overlap: usize,
    /// 断点优先级（从高到低），段落优先
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                ". ".to_string(),
                "! ".to_string(),
                "? ".to_string(),
                " ".to_string(),
            ],
        }
    }
}

/// 文档分块器
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(mut config: ChunkingConfig) -> Self {
        config.chunk_size = config.chunk_size.max(1);
        config.chunk_overlap = config.chunk_overlap.min(config.chunk_size - 1);
        Self { config }
    }

    /// 将文本切为 (块文本, 字符偏移)；UTF-8 安全，每块不超过 chunk_size 个字符
    pub fn chunk(&self, text: &str) -> Vec<(String, usize)> {
        let mut chunks = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();
        let overlap_limit = self.config.chunk_overlap;

        let mut current_idx = 0;
        while current_idx < total_chars {
            let target_end = (current_idx + self.config.chunk_size).min(total_chars);
            let mut actual_end = target_end;

            // 不在末尾时，尽量在分隔符处断开；断点需越过重叠区，避免产生碎块
            if target_end < total_chars {
                let slice: String = chars[current_idx..target_end].iter().collect();
                for sep in &self.config.separators {
                    if let Some(pos) = slice.rfind(sep.as_str()) {
                        let chars_to_sep = slice[..pos].chars().count() + sep.chars().count();
                        if chars_to_sep > overlap_limit {
                            actual_end = current_idx + chars_to_sep;
                            break;
                        }
                    }
                }
            }

            let chunk_text: String = chars[current_idx..actual_end].iter().collect();
            let trimmed = chunk_text.trim();
            if !trimmed.is_empty() {
                // 偏移指向去掉前导空白后的首字符
                let lead = chunk_text.chars().take_while(|c| c.is_whitespace()).count();
                chunks.push((trimmed.to_string(), current_idx + lead));
            }

            if actual_end >= total_chars {
                break;
            }
            let overlap = overlap_limit.min(actual_end - current_idx);
            let next_start = actual_end - overlap;
            current_idx = if next_start > current_idx {
                next_start
            } else {
                actual_end
            };
        }

        chunks
    }
}

/// 来源过滤：按来源名（小写）子串匹配；空模式表示不过滤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    patterns: Vec<String>,
}

impl SourceFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn accepts(&self, source: &str) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let source = source.to_lowercase();
        self.patterns.iter().any(|p| source.contains(p.as_str()))
    }
}

/// 上下文存储配置
#[derive(Debug, Clone)]
pub struct ContextStoreConfig {
    pub corpus_dir: PathBuf,
    pub chunking: ChunkingConfig,
    pub dimensions: usize,
    /// 分数不超过该值的块不进入结果
    pub min_score: f32,
}

impl Default for ContextStoreConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data/corpus"),
            chunking: ChunkingConfig::default(),
            dimensions: DEFAULT_DIMENSIONS,
            min_score: 0.0,
        }
    }
}

/// 上下文存储；进程内共享（Arc），并发读与并发追加都是安全的
pub struct ContextStore {
    config: ContextStoreConfig,
    chunker: Chunker,
    scorer: LexicalScorer,
    gate: Arc<dyn RetrievalGate>,
    chunks: RwLock<Vec<Arc<DocumentChunk>>>,
    initialized: OnceCell<usize>,
    /// 累计评分过的块数
    scored: AtomicU64,
}

impl ContextStore {
    pub fn new(config: ContextStoreConfig) -> Self {
        Self::with_gate(config, Arc::new(KeywordGate::default()))
    }

    pub fn with_gate(config: ContextStoreConfig, gate: Arc<dyn RetrievalGate>) -> Self {
        Self {
            chunker: Chunker::new(config.chunking.clone()),
            scorer: LexicalScorer::new(config.dimensions),
            config,
            gate,
            chunks: RwLock::new(Vec::new()),
            initialized: OnceCell::new(),
            scored: AtomicU64::new(0),
        }
    }

    pub fn scorer(&self) -> &LexicalScorer {
        &self.scorer
    }

    /// 自创建以来参与评分的块总数
    pub fn chunks_scored(&self) -> u64 {
        self.scored.load(Ordering::Relaxed)
    }

    pub fn corpus_dir(&self) -> &Path {
        &self.config.corpus_dir
    }

    /// 加载静态语料；幂等，重复调用返回首次加载的文档数
    pub async fn initialize(&self) -> usize {
        *self
            .initialized
            .get_or_init(|| async { self.load_corpus().await })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    async fn load_corpus(&self) -> usize {
        let dir = &self.config.corpus_dir;
        if !dir.exists() {
            tracing::warn!("corpus dir {} missing, creating empty corpus", dir.display());
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                tracing::warn!("failed to create corpus dir {}: {}", dir.display(), e);
            }
            return 0;
        }

        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("failed to read corpus dir {}: {}", dir.display(), e);
                return 0;
            }
        };

        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    let hidden = entry.file_name().to_string_lossy().starts_with('.');
                    let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
                    if is_file && !hidden {
                        files.push(path);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("error while listing corpus dir: {}", e);
                    break;
                }
            }
        }
        files.sort();

        let mut loaded = 0;
        for path in files {
            let source = match path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("skipping corpus file {}: {}", path.display(), e);
                    continue;
                }
            };
            let mut metadata = HashMap::new();
            metadata.insert("origin".to_string(), "corpus".to_string());
            metadata.insert("path".to_string(), path.display().to_string());
            let added = self.append_chunks(&content, &source, metadata).await;
            if added == 0 {
                tracing::debug!("corpus file {} produced no chunks", source);
                continue;
            }
            loaded += 1;
        }

        tracing::info!(
            "context store loaded {} documents from {}",
            loaded,
            dir.display()
        );
        loaded
    }

    /// 是否需要检索（由闸门决定）
    pub fn should_retrieve(&self, query: &str) -> bool {
        self.gate.should_retrieve(query)
    }

    /// 检索 top_k 个最相关的块
    pub async fn retrieve(&self, query: &str, top_k: usize) -> RetrievalResult {
        self.retrieve_from(query, top_k, &SourceFilter::all()).await
    }

    /// 只在 filter 接受的来源中检索；被过滤掉的块不参与评分
    pub async fn retrieve_from(&self, query: &str, top_k: usize, filter: &SourceFilter) -> RetrievalResult {
        if !self.should_retrieve(query) {
            tracing::debug!("retrieval skipped by gate: {}", query);
            return RetrievalResult::empty(query);
        }

        let started = Instant::now();
        let query_tokens = tokenize(query);
        let chunks = self.chunks.read().await;
        let candidates: Vec<&DocumentChunk> = chunks
            .iter()
            .filter(|chunk| filter.accepts(&chunk.source))
            .map(|chunk| chunk.as_ref())
            .collect();
        self.scored.fetch_add(candidates.len() as u64, Ordering::Relaxed);

        let mut scored: Vec<(f32, &DocumentChunk)> = candidates
            .into_iter()
            .map(|chunk| {
                let doc_tokens = tokenize(&chunk.content);
                (self.scorer.relevance_tokens(&query_tokens, &doc_tokens), chunk)
            })
            .filter(|(score, _)| *score > self.config.min_score)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        let documents: Vec<RetrievedDocument> = scored
            .into_iter()
            .map(|(score, chunk)| RetrievedDocument {
                content: chunk.content.clone(),
                source: chunk.source.clone(),
                score,
                metadata: chunk.metadata.clone(),
            })
            .collect();

        let retrieval_time_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            "retrieved {} of {} chunks for '{}' in {}ms",
            documents.len(),
            chunks.len(),
            query,
            retrieval_time_ms
        );

        RetrievalResult {
            query: query.to_string(),
            total_retrieved: documents.len(),
            documents,
            retrieval_time_ms,
        }
    }

    /// 追加文档；不会重切已有内容。返回新增块数
    pub async fn add_document(
        &self,
        content: &str,
        source: &str,
        mut metadata: HashMap<String, String>,
    ) -> usize {
        metadata
            .entry("origin".to_string())
            .or_insert_with(|| "dynamic".to_string());
        self.append_chunks(content, source, metadata).await
    }

    async fn append_chunks(
        &self,
        content: &str,
        source: &str,
        metadata: HashMap<String, String>,
    ) -> usize {
        let pieces = self.chunker.chunk(content);
        if pieces.is_empty() {
            return 0;
        }

        let mut chunks = self.chunks.write().await;
        let next_index = chunks
            .iter()
            .filter(|c| c.source == source)
            .map(|c| c.index + 1)
            .max()
            .unwrap_or(0);

        let added = pieces.len();
        for (i, (text, offset)) in pieces.into_iter().enumerate() {
            let mut meta = metadata.clone();
            meta.insert("offset".to_string(), offset.to_string());
            chunks.push(Arc::new(DocumentChunk {
                content: text,
                source: source.to_string(),
                index: next_index + i,
                metadata: meta,
            }));
        }
        added
    }

    /// 按来源前缀批量删除，返回删除的块数
    pub async fn clear_by_source_prefix(&self, prefix: &str) -> usize {
        let mut chunks = self.chunks.write().await;
        let before = chunks.len();
        chunks.retain(|c| !c.source.starts_with(prefix));
        let removed = before - chunks.len();
        if removed > 0 {
            tracing::info!("cleared {} chunks with source prefix '{}'", removed, prefix);
        }
        removed
    }

    /// 不同来源的数量
    pub async fn document_count(&self) -> usize {
        self.sources().await.len()
    }

    pub async fn chunk_count(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn sources(&self) -> Vec<String> {
        let chunks = self.chunks.read().await;
        let set: BTreeSet<&str> = chunks.iter().map(|c| c.source.as_str()).collect();
        set.into_iter().map(String::from).collect()
    }

    /// 某来源的全部块（按 index 排序）
    pub async fn chunks_for(&self, source: &str) -> Vec<Arc<DocumentChunk>> {
        let chunks = self.chunks.read().await;
        let mut found: Vec<Arc<DocumentChunk>> = chunks
            .iter()
            .filter(|c| c.source == source)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.index);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::gate::AlwaysRetrieve;

    fn store_in(dir: &Path) -> ContextStore {
        ContextStore::new(ContextStoreConfig {
            corpus_dir: dir.to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let chunker = Chunker::new(ChunkingConfig {
            chunk_size: 40,
            chunk_overlap: 8,
            ..Default::default()
        });
        let text = "word ".repeat(100);
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|(c, _)| c.chars().count() <= 40));
    }

    #[test]
    fn test_chunking_prefers_paragraph_boundaries() {
        let chunker = Chunker::new(ChunkingConfig {
            chunk_size: 60,
            chunk_overlap: 10,
            ..Default::default()
        });
        let text = "First paragraph about Dallas routers.\n\nSecond paragraph about Denver links.";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks[0].0, "First paragraph about Dallas routers.");
        assert!(chunks.last().unwrap().0.ends_with("Second paragraph about Denver links."));
    }

    /// 按偏移把块拼回原文：重叠部分只取一次，块之间的空白缺口补一个空格
    fn rebuild(chunks: &[(String, usize)]) -> String {
        let mut out = String::new();
        let mut covered = 0;
        for (content, offset) in chunks {
            let end = offset + content.chars().count();
            if end <= covered {
                continue;
            }
            if *offset > covered {
                out.push(' ');
            }
            out.extend(content.chars().skip(covered.saturating_sub(*offset)));
            covered = end;
        }
        out
    }

    fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_chunking_round_trip_preserves_paragraph_order() {
        let chunker = Chunker::new(ChunkingConfig {
            chunk_size: 120,
            chunk_overlap: 20,
            ..Default::default()
        });
        let long = (0..12)
            .map(|i| format!("hop{} adds jitter", i))
            .collect::<Vec<_>>()
            .join(" ");
        assert!(long.chars().count() > 120);
        let text = format!(
            "Dallas core router dropped packets.\n\n{}\n\nChicago recovered after the reroute.",
            long
        );

        let chunks = chunker.chunk(&text);
        assert!(chunks.iter().all(|(c, _)| c.chars().count() <= 120));
        assert!(chunks.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(normalize(&rebuild(&chunks)), normalize(&text));
    }

    #[test]
    fn test_chunk_offsets_point_at_content() {
        let chunker = Chunker::new(ChunkingConfig {
            chunk_size: 30,
            chunk_overlap: 0,
            ..Default::default()
        });
        let text = "First line about Dallas.\n\n\n   Second line about Denver.";
        let chars: Vec<char> = text.chars().collect();
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].0, "Second line about Denver.");
        assert_eq!(chunks[1].1, 30);
        for (content, offset) in &chunks {
            let len = content.chars().count();
            let at: String = chars[*offset..*offset + len].iter().collect();
            assert_eq!(&at, content);
        }
    }

    #[test]
    fn test_chunking_utf8_safe() {
        let chunker = Chunker::new(ChunkingConfig {
            chunk_size: 5,
            chunk_overlap: 1,
            ..Default::default()
        });
        let chunks = chunker.chunk("网络延迟升高，达拉斯机房告警");
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|(c, _)| c.chars().count() <= 5));
    }

    #[tokio::test]
    async fn test_scenario_single_incident_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("incidents.txt"), "Outage in Dallas caused high latency.").unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.initialize().await, 1);

        let result = store.retrieve("Dallas outage pattern", 1).await;
        assert_eq!(result.total_retrieved, 1);
        assert_eq!(result.documents.len(), 1);
        assert!(result.documents[0].score > 0.0);
        assert_eq!(result.documents[0].source, "incidents.txt");
    }

    #[tokio::test]
    async fn test_gate_rejects_without_scoring() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("greeting.txt"), "hello hello hello world").unwrap();
        let store = store_in(dir.path());
        store.initialize().await;

        assert!(!store.should_retrieve("hello"));
        let result = store.retrieve("hello", 5).await;
        assert_eq!(result.total_retrieved, 0);
        assert!(result.documents.is_empty());
        assert_eq!(store.chunks_scored(), 0);

        store.retrieve("network hello", 5).await;
        assert_eq!(store.chunks_scored(), store.chunk_count().await as u64);
    }

    #[tokio::test]
    async fn test_source_filter_limits_scoring() {
        let store = ContextStore::with_gate(ContextStoreConfig::default(), Arc::new(AlwaysRetrieve));
        store.add_document("Outage in Dallas caused high latency.", "incidents.txt", HashMap::new()).await;
        store
            .add_document("Customer complaint: the Dallas outage was awful.", "feedback.txt", HashMap::new())
            .await;

        let filter = SourceFilter::matching(["Feedback"]);
        let result = store.retrieve_from("dallas outage", 5, &filter).await;
        assert_eq!(result.sources(), vec!["feedback.txt".to_string()]);
        assert_eq!(store.chunks_scored(), 1);

        assert_eq!(store.retrieve("dallas outage", 5).await.total_retrieved, 2);
        assert!(SourceFilter::all().accepts("anything"));
        assert!(SourceFilter::matching(["", "  "]).is_all());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Fiber cut in Austin.").unwrap();
        std::fs::write(dir.path().join("b.txt"), "Packet loss in Miami.").unwrap();
        let store = store_in(dir.path());
        let first = store.initialize().await;
        let chunks = store.chunk_count().await;
        let second = store.initialize().await;
        assert_eq!(first, 2);
        assert_eq!(first, second);
        assert_eq!(store.chunk_count().await, chunks);
        assert_eq!(store.document_count().await, 2);
    }

    #[tokio::test]
    async fn test_missing_corpus_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("nested/corpus");
        let store = store_in(&corpus);
        assert_eq!(store.initialize().await, 0);
        assert!(corpus.is_dir());
        assert_eq!(store.chunk_count().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.bin"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        std::fs::write(dir.path().join("good.txt"), "Latency spike in Seattle.").unwrap();
        std::fs::write(dir.path().join(".hidden"), "ignored outage").unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.initialize().await, 1);
        assert_eq!(store.sources().await, vec!["good.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_retrieve_sorted_and_bounded() {
        let store = ContextStore::with_gate(ContextStoreConfig::default(), Arc::new(AlwaysRetrieve));
        store.add_document("router outage in Dallas", "a", HashMap::new()).await;
        store.add_document("router outage and latency in Dallas region core", "b", HashMap::new()).await;
        store.add_document("billing questions", "c", HashMap::new()).await;
        store.add_document("outage", "d", HashMap::new()).await;

        let result = store.retrieve("dallas router outage", 2).await;
        assert_eq!(result.documents.len(), 2);
        assert!(result.documents[0].score >= result.documents[1].score);
        assert!(result.documents.iter().all(|d| d.source != "c"));

        assert!(store.retrieve("dallas router outage", 0).await.documents.is_empty());
    }

    #[tokio::test]
    async fn test_add_document_continues_indices_per_source() {
        let store = ContextStore::new(ContextStoreConfig::default());
        store.add_document("first analysis", "analysis/1", HashMap::new()).await;
        store.add_document("second analysis", "analysis/1", HashMap::new()).await;
        store.add_document("other", "analysis/2", HashMap::new()).await;

        let chunks = store.chunks_for("analysis/1").await;
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(chunks[0].content, "first analysis");
        assert_eq!(chunks[0].metadata.get("origin").map(String::as_str), Some("dynamic"));
        assert_eq!(store.chunks_for("analysis/2").await[0].index, 0);
    }

    #[tokio::test]
    async fn test_clear_by_source_prefix() {
        let store = ContextStore::new(ContextStoreConfig::default());
        store.add_document("keep me", "incidents.txt", HashMap::new()).await;
        store.add_document("rotate a", "analysis/a", HashMap::new()).await;
        store.add_document("rotate b", "analysis/b", HashMap::new()).await;

        assert_eq!(store.clear_by_source_prefix("analysis/").await, 2);
        assert_eq!(store.sources().await, vec!["incidents.txt".to_string()]);
        assert_eq!(store.clear_by_source_prefix("analysis/").await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let store = Arc::new(ContextStore::new(ContextStoreConfig::default()));
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .add_document(&format!("note {}", i), "notes", HashMap::new())
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let mut indices: Vec<usize> = store.chunks_for("notes").await.iter().map(|c| c.index).collect();
        indices.sort();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
    }
}
