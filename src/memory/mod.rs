//! 记忆层：词法评分、检索闸门、RAG 上下文存储

pub mod gate;
pub mod rag;
pub mod scorer;
pub mod tokenizer;

pub use gate::{AlwaysRetrieve, KeywordGate, RetrievalGate, DEFAULT_RETRIEVAL_KEYWORDS};
pub use rag::{
    Chunker, ChunkingConfig, ContextStore, ContextStoreConfig, DocumentChunk, RetrievalResult,
    RetrievedDocument, SourceFilter,
};
pub use scorer::{cosine_similarity, LexicalScorer, DEFAULT_DIMENSIONS};
