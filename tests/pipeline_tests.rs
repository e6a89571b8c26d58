//! Integration tests for expansion, retrieval, synthesis, and the pipeline,
//! using in-process provider doubles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragkit::document::{Chunk, EmbeddedChunk};
use ragkit::{
    AnswerSynthesizer, Document, EmbeddingProvider, FixedSizeChunker, GenerationProvider,
    HydeExpander, InMemoryVectorStore, MultiQueryExpander, QueryExpander, RagConfig, RagError,
    RagPipeline, Retriever, VectorIndex,
};

/// Embedding double that maps known texts to fixed vectors.
struct MapEmbedder {
    dims: usize,
    map: HashMap<String, Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for MapEmbedder {
    async fn embed(&self, text: &str) -> ragkit::Result<Vec<f32>> {
        self.map.get(text).cloned().ok_or_else(|| RagError::EmbeddingError {
            provider: "map".to_string(),
            message: format!("no embedding scripted for {text:?}"),
        })
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Embedding double producing a deterministic vector from the text bytes.
struct HashEmbedder {
    dims: usize,
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> ragkit::Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dims];
        v[0] = 1.0;
        for (i, byte) in text.bytes().enumerate() {
            v[i % self.dims] += f32::from(byte) / 255.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Generation double that returns a scripted reply and records every
/// (system, user) prompt pair it receives.
struct ScriptedGenerator {
    reply: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    fn new(reply: Option<&str>) -> Self {
        Self { reply: reply.map(String::from), calls: Mutex::new(Vec::new()) }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerator {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> ragkit::Result<Option<String>> {
        self.calls.lock().unwrap().push((system_prompt.to_string(), user_prompt.to_string()));
        Ok(self.reply.clone())
    }
}

fn embedded(id: &str, content: &str, embedding: Vec<f32>) -> EmbeddedChunk {
    EmbeddedChunk {
        chunk: Chunk {
            id: id.to_string(),
            content: content.to_string(),
            metadata: HashMap::new(),
            document_id: "doc_1".to_string(),
        },
        embedding,
    }
}

// ── Retrieval ──────────────────────────────────────────────────────

/// Build an index where query "a" retrieves [X, Y] and query "b"
/// retrieves [Y, Z] at n_results = 2.
async fn dedup_fixture() -> Retriever {
    let store = Arc::new(InMemoryVectorStore::new());
    let embedder = Arc::new(MapEmbedder {
        dims: 4,
        map: HashMap::from([
            ("a".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
            ("b".to_string(), vec![0.0, 0.0, 1.0, 0.0]),
        ]),
    });
    let index = Arc::new(VectorIndex::new(store, embedder));

    index.create_or_get_collection("docs", None).await.unwrap();
    index
        .upsert_embedded(
            "docs",
            &[
                embedded("x", "X", vec![1.0, 0.0, 0.0, 0.0]),
                embedded("y", "Y", vec![0.5, 0.0, 0.866, 0.0]),
                embedded("z", "Z", vec![0.0, 0.6, 0.8, 0.0]),
            ],
        )
        .await
        .unwrap();

    Retriever::new(index)
}

#[tokio::test]
async fn merged_results_dedup_by_first_seen_order() {
    let retriever = dedup_fixture().await;
    let queries = vec!["a".to_string(), "b".to_string()];
    let merged = retriever.retrieve(&queries, "docs", 2).await.unwrap();
    // Query "a" ranks [X, Y]; query "b" ranks [Y, Z]. Y keeps its
    // first-seen position and the union exceeds n_results.
    assert_eq!(merged, vec!["X", "Y", "Z"]);
}

#[tokio::test]
async fn single_query_returns_store_order() {
    let retriever = dedup_fixture().await;
    let queries = vec!["b".to_string()];
    let merged = retriever.retrieve(&queries, "docs", 2).await.unwrap();
    assert_eq!(merged, vec!["Y", "Z"]);
}

#[tokio::test]
async fn missing_collection_propagates_from_retrieval() {
    let retriever = dedup_fixture().await;
    let queries = vec!["a".to_string()];
    let err = retriever.retrieve(&queries, "never-created", 2).await.unwrap_err();
    assert!(matches!(err, RagError::CollectionNotFound { .. }));
}

#[tokio::test]
async fn no_queries_means_no_results() {
    let retriever = dedup_fixture().await;
    assert!(retriever.retrieve(&[], "docs", 2).await.unwrap().is_empty());
}

// ── Query expansion ────────────────────────────────────────────────

#[tokio::test]
async fn multi_query_parsing_strips_blank_lines_and_whitespace() {
    let generator = Arc::new(ScriptedGenerator::new(Some("Q1?\n\nQ2?\n")));
    let expander = MultiQueryExpander::new(generator);
    assert_eq!(expander.sub_questions("orig?").await.unwrap(), vec!["Q1?", "Q2?"]);
    assert_eq!(expander.expand("orig?").await.unwrap(), vec!["orig?", "Q1?", "Q2?"]);
}

#[tokio::test]
async fn multi_query_keeps_at_most_five_sub_questions() {
    let generator =
        Arc::new(ScriptedGenerator::new(Some("Q1?\nQ2?\nQ3?\nQ4?\nQ5?\nQ6?\nQ7?")));
    let expander = MultiQueryExpander::new(generator);
    let subs = expander.sub_questions("orig?").await.unwrap();
    assert_eq!(subs.len(), 5);
    assert_eq!(subs.last().map(String::as_str), Some("Q5?"));
}

#[tokio::test]
async fn hyde_expansion_joins_question_and_hypothetical_answer() {
    let generator = Arc::new(ScriptedGenerator::new(Some("Revenue is reported in note 2.")));
    let expander = HydeExpander::new(generator.clone());
    let queries = expander.expand("What was revenue?").await.unwrap();
    assert_eq!(queries, vec!["What was revenue?\nRevenue is reported in note 2."]);
    // The question is the sole user input to the generator.
    assert_eq!(generator.calls()[0].1, "What was revenue?");
}

#[tokio::test]
async fn empty_generation_fails_both_expansion_strategies() {
    let hyde = HydeExpander::new(Arc::new(ScriptedGenerator::new(None)));
    assert!(matches!(hyde.expand("q?").await.unwrap_err(), RagError::EmptyGeneration));

    let multi = MultiQueryExpander::new(Arc::new(ScriptedGenerator::new(Some("   \n  "))));
    assert!(matches!(multi.expand("q?").await.unwrap_err(), RagError::EmptyGeneration));
}

// ── Answer synthesis ───────────────────────────────────────────────

#[tokio::test]
async fn synthesis_threads_context_and_question_into_the_prompt() {
    let generator = Arc::new(ScriptedGenerator::new(Some("Revenue was $50B in 2023.")));
    let synthesizer = AnswerSynthesizer::new(generator.clone());

    let context = vec!["Revenue was $50B in 2023.".to_string()];
    let answer = synthesizer.synthesize("What was revenue?", &context).await.unwrap();

    assert!(!answer.is_empty());
    assert!(answer.contains("$50B"));

    let (system, user) = generator.calls().remove(0);
    assert!(user.contains("Question: What was revenue?"));
    assert!(user.contains("Context 1: Revenue was $50B in 2023."));
    assert!(system.contains("Do not make up information"));
}

#[tokio::test]
async fn synthesis_labels_each_chunk_with_its_ordinal() {
    let generator = Arc::new(ScriptedGenerator::new(Some("ok")));
    let synthesizer = AnswerSynthesizer::new(generator.clone());

    let context = vec!["first".to_string(), "second".to_string()];
    synthesizer.synthesize("q?", &context).await.unwrap();

    let (_, user) = generator.calls().remove(0);
    assert!(user.contains("Context 1: first"));
    assert!(user.contains("Context 2: second"));
}

#[tokio::test]
async fn synthesis_with_no_context_still_invokes_the_generator() {
    let generator = Arc::new(ScriptedGenerator::new(Some("I cannot answer from the context.")));
    let synthesizer = AnswerSynthesizer::new(generator.clone());

    synthesizer.synthesize("q?", &[]).await.unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.contains("No relevant context found."));
}

#[tokio::test]
async fn synthesis_has_no_fallback_for_empty_generation() {
    let synthesizer = AnswerSynthesizer::new(Arc::new(ScriptedGenerator::new(None)));
    let err = synthesizer.synthesize("q?", &["ctx".to_string()]).await.unwrap_err();
    assert!(matches!(err, RagError::EmptyGeneration));
}

// ── Pipeline ───────────────────────────────────────────────────────

fn pipeline_with(
    expander: Option<Arc<dyn QueryExpander>>,
    generator: Arc<ScriptedGenerator>,
) -> RagPipeline {
    let mut builder = RagPipeline::builder()
        .config(RagConfig::builder().chunk_size(512).chunk_overlap(50).n_results(3).build().unwrap())
        .embedding_provider(Arc::new(HashEmbedder { dims: 8 }))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .generation_provider(generator)
        .chunker(Arc::new(FixedSizeChunker::new(512, 50).unwrap()));
    if let Some(expander) = expander {
        builder = builder.query_expander(expander);
    }
    builder.build().unwrap()
}

#[tokio::test]
async fn end_to_end_ingest_and_answer() {
    let generator = Arc::new(ScriptedGenerator::new(Some("Total revenue was $50B.")));
    let pipeline = pipeline_with(None, generator.clone());

    pipeline.create_collection("reports", None).await.unwrap();
    let document = Document::new("report-2023", "Revenue was $50B in 2023. Margins improved.");
    let stored = pipeline.ingest("reports", &document).await.unwrap();
    assert_eq!(stored.len(), 1);

    let answer = pipeline.answer("reports", "What was revenue?").await.unwrap();
    assert!(answer.contains("$50B"));

    // The retrieved chunk text reached the generator prompt.
    let (_, user) = generator.calls().remove(0);
    assert!(user.contains("Revenue was $50B in 2023."));
}

#[tokio::test]
async fn expansion_empty_generation_falls_back_to_the_original_question() {
    let expansion_generator = Arc::new(ScriptedGenerator::new(None));
    let expander: Arc<dyn QueryExpander> =
        Arc::new(MultiQueryExpander::new(expansion_generator.clone()));
    let synthesis_generator = Arc::new(ScriptedGenerator::new(Some("Grounded answer.")));
    let pipeline = pipeline_with(Some(expander), synthesis_generator.clone());

    pipeline.create_collection("reports", None).await.unwrap();
    pipeline
        .ingest("reports", &Document::new("report", "Operating income grew 12%."))
        .await
        .unwrap();

    let answer = pipeline.answer("reports", "How did income change?").await.unwrap();
    assert_eq!(answer, "Grounded answer.");

    // Expansion was attempted, failed empty, and retrieval still ran with
    // the unexpanded question.
    assert_eq!(expansion_generator.calls().len(), 1);
    let (_, user) = synthesis_generator.calls().remove(0);
    assert!(user.contains("Operating income grew 12%."));
}

#[tokio::test]
async fn ingesting_an_empty_document_stores_nothing() {
    let pipeline = pipeline_with(None, Arc::new(ScriptedGenerator::new(Some("ok"))));
    pipeline.create_collection("reports", None).await.unwrap();
    let stored =
        pipeline.ingest("reports", &Document::new("blank", "   \n  ")).await.unwrap();
    assert!(stored.is_empty());
    assert!(pipeline.retrieve("reports", "anything").await.unwrap().is_empty());
}

#[tokio::test]
async fn ingest_requires_an_existing_collection() {
    let pipeline = pipeline_with(None, Arc::new(ScriptedGenerator::new(Some("ok"))));
    let err = pipeline
        .ingest("never-created", &Document::new("doc", "some text"))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::CollectionNotFound { .. }));
}

#[tokio::test]
async fn reingesting_a_document_overwrites_its_chunks() {
    let pipeline = pipeline_with(None, Arc::new(ScriptedGenerator::new(Some("ok"))));
    pipeline.create_collection("reports", None).await.unwrap();

    pipeline.ingest("reports", &Document::new("doc", "old revenue figure")).await.unwrap();
    pipeline.ingest("reports", &Document::new("doc", "new revenue figure")).await.unwrap();

    let chunks = pipeline.retrieve("reports", "revenue").await.unwrap();
    assert_eq!(chunks, vec!["new revenue figure"]);
}

#[tokio::test]
async fn builder_rejects_missing_components() {
    let result = RagPipeline::builder().config(RagConfig::default()).build();
    assert!(matches!(result.err(), Some(RagError::ConfigError(_))));
}
