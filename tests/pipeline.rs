//! End-to-end pipeline tests with a scripted model and a stub graph layout.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use studyspark::{
    generate, generate_to_file, Block, CancelToken, GraphLayout, GraphLayoutError,
    InferenceOptions, JsonSink, MarkdownSink, MethodKind, ModelError, NoteModel,
    NoteProgressCallback, NotesConfig, NotesError, PipelineStage, TableRow,
};

/// Returns scripted responses in order; fails if called more often.
struct ScriptedModel {
    responses: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(responses: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().rev().map(String::from).collect()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl NoteModel for ScriptedModel {
    async fn infer(&self, _prompt: &str, _options: &InferenceOptions) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ModelError::Request("script exhausted".into()))
    }
}

struct StubLayout;

impl GraphLayout for StubLayout {
    fn layout(&self, _dot: &str) -> Result<Vec<u8>, GraphLayoutError> {
        Ok(b"\x89PNG-stub".to_vec())
    }
}

/// Records stage and chunk events for order assertions.
#[derive(Default)]
struct RecordingCallback {
    stages: Mutex<Vec<PipelineStage>>,
    chunk_events: Mutex<Vec<String>>,
}

impl NoteProgressCallback for RecordingCallback {
    fn on_stage(&self, stage: PipelineStage) {
        self.stages.lock().unwrap().push(stage);
    }
    fn on_chunk_start(&self, chunk: usize, total: usize) {
        self.chunk_events
            .lock()
            .unwrap()
            .push(format!("start {chunk}/{total}"));
    }
    fn on_chunk_complete(&self, chunk: usize, total: usize, _chars: usize) {
        self.chunk_events
            .lock()
            .unwrap()
            .push(format!("complete {chunk}/{total}"));
    }
    fn on_chunk_error(&self, chunk: usize, total: usize, _error: String) {
        self.chunk_events
            .lock()
            .unwrap()
            .push(format!("error {chunk}/{total}"));
    }
}

/// Two chunks at this budget: each word list joins under 40 chars.
fn two_chunk_text() -> &'static str {
    "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi"
}

fn config_with(model: Arc<dyn NoteModel>) -> NotesConfig {
    NotesConfig::builder()
        .model(model)
        .chunk_chars(40)
        .retry_backoff_ms(1)
        .graph(Arc::new(StubLayout))
        .build()
        .unwrap()
}

#[tokio::test]
async fn outline_concatenates_chunks_in_order() {
    let model = ScriptedModel::new(vec!["FIRST CHUNK OUTLINE\n", "SECOND CHUNK OUTLINE\n"]);
    let config = config_with(model.clone());

    let output = generate(two_chunk_text(), MethodKind::Outline, &config)
        .await
        .unwrap();

    assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    assert_eq!(output.stats.chunks, 2);
    assert_eq!(output.document.blocks.len(), 1);
    match &output.document.blocks[0] {
        Block::Paragraph(text) => {
            assert_eq!(text, "FIRST CHUNK OUTLINE\nSECOND CHUNK OUTLINE\n");
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[tokio::test]
async fn cornell_two_chunks_make_four_table_rows() {
    let model = ScriptedModel::new(vec![
        "1 first cue 2 first note 3 first summary",
        "1 second cue 2 second note 3 second summary",
    ]);
    let config = config_with(model);

    let output = generate(two_chunk_text(), MethodKind::Cornell, &config)
        .await
        .unwrap();

    match &output.document.blocks[0] {
        Block::Table(table) => {
            assert_eq!(table.columns, 2);
            assert_eq!(table.rows.len(), 4);
            assert_eq!(
                table.rows[0],
                TableRow::Cells(vec!["first cue".into(), "first note".into()])
            );
            assert_eq!(table.rows[1], TableRow::Merged("first summary".into()));
            assert_eq!(
                table.rows[2],
                TableRow::Cells(vec!["second cue".into(), "second note".into()])
            );
            assert_eq!(table.rows[3], TableRow::Merged("second summary".into()));
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[tokio::test]
async fn charting_builds_three_column_table() {
    let model = ScriptedModel::new(vec!["Topic|Definition|Example|", "T2|D2|E2|"]);
    let config = config_with(model);

    let output = generate(two_chunk_text(), MethodKind::Charting, &config)
        .await
        .unwrap();

    match &output.document.blocks[0] {
        Block::Table(table) => {
            assert_eq!(table.columns, 3);
            assert_eq!(table.rows.len(), 2);
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[tokio::test]
async fn mapping_emits_diagram_pages_from_stub_layout() {
    let model = ScriptedModel::new(vec![
        "|Root| -> |A|; |Root| -> |B|;%",
        "|Other| -> |C|;%",
    ]);
    let config = config_with(model);

    let output = generate(two_chunk_text(), MethodKind::Mapping, &config)
        .await
        .unwrap();

    assert_eq!(output.document.blocks.len(), 2);
    for block in &output.document.blocks {
        match block {
            Block::DiagramPage(page) => assert_eq!(page.png, b"\x89PNG-stub".to_vec()),
            other => panic!("expected diagram page, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn structural_mismatch_aborts_and_persists_nothing() {
    // Second chunk's output breaks the Cornell shape (13 pieces).
    let model = ScriptedModel::new(vec![
        "1 cue 2 note 3 summary",
        "1 a 2 b 3 c 4 d 5 e 6 f",
    ]);
    let config = config_with(model);

    let dir = std::env::temp_dir().join("studyspark-e2e-mismatch");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("notes.md");

    let err = generate_to_file(two_chunk_text(), MethodKind::Cornell, &path, &MarkdownSink, &config)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NotesError::StructuralMismatch {
            method: MethodKind::Cornell,
            chunk: 2,
            ..
        }
    ));
    assert!(!path.exists(), "no partial document may be written");
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn pre_cancelled_token_stops_before_any_model_call() {
    let model = ScriptedModel::new(vec!["never used", "never used"]);
    let cancel = CancelToken::new();
    cancel.cancel();
    let config = NotesConfig::builder()
        .model(model.clone() as Arc<dyn NoteModel>)
        .chunk_chars(40)
        .cancel_token(cancel)
        .build()
        .unwrap();

    let err = generate(two_chunk_text(), MethodKind::Outline, &config)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NotesError::Cancelled {
            completed_chunks: 0,
            total_chunks: 2,
        }
    ));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_model_is_reported_before_any_work() {
    let config = NotesConfig::default();
    let err = generate("some text", MethodKind::Outline, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, NotesError::ModelNotConfigured));
}

#[tokio::test]
async fn stages_and_chunk_events_fire_in_order() {
    let model = ScriptedModel::new(vec!["one ", "two "]);
    let callback = Arc::new(RecordingCallback::default());
    let config = NotesConfig::builder()
        .model(model as Arc<dyn NoteModel>)
        .chunk_chars(40)
        .graph(Arc::new(StubLayout))
        .progress_callback(callback.clone())
        .build()
        .unwrap();

    let dir = std::env::temp_dir().join("studyspark-e2e-stages");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("notes.json");

    generate_to_file(two_chunk_text(), MethodKind::Outline, &path, &JsonSink, &config)
        .await
        .unwrap();

    assert_eq!(
        *callback.stages.lock().unwrap(),
        vec![
            PipelineStage::LoadingModel,
            PipelineStage::Chunking,
            PipelineStage::Prompting,
            PipelineStage::RenderingDocument,
            PipelineStage::Saved,
        ]
    );
    assert_eq!(
        *callback.chunk_events.lock().unwrap(),
        vec!["start 1/2", "complete 1/2", "start 2/2", "complete 2/2"]
    );
    assert!(path.exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn chunk_error_event_fires_once_then_run_aborts() {
    let model = ScriptedModel::new(vec!["no numbers here"]);
    let callback = Arc::new(RecordingCallback::default());
    let config = NotesConfig::builder()
        .model(model as Arc<dyn NoteModel>)
        .chunk_chars(4096)
        .retry_backoff_ms(1)
        .progress_callback(callback.clone())
        .build()
        .unwrap();

    let err = generate("short input", MethodKind::Cornell, &config)
        .await
        .unwrap_err();

    assert!(matches!(err, NotesError::StructuralMismatch { .. }));
    assert_eq!(
        *callback.chunk_events.lock().unwrap(),
        vec!["start 1/1", "error 1/1"]
    );
}

#[tokio::test]
async fn markdown_output_references_diagram_siblings() {
    let model = ScriptedModel::new(vec!["|Root| -> |Leaf|;%"]);
    let config = NotesConfig::builder()
        .model(model as Arc<dyn NoteModel>)
        .chunk_chars(4096)
        .graph(Arc::new(StubLayout))
        .build()
        .unwrap();

    let dir = std::env::temp_dir().join("studyspark-e2e-mapping");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("map.md");

    generate_to_file("short input", MethodKind::Mapping, &path, &MarkdownSink, &config)
        .await
        .unwrap();

    let md = std::fs::read_to_string(&path).unwrap();
    assert!(md.contains("map-diagram-1.png"));
    assert!(dir.join("map-diagram-1.png").exists());
    std::fs::remove_dir_all(&dir).ok();
}
