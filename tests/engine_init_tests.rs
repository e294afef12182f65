mod common;

use common::{diagram_states, document};
use slidedown::{DiagramEngine, DiagramError, DiagramId, DiagramState, EngineConfig, Slide};

// Engine configuration is installed once per process, so the rejected-config
// path needs its own test binary. The whole sequence lives in one test:
// split across tests, the assertions would depend on thread scheduling.
#[tokio::test]
async fn test_rejected_config_poisons_every_render() {
    let mut config = EngineConfig::default();
    config.primary = "not-a-color".to_string();

    let err = DiagramEngine::initialize(config).expect_err("invalid config must be rejected");
    assert!(matches!(err, DiagramError::Initialization(_)));
    assert!(err.to_string().contains("primary"));

    // First writer wins: a later valid config does not replace the rejection.
    let err = DiagramEngine::initialize(EngineConfig::default())
        .expect_err("the rejected configuration is permanent");
    assert!(matches!(err, DiagramError::Initialization(_)));
    assert!(DiagramEngine::is_initialized());

    // Direct renders return the stored initialization error.
    let err = DiagramEngine::render(DiagramId(1), "graph TD\n  A-->B")
        .expect_err("no diagram renders on a poisoned engine");
    assert!(matches!(err, DiagramError::Initialization(_)));

    // Through the pipeline, every slot on every slide ends Failed with the
    // initialization message; none is left pending.
    let mut slide = Slide::new(document(
        "poisoned",
        "```mermaid\ngraph TD\n  A-->B\n```\n\n```mermaid\nsequenceDiagram\n  A->>B: hi\n```",
    ));
    let report = slide.mount().await;
    assert_eq!(report.jobs.len(), 2);
    assert_eq!(report.failed(), 2);

    let states = diagram_states(&slide.surface().expect("mounted slide exposes a surface"));
    assert_eq!(states.len(), 2);
    for state in &states {
        let DiagramState::Failed { message, .. } = state else {
            panic!("expected failed slot, got {state:?}");
        };
        assert!(message.contains("initialization failed"));
        assert!(message.contains("primary"));
    }
}
