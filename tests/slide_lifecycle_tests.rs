mod common;

use std::sync::Arc;

use common::{diagram_states, document};
use slidedown::{
    DiagramMountController, DiagramState, JobStatus, Slide, SlideBlock, SlideSurface,
};

#[tokio::test]
async fn test_mount_update_unmount_cycle() {
    let mut slide = Slide::new(document(
        "pipeline",
        "# Pipeline\n\n```mermaid\ngraph TD\n  A-->B\n```\n\nclosing prose",
    ));

    let report = slide.mount().await;
    assert!(slide.is_mounted());
    assert_eq!(report.jobs.len(), 1);
    assert_eq!(report.succeeded(), 1);

    let surface = slide.surface().expect("mounted slide exposes a surface");
    {
        let guard = surface.lock();
        assert_eq!(guard.blocks.len(), 3);
        assert!(matches!(guard.blocks[0], SlideBlock::Heading { level: 1, .. }));
        assert!(matches!(guard.blocks[1], SlideBlock::Diagram(_)));
        assert_eq!(guard.revision, 1);
    }
    for state in diagram_states(&surface) {
        assert!(matches!(state, DiagramState::Rendered(_)));
    }

    // A source change re-commits; both fences in the new source render.
    let updated = slide
        .update(document(
            "pipeline",
            "```mermaid\ngraph TD\n  A-->B\n```\n\n```mermaid\nsequenceDiagram\n  A->>B: hi\n```",
        ))
        .await
        .expect("changed source should re-render");
    assert_eq!(updated.jobs.len(), 2);

    slide.unmount();
    assert!(!slide.is_mounted());
    assert!(slide.surface().is_none());
}

#[tokio::test]
async fn test_ids_unique_across_slides() {
    let mut first = Slide::new(document("one", "```mermaid\ngraph TD\n  A-->B\n```"));
    let mut second = Slide::new(document(
        "two",
        "```mermaid\ngraph TD\n  C-->D\n```\n\n```mermaid\ngraph TD\n  E-->F\n```",
    ));

    let first_report = first.mount().await;
    let second_report = second.mount().await;

    let mut ids: Vec<_> = first_report
        .jobs
        .iter()
        .chain(second_report.jobs.iter())
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(ids.len(), 3);
    let before = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), before, "diagram ids must never repeat");
}

#[tokio::test]
async fn test_pass_after_unmount_is_silent() {
    let mut slide = Slide::new(document("gone", "```mermaid\ngraph TD\n  A-->B\n```"));
    slide.mount().await;

    let weak = Arc::downgrade(&slide.surface().unwrap());
    slide.unmount();

    // The surface is dropped; a late pass must do nothing and report nothing.
    let report = DiagramMountController::mount_pass(weak).await;
    assert!(report.is_noop());
}

#[tokio::test]
async fn test_malformed_sibling_isolation() {
    // The diagram backend may best-effort a malformed description or fail
    // it; either way every slot must resolve and the well-formed sibling
    // must render.
    let mut slide = Slide::new(document(
        "mixed",
        "```mermaid\nflowchart LR\nA-->\n```\n\n```mermaid\ngraph TD\n  A-->B\n```",
    ));
    let report = slide.mount().await;

    assert_eq!(report.jobs.len(), 2);
    for (_, status) in &report.jobs {
        assert_ne!(*status, JobStatus::Stale);
    }

    let surface = slide.surface().unwrap();
    let states = diagram_states(&surface);
    assert_eq!(states.len(), 2);
    for state in &states {
        assert_ne!(*state, DiagramState::Pending);
    }
    assert!(matches!(states[1], DiagramState::Rendered(_)));
}

#[tokio::test]
async fn test_second_pass_leaves_surface_byte_identical() {
    let mut slide = Slide::new(document("stable", "```mermaid\ngraph TD\n  A-->B\n```"));
    slide.mount().await;

    let surface = slide.surface().unwrap();
    let snapshot: Vec<SlideBlock> = surface.lock().blocks.clone();

    let report = DiagramMountController::mount_pass(Arc::downgrade(&surface)).await;
    assert!(report.is_noop());
    assert_eq!(surface.lock().blocks, snapshot);
}

#[tokio::test]
async fn test_full_slide_renders_every_block_kind() {
    let source = "\
# Rendering Pipeline

Intro paragraph with **bold** text.

- first
- second

> note

| a | b |
|---|---|
| 1 | 2 |

---

```rust
fn main() {}
```

```mermaid
graph TD
  A-->B
```
";
    let mut slide = Slide::new(document("full", source));
    let report = slide.mount().await;
    assert_eq!(report.jobs.len(), 1);

    let surface = slide.surface().unwrap();
    let guard = surface.lock();
    let kinds: Vec<&'static str> = guard
        .blocks
        .iter()
        .map(|b| match b {
            SlideBlock::Heading { .. } => "heading",
            SlideBlock::Paragraph { .. } => "paragraph",
            SlideBlock::List { .. } => "list",
            SlideBlock::BlockQuote { .. } => "quote",
            SlideBlock::Code { .. } => "code",
            SlideBlock::Diagram(_) => "diagram",
            SlideBlock::Table(_) => "table",
            SlideBlock::Rule => "rule",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["heading", "paragraph", "list", "quote", "table", "rule", "code", "diagram"]
    );

    let SlideBlock::Code { language, lines } = &guard.blocks[6] else {
        panic!("expected code block");
    };
    assert_eq!(language.as_deref(), Some("rust"));
    assert_eq!(lines.len(), 1);

    assert!(matches!(
        guard.blocks[7],
        SlideBlock::Diagram(ref slot) if !slot.is_pending()
    ));
}

#[test]
fn test_surface_commit_starts_at_revision_zero() {
    let surface = SlideSurface::new(Vec::new());
    assert_eq!(surface.revision, 0);
    assert!(surface.pending_diagrams().is_empty());
}
