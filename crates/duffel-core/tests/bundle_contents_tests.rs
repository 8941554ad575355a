//! Integration tests for the bundle-aware backend over a staged workspace.
//!
//! These tests run the canonical fixture: a flat notebook, a plain file, a
//! plain bundle, and a nested notebook bundle with a sidecar.

use duffel_core::{BundleContents, Contents, ContentsError, GetOptions, ListingOptions};
use duffel_testutil::{stage_bundle_workspace, Workspace};
use duffel_types::{Model, ModelKind, Notebook};

fn backend(ws: &Workspace) -> BundleContents {
    BundleContents::new(ws.root(), ListingOptions::default())
}

fn staged() -> (Workspace, BundleContents) {
    let ws = Workspace::new().expect("temp workspace");
    stage_bundle_workspace(&ws);
    let backend = backend(&ws);
    (ws, backend)
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn root_listing_resolves_every_shape() {
    let (_ws, bc) = staged();

    let Model::Directory(root) = bc.get("", &GetOptions::with_content()).await.unwrap() else {
        panic!("root should be a directory");
    };
    let children = root.content.as_ref().unwrap();
    let summary: Vec<_> = children
        .iter()
        .map(|m| (m.name(), m.kind(), m.is_bundle()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("example.txt", ModelKind::File, true),
            ("regular.ipynb", ModelKind::Notebook, false),
            ("subdir", ModelKind::Directory, false),
            ("sup.txt", ModelKind::File, false),
        ],
        "bundles list as file-like entries, never as directories"
    );

    // Children of a listing carry no content of their own.
    assert!(children.iter().all(|m| !m.has_content()));
}

#[tokio::test]
async fn nested_bundle_lists_inside_its_directory() {
    let (_ws, bc) = staged();

    let Model::Directory(dir) = bc
        .get("subdir", &GetOptions::with_content())
        .await
        .unwrap()
    else {
        panic!("subdir should be a directory");
    };
    let children = dir.content.as_ref().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].path(), "subdir/example.ipynb");
    assert_eq!(children[0].kind(), ModelKind::Notebook);
    assert!(children[0].is_bundle());
}

// ============================================================================
// Bundle resolution
// ============================================================================

#[tokio::test]
async fn notebook_bundle_round_trip_with_sidecars() {
    let (_ws, bc) = staged();

    let model = bc
        .get("subdir/example.ipynb", &GetOptions::with_content())
        .await
        .unwrap();
    let Model::NotebookBundle(nb) = model else {
        panic!("expected a notebook bundle");
    };

    assert_eq!(nb.base.path, "subdir/example.ipynb");
    assert_eq!(nb.base.name, "example.ipynb");
    let document = nb.content.as_ref().unwrap();
    assert_eq!(document.metadata["howdy"], serde_json::json!("hi"));
    assert_eq!(nb.sidecar_files["howdy.txt"].as_deref(), Some("howdy"));
}

#[tokio::test]
async fn shallow_bundle_keeps_sidecar_names() {
    let (_ws, bc) = staged();

    let Model::NotebookBundle(nb) = bc
        .get("subdir/example.ipynb", &GetOptions::shallow())
        .await
        .unwrap()
    else {
        panic!("expected a notebook bundle");
    };
    assert!(nb.content.is_none());
    // The key set survives even without content.
    assert_eq!(nb.sidecar_files["howdy.txt"], None);
}

#[tokio::test]
async fn plain_file_still_reads_through_bundle_layer() {
    let (_ws, bc) = staged();

    let Model::File(file) = bc.get("sup.txt", &GetOptions::with_content()).await.unwrap() else {
        panic!("expected a file");
    };
    assert_eq!(file.content.as_deref(), Some("sups"));
}

// ============================================================================
// Save and rename
// ============================================================================

#[tokio::test]
async fn bundle_save_round_trip() {
    let (ws, bc) = staged();

    let mut document = bc
        .get("subdir/example.ipynb", &GetOptions::with_content())
        .await
        .unwrap();
    if let Model::NotebookBundle(nb) = &mut document {
        nb.content
            .as_mut()
            .unwrap()
            .cells
            .push(duffel_types::Cell::code("c1", "2 + 2"));
    }

    let saved = bc.save("subdir/example.ipynb", &document).await.unwrap();
    assert!(saved.is_bundle());
    assert!(!saved.has_content());

    let reloaded = bc
        .get("subdir/example.ipynb", &GetOptions::with_content())
        .await
        .unwrap();
    let Model::NotebookBundle(nb) = reloaded else {
        panic!("expected a notebook bundle");
    };
    assert_eq!(nb.content.unwrap().cells.len(), 1);
    // Saving also refreshes the derived script artifact.
    assert!(ws
        .path("subdir/example.ipynb/_normalized/example.py")
        .is_file());
}

#[tokio::test]
async fn bundle_rename_carries_sidecars() {
    let (ws, bc) = staged();

    bc.rename("subdir/example.ipynb", "subdir/renamed.ipynb")
        .await
        .unwrap();

    assert!(ws.path("subdir/renamed.ipynb/renamed.ipynb").is_file());
    assert!(ws.path("subdir/renamed.ipynb/howdy.txt").is_file());
    assert!(!ws.path("subdir/example.ipynb").exists());

    let err = bc
        .get("subdir/example.ipynb", &GetOptions::shallow())
        .await
        .unwrap_err();
    assert!(matches!(err, ContentsError::NotFound(_)));
}

#[tokio::test]
async fn save_new_notebook_creates_a_bundle() {
    let (ws, bc) = staged();

    let model = Model::Notebook(duffel_types::NotebookModel::new(
        duffel_types::ModelBase::transient("fresh.ipynb"),
        Some(Notebook::new()),
    ));
    let saved = bc.save("fresh.ipynb", &model).await.unwrap();

    assert!(saved.is_bundle());
    assert!(ws.path("fresh.ipynb").is_dir());
    assert!(ws.path("fresh.ipynb/fresh.ipynb").is_file());
}

// ============================================================================
// Trash and checkpoints
// ============================================================================

#[tokio::test]
async fn trash_preserves_bundle_contents() {
    let ws = Workspace::new().unwrap();
    stage_bundle_workspace(&ws);
    let trash = ws.create_dir(".trash");

    let bc = BundleContents::new(ws.root(), ListingOptions::default())
        .with_trash_dir(&trash);
    bc.move_to_trash("subdir/example.ipynb").await.unwrap();

    let trashed = trash.join("subdir__example.ipynb");
    assert!(trashed.join("example.ipynb").is_file());
    assert!(trashed.join("howdy.txt").is_file());
    assert!(!ws.path("subdir/example.ipynb").exists());
}

#[tokio::test]
async fn checkpoints_are_isolated_per_bundle() {
    let (ws, bc) = staged();

    bc.create_checkpoint("subdir/example.ipynb").await.unwrap();
    bc.create_checkpoint("example.txt").await.unwrap();

    // Each bundle carries its own checkpoint directory.
    assert!(ws.path("subdir/example.ipynb/.checkpoints").is_dir());
    assert!(ws.path("example.txt/.checkpoints").is_dir());

    assert_eq!(
        bc.list_checkpoints("subdir/example.ipynb")
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(bc.list_checkpoints("example.txt").await.unwrap().len(), 1);

    // Checkpoint directories never show up in listings.
    let Model::Bundle(bundle) = bc
        .get("example.txt", &GetOptions::with_content())
        .await
        .unwrap()
    else {
        panic!("expected bundle");
    };
    assert!(!bundle.sidecar_files.contains_key(".checkpoints"));
}

#[tokio::test]
async fn flat_file_checkpoints_live_beside_the_file() {
    let (ws, bc) = staged();

    bc.create_checkpoint("sup.txt").await.unwrap();
    assert!(ws.path(".checkpoints").is_dir());
    assert_eq!(bc.list_checkpoints("sup.txt").await.unwrap().len(), 1);
    // A different name in the same directory sees nothing.
    assert!(bc
        .list_checkpoints("regular.ipynb")
        .await
        .unwrap()
        .is_empty());
}
