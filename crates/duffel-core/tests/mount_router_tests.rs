//! Integration tests for mount routing over bundle-aware backends.
//!
//! Tests verify:
//! - the synthetic root lists one entry per mount
//! - returned models are reanchored with the mount name
//! - rename never crosses mounts
//! - bundle semantics survive the routing layer

use duffel_core::{
    BundleContents, Contents, ContentsError, GetOptions, ListingOptions, MountContents,
};
use duffel_testutil::{stage_bundle_workspace, Workspace};
use duffel_types::{Model, ModelKind};

fn two_mount_router() -> (Workspace, Workspace, MountContents) {
    let work = Workspace::new().expect("work workspace");
    let scratch = Workspace::new().expect("scratch workspace");
    stage_bundle_workspace(&work);

    let router = MountContents::new()
        .mount(
            "work",
            BundleContents::new(work.root(), ListingOptions::default()),
        )
        .mount(
            "scratch",
            BundleContents::new(scratch.root(), ListingOptions::default()),
        );
    (work, scratch, router)
}

// ============================================================================
// Root view
// ============================================================================

#[tokio::test]
async fn root_lists_one_directory_per_mount() {
    let (_work, _scratch, mc) = two_mount_router();

    let Model::Directory(root) = mc.get("/", &GetOptions::with_content()).await.unwrap() else {
        panic!("root should be a directory");
    };
    assert_eq!(root.base.path, "");

    let entries: Vec<_> = root
        .content
        .as_ref()
        .unwrap()
        .iter()
        .map(|m| (m.name(), m.path(), m.kind()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("scratch", "scratch", ModelKind::Directory),
            ("work", "work", ModelKind::Directory),
        ]
    );
}

#[tokio::test]
async fn root_refuses_mutations() {
    let (_work, _scratch, mc) = two_mount_router();

    assert!(matches!(
        mc.delete("").await.unwrap_err(),
        ContentsError::UnknownMount(_)
    ));
    assert!(matches!(
        mc.create_checkpoint("/").await.unwrap_err(),
        ContentsError::UnknownMount(_)
    ));
}

// ============================================================================
// Reanchoring
// ============================================================================

#[tokio::test]
async fn bundle_model_is_reanchored_through_the_router() {
    let (_work, _scratch, mc) = two_mount_router();

    let model = mc
        .get("work/subdir/example.ipynb", &GetOptions::with_content())
        .await
        .unwrap();
    let Model::NotebookBundle(nb) = model else {
        panic!("expected a notebook bundle");
    };
    assert_eq!(nb.base.path, "work/subdir/example.ipynb");
    assert_eq!(nb.sidecar_files["howdy.txt"].as_deref(), Some("howdy"));
}

#[tokio::test]
async fn directory_children_are_reanchored() {
    let (_work, _scratch, mc) = two_mount_router();

    let Model::Directory(dir) = mc
        .get("work/subdir", &GetOptions::with_content())
        .await
        .unwrap()
    else {
        panic!("expected a directory");
    };
    let paths: Vec<_> = dir
        .content
        .as_ref()
        .unwrap()
        .iter()
        .map(|m| m.path())
        .collect();
    assert_eq!(paths, vec!["work/subdir/example.ipynb"]);
}

#[tokio::test]
async fn mount_root_listing_is_reanchored() {
    let (_work, _scratch, mc) = two_mount_router();

    let Model::Directory(dir) = mc.get("work", &GetOptions::with_content()).await.unwrap()
    else {
        panic!("expected a directory");
    };
    let paths: Vec<_> = dir
        .content
        .as_ref()
        .unwrap()
        .iter()
        .map(|m| m.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "work/example.txt",
            "work/regular.ipynb",
            "work/subdir",
            "work/sup.txt"
        ]
    );
}

// ============================================================================
// Routing errors
// ============================================================================

#[tokio::test]
async fn unknown_mount_is_fatal_everywhere() {
    let (_work, _scratch, mc) = two_mount_router();

    let err = mc.get("ghost/a.txt", &GetOptions::shallow()).await.unwrap_err();
    assert!(matches!(err, ContentsError::UnknownMount(m) if m == "ghost"));

    let err = mc.delete("ghost/a.txt").await.unwrap_err();
    assert!(matches!(err, ContentsError::UnknownMount(_)));

    assert!(!mc.file_exists("ghost/a.txt").await);
    assert!(!mc.dir_exists("ghost").await);
}

#[tokio::test]
async fn cross_mount_rename_refused_before_mutation() {
    let (work, scratch, mc) = two_mount_router();

    let err = mc
        .rename("work/sup.txt", "scratch/sup.txt")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ContentsError::CrossMountRename { ref from, .. } if from == "work/sup.txt")
    );
    assert!(work.path("sup.txt").is_file());
    assert!(!scratch.path("sup.txt").exists());
}

// ============================================================================
// Operations through the router
// ============================================================================

#[tokio::test]
async fn save_through_router_reanchors_the_result() {
    let (_work, scratch, mc) = two_mount_router();

    let model = Model::File(duffel_types::FileModel::new(
        duffel_types::ModelBase::transient("notes.txt"),
        Some("remember".into()),
    ));
    let saved = mc.save("scratch/notes.txt", &model).await.unwrap();

    assert_eq!(saved.path(), "scratch/notes.txt");
    assert_eq!(
        std::fs::read_to_string(scratch.path("notes.txt")).unwrap(),
        "remember"
    );
}

#[tokio::test]
async fn rename_within_a_mount_renames_the_bundle() {
    let (work, _scratch, mc) = two_mount_router();

    mc.rename("work/example.txt", "work/renamed.txt")
        .await
        .unwrap();
    assert!(work.path("renamed.txt/renamed.txt").is_file());
    assert!(!work.path("example.txt").exists());
}

#[tokio::test]
async fn checkpoints_route_to_the_owning_mount() {
    let (work, _scratch, mc) = two_mount_router();

    let cp = mc.create_checkpoint("work/example.txt").await.unwrap();
    assert!(work.path("example.txt/.checkpoints").is_dir());

    let listed = mc.list_checkpoints("work/example.txt").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, cp.id);

    // Default trait behavior: restore and delete are not wired up.
    let err = mc
        .restore_checkpoint("work/example.txt", &cp.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ContentsError::NotImplemented(_)));
}
