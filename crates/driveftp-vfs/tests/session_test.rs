//! Session navigation: home, cwd, cd.

mod support;

use driveftp_core::remote::MetadataStore;
use driveftp_core::types::RemoteObject;
use driveftp_core::GatewayError;
use driveftp_vfs::FileSystemView;

use support::{file, fixture, folder, id28, ROOT_ID};

fn tree() -> Vec<RemoteObject> {
    vec![
        folder(&id28("d1"), "docs", ROOT_ID),
        folder(&id28("d2"), "work", &id28("d1")),
        file(&id28("f1"), "report.txt", &id28("d1")),
    ]
}

#[tokio::test]
async fn session_starts_at_the_root() {
    let fx = fixture(tree());

    let home = fx.view.home_directory().await.unwrap();
    let cwd = fx.view.working_directory().await.unwrap();
    assert!(home.is_root());
    assert_eq!(home.abs_path(), "/");
    assert_eq!(cwd.abs_path(), "/");
    assert_eq!(cwd.id(), ROOT_ID);
}

#[tokio::test]
async fn explicit_initialization_is_idempotent() {
    let fx = fixture(tree());

    fx.view.ensure_initialized().await.unwrap();
    fx.view.ensure_initialized().await.unwrap();
    assert_eq!(fx.view.working_directory().await.unwrap().id(), ROOT_ID);
}

#[tokio::test]
async fn initialization_fails_when_the_root_is_not_cached() {
    let fx = fixture(tree());
    fx.store.evict(ROOT_ID).await;

    let err = fx.view.ensure_initialized().await.unwrap_err();
    assert!(matches!(err, GatewayError::Metadata(_)));
}

#[tokio::test]
async fn cd_walks_down_and_back_up() {
    let fx = fixture(tree());

    assert!(fx.view.change_working_directory("docs").await.unwrap());
    assert_eq!(fx.view.working_directory().await.unwrap().abs_path(), "/docs");

    assert!(fx.view.change_working_directory("work").await.unwrap());
    assert_eq!(
        fx.view.working_directory().await.unwrap().abs_path(),
        "/docs/work"
    );

    assert!(fx.view.change_working_directory("..").await.unwrap());
    assert_eq!(fx.view.working_directory().await.unwrap().abs_path(), "/docs");

    assert!(fx.view.change_working_directory("/").await.unwrap());
    assert!(fx.view.working_directory().await.unwrap().is_root());
}

#[tokio::test]
async fn cd_dot_and_parent_at_root_are_no_ops() {
    let fx = fixture(tree());

    assert!(fx.view.change_working_directory(".").await.unwrap());
    assert!(fx.view.change_working_directory("..").await.unwrap());
    assert!(fx.view.working_directory().await.unwrap().is_root());
}

#[tokio::test]
async fn cd_to_a_file_fails_without_state_change() {
    let fx = fixture(tree());

    assert!(fx.view.change_working_directory("/docs").await.unwrap());
    assert!(!fx
        .view
        .change_working_directory("report.txt")
        .await
        .unwrap());
    assert_eq!(fx.view.working_directory().await.unwrap().abs_path(), "/docs");
}

#[tokio::test]
async fn cd_to_a_missing_folder_fails() {
    let fx = fixture(tree());

    assert!(!fx.view.change_working_directory("/nowhere").await.unwrap());
    assert!(fx.view.working_directory().await.unwrap().is_root());
}

#[tokio::test]
async fn cd_accepts_a_deep_absolute_path() {
    let fx = fixture(tree());

    assert!(fx
        .view
        .change_working_directory("/docs/work")
        .await
        .unwrap());
    assert_eq!(
        fx.view.working_directory().await.unwrap().abs_path(),
        "/docs/work"
    );
}
