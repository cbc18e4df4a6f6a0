//! Path resolution against the in-memory metadata store.

mod support;

use driveftp_core::config::DEFAULT_ILLEGAL_CHARS;
use driveftp_core::types::RemoteObject;
use driveftp_vfs::{FileSystemView, NameCodec};

use support::{file, fixture, folder, id28, ROOT_ID};

fn tree() -> Vec<RemoteObject> {
    vec![
        folder(&id28("d1"), "docs", ROOT_ID),
        folder(&id28("d2"), "work", &id28("d1")),
        file(&id28("f1"), "report.txt", &id28("d1")),
        file(&id28("f2"), "deep.txt", &id28("d2")),
        file(&id28("w1"), "we|ird", ROOT_ID),
        file(&id28("a1"), "dup.txt", ROOT_ID),
        file(&id28("b1"), "dup.txt", ROOT_ID),
    ]
}

fn codec() -> NameCodec {
    NameCodec::new(DEFAULT_ILLEGAL_CHARS).unwrap()
}

#[tokio::test]
async fn resolves_absolute_paths() {
    let fx = fixture(tree());

    let node = fx.view.get_file("/docs/report.txt").await.unwrap().unwrap();
    assert!(node.exists());
    assert!(!node.is_directory());
    assert_eq!(node.id(), id28("f1"));
    assert_eq!(node.abs_path(), "/docs/report.txt");
    assert_eq!(node.parent().unwrap().id(), id28("d1"));
}

#[tokio::test]
async fn resolves_relative_to_the_working_directory() {
    let fx = fixture(tree());

    assert!(fx.view.change_working_directory("/docs").await.unwrap());
    let node = fx.view.get_file("work/deep.txt").await.unwrap().unwrap();
    assert_eq!(node.id(), id28("f2"));
    assert_eq!(node.abs_path(), "/docs/work/deep.txt");
}

#[tokio::test]
async fn absolute_path_scoped_under_the_working_directory() {
    let fx = fixture(tree());

    assert!(fx.view.change_working_directory("/docs").await.unwrap());
    let node = fx.view.get_file("/docs/report.txt").await.unwrap().unwrap();
    assert_eq!(node.id(), id28("f1"));
}

#[tokio::test]
async fn empty_and_dot_slash_mean_the_working_directory() {
    let fx = fixture(tree());

    assert!(fx.view.change_working_directory("/docs").await.unwrap());
    for arg in ["", "./"] {
        let node = fx.view.get_file(arg).await.unwrap().unwrap();
        assert_eq!(node.id(), id28("d1"));
    }
}

#[tokio::test]
async fn missing_target_yields_a_prospective_node() {
    let fx = fixture(tree());

    let node = fx
        .view
        .get_file("/docs/work/newfile.bin")
        .await
        .unwrap()
        .unwrap();
    assert!(!node.exists());
    assert_eq!(node.virtual_name(), "newfile.bin");
    assert!(node.object().parents.contains(&id28("d2")));
}

#[tokio::test]
async fn encoded_component_resolves_by_id() {
    let fx = fixture(tree());

    let encoded = codec().encode("dup.txt", &id28("a1"));
    let node = fx
        .view
        .get_file(&format!("/{encoded}"))
        .await
        .unwrap()
        .unwrap();
    assert!(node.exists());
    assert_eq!(node.id(), id28("a1"));
    // the node keeps its encoded virtual name, which is how the client
    // addressed it
    assert_eq!(node.virtual_name(), encoded);
}

#[tokio::test]
async fn encoded_name_must_match_the_real_object() {
    let fx = fixture(tree());

    // valid id, wrong plain name: no silent aliasing
    let bogus = codec().encode("other.txt", &id28("a1"));
    let node = fx
        .view
        .get_file(&format!("/{bogus}"))
        .await
        .unwrap()
        .unwrap();
    assert!(!node.exists());
}

#[tokio::test]
async fn duplicated_plain_name_is_treated_as_missing() {
    let fx = fixture(tree());

    let node = fx.view.get_file("/dup.txt").await.unwrap().unwrap();
    assert!(!node.exists());
    assert!(node.object().parents.contains(ROOT_ID));
}

#[tokio::test]
async fn illegal_characters_are_masked_with_an_encoded_name() {
    let fx = fixture(tree());

    let node = fx.view.get_file("/we|ird").await.unwrap().unwrap();
    assert!(node.exists());
    assert_eq!(node.id(), id28("w1"));
    assert_eq!(node.virtual_name(), codec().encode("we_ird", &id28("w1")));
}

#[tokio::test]
async fn trailing_separators_are_tolerated() {
    let fx = fixture(tree());

    let node = fx.view.get_file("/docs/work/").await.unwrap().unwrap();
    assert!(node.is_directory());
    assert_eq!(node.id(), id28("d2"));
}
