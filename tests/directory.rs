//! Directory getter tests

mod helper;

use tokio_util::sync::CancellationToken;

use helper::testdata;
use modfetch::fetch::fetch_module;
use modfetch::getter::directory::LOCAL_VERSION;
use modfetch::getter::{DirectoryModuleGetter, ErrorKind, ModuleGetter};
use modfetch::version::Version;

#[test]
fn module_path_is_read_from_go_mod() {
    let getter = DirectoryModuleGetter::new(None, testdata("has_go_mod")).unwrap();
    assert_eq!(getter.module_path(), "example.com/testmod");
}

#[test]
fn directory_without_go_mod_is_bad_module() {
    let err = DirectoryModuleGetter::new(None, testdata("no_go_mod")).unwrap_err();
    assert!(err.is(ErrorKind::BadModule), "got {:?}", err);
}

#[test]
fn explicit_module_path_does_not_need_go_mod() {
    let getter =
        DirectoryModuleGetter::new(Some("example.com/nogomod"), testdata("no_go_mod")).unwrap();
    assert_eq!(getter.module_path(), "example.com/nogomod");
}

#[tokio::test]
async fn fetch_module_reads_working_directory() {
    let getter = DirectoryModuleGetter::new(None, testdata("has_go_mod")).unwrap();

    let fetched = fetch_module(
        &getter,
        "example.com/testmod",
        &Version::Latest,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(fetched.info.version, LOCAL_VERSION);
    assert_eq!(
        fetched.go_mod,
        std::fs::read(testdata("has_go_mod").join("go.mod")).unwrap()
    );
    assert_eq!(fetched.content.files().unwrap(), vec!["go.mod", "hello.go"]);
}

#[tokio::test]
async fn other_module_path_is_not_found() {
    let getter = DirectoryModuleGetter::new(None, testdata("has_go_mod")).unwrap();

    let err = getter
        .content_dir(
            "example.com/other",
            &Version::Latest,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
