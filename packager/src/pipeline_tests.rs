//! Unit tests for the pipeline orchestration with mocked seams.

use super::*;
use crate::download::{MockArchiveFetcher, ResolvedAsset};
use crate::publish::{MockObjectStore, PublishError};
use std::io::Write as _;
use std::path::Path;

/// Build a zip at `path` with the given `(name, contents)` entries.
fn write_stub_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).expect("create zip");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(contents.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish zip");
}

/// Build a config rooted under `root` with stub resources on disk.
fn test_config(root: &Path) -> PackagerConfig {
    let utf8_root =
        camino::Utf8PathBuf::from_path_buf(root.to_path_buf()).expect("utf-8 temp path");

    let mut config = PackagerConfig::default();
    config.output.tmp_dir = utf8_root.join("tmp");
    config.output.out_dir = utf8_root.join("out");
    config.resources.image = utf8_root.join("title.jpg");
    config.resources.interface_dir = utf8_root.join("interface");
    config.secrets.paratranz_token = Some("token".to_owned());

    std::fs::create_dir_all(config.resources.interface_dir.as_std_path()).expect("mkdir");
    std::fs::write(config.resources.image.as_std_path(), b"jpeg").expect("write image");
    std::fs::write(
        config.resources.interface_dir.join("fonts.gfx").as_std_path(),
        b"gfx",
    )
    .expect("write gfx");

    config
}

/// A fetcher mock that writes minimal valid stub archives.
fn stub_fetcher() -> MockArchiveFetcher {
    let mut fetcher = MockArchiveFetcher::new();
    fetcher
        .expect_fetch_release_asset()
        .times(1)
        .returning(|_, dest| {
            write_stub_zip(dest, &[("keep.ttf", "font")]);
            Ok(ResolvedAsset {
                tag: "v1.0".to_owned(),
                asset: "font.zip".to_owned(),
            })
        });
    fetcher
        .expect_fetch_translation_export()
        .times(1)
        .returning(|_, _, dest| {
            write_stub_zip(dest, &[("special/localisation/a.yml", "a")]);
            Ok(())
        });
    fetcher
}

#[test]
fn run_without_storage_credentials_reports_the_missing_variable() {
    let config = PackagerConfig::default();
    let mut stderr = Vec::new();
    let result = run(&config, &mut stderr);
    assert!(matches!(
        result,
        Err(PackagerError::MissingSecret {
            variable: "AWS_S3_ACCESS_KEY"
        })
    ));
}

#[test]
fn run_with_uploads_once_and_writes_the_descriptor() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config = test_config(temp.path());
    let fetcher = stub_fetcher();

    let mut store = MockObjectStore::new();
    store
        .expect_put_object()
        .times(1)
        .returning(|_, _| Ok(()));

    let mut stderr = Vec::new();
    let summary = run_with(&config, &fetcher, &store, &mut stderr).expect("pipeline succeeds");

    assert!(summary.package_path.is_file());
    assert!(summary.descriptor_path.is_file());
    assert!(summary.object_key.ends_with(&config.storage.key_suffix));
    assert_eq!(
        summary.url,
        format!("{}/{}", config.storage.cdn_base_url, summary.object_key)
    );
}

#[test]
fn rejected_upload_aborts_without_a_descriptor() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config = test_config(temp.path());
    let fetcher = stub_fetcher();

    let mut store = MockObjectStore::new();
    store.expect_put_object().times(1).returning(|_, key| {
        Err(PublishError::Upload {
            key: key.to_owned(),
            status: 403,
        })
    });

    let mut stderr = Vec::new();
    let result = run_with(&config, &fetcher, &store, &mut stderr);

    assert!(matches!(
        result,
        Err(PackagerError::Publish(PublishError::Upload { status: 403, .. }))
    ));
    // The package was built but no descriptor documents it.
    let descriptor = config.output.out_dir.join(&config.output.descriptor_name);
    assert!(!descriptor.as_std_path().exists());
}
