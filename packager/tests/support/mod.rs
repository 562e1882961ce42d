//! Shared helpers for behaviour tests: stub archive construction and
//! fake fetcher/store implementations for the pipeline seams.

use locmod_packager::download::{
    ArchiveFetcher, DownloadError, ReleaseRequest, ResolvedAsset, TranslationRequest,
};
use locmod_packager::publish::{ObjectStore, PublishError};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Build a zip at `path` with the given `(name, contents)` entries.
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).expect("create zip");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(contents.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish zip");
}

/// List the entry names of a zip archive.
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("open zip");
    let archive = zip::ZipArchive::new(file).expect("read zip");
    archive.file_names().map(str::to_owned).collect()
}

/// Read one entry of a zip archive into memory.
pub fn read_zip_entry(path: &Path, name: &str) -> Vec<u8> {
    let file = std::fs::File::open(path).expect("open zip");
    let mut archive = zip::ZipArchive::new(file).expect("read zip");
    let mut entry = archive.by_name(name).expect("entry present");
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut entry, &mut bytes).expect("read entry");
    bytes
}

/// A fetcher that writes prepared stub archives instead of hitting the
/// network.
pub struct StubFetcher {
    /// Entries written into the font release archive.
    pub font_entries: Vec<(&'static str, &'static str)>,
    /// Entries written into the translation export archive.
    pub translation_entries: Vec<(&'static str, &'static str)>,
    /// Tokens seen by the translation fetch, for assertions.
    pub seen_tokens: RefCell<Vec<String>>,
}

impl StubFetcher {
    /// A fetcher serving the spec scenario archives.
    pub fn with_scenario_archives() -> Self {
        Self {
            font_entries: vec![
                ("keep.ttf", "font bytes"),
                ("aoyagireisyo60-aoyagi_extra.ttf", "font bytes"),
            ],
            translation_entries: vec![
                ("special/localisation/a.yml", "a_key: a"),
                ("other/b.yml", "b_key: b"),
            ],
            seen_tokens: RefCell::new(Vec::new()),
        }
    }
}

impl ArchiveFetcher for StubFetcher {
    fn fetch_release_asset(
        &self,
        _request: &ReleaseRequest,
        dest: &Path,
    ) -> Result<ResolvedAsset, DownloadError> {
        write_zip(dest, &self.font_entries);
        Ok(ResolvedAsset {
            tag: "v9.9".to_owned(),
            asset: "font.zip".to_owned(),
        })
    }

    fn fetch_translation_export(
        &self,
        _request: &TranslationRequest,
        token: &str,
        dest: &Path,
    ) -> Result<(), DownloadError> {
        self.seen_tokens.borrow_mut().push(token.to_owned());
        write_zip(dest, &self.translation_entries);
        Ok(())
    }
}

/// A fetcher whose release lookup always fails, for propagation tests.
pub struct FailingFetcher;

impl ArchiveFetcher for FailingFetcher {
    fn fetch_release_asset(
        &self,
        _request: &ReleaseRequest,
        _dest: &Path,
    ) -> Result<ResolvedAsset, DownloadError> {
        Err(DownloadError::NotFound {
            url: "https://example.test/releases/latest".to_owned(),
        })
    }

    fn fetch_translation_export(
        &self,
        _request: &TranslationRequest,
        _token: &str,
        _dest: &Path,
    ) -> Result<(), DownloadError> {
        Err(DownloadError::NotFound {
            url: "https://example.test/artifacts/download".to_owned(),
        })
    }
}

/// An object store that copies uploads into a local directory and
/// records the keys it saw.
pub struct RecordingStore {
    /// Directory receiving the "uploaded" objects.
    pub upload_dir: PathBuf,
    /// Keys in the order they were uploaded.
    pub keys: RefCell<Vec<String>>,
}

impl RecordingStore {
    /// Create a store uploading into `upload_dir`.
    pub fn new(upload_dir: PathBuf) -> Self {
        std::fs::create_dir_all(&upload_dir).expect("create upload dir");
        Self {
            upload_dir,
            keys: RefCell::new(Vec::new()),
        }
    }

    /// Path the object with `key` was stored under.
    pub fn object_path(&self, key: &str) -> PathBuf {
        self.upload_dir.join(key)
    }
}

impl ObjectStore for RecordingStore {
    fn put_object(&self, path: &Path, key: &str) -> Result<(), PublishError> {
        std::fs::copy(path, self.object_path(key))?;
        self.keys.borrow_mut().push(key.to_owned());
        Ok(())
    }
}
