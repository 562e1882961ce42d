//! End-to-end packaging pipeline.
//!
//! The pipeline is strictly sequential: fetch the font release and the
//! translation export, assemble the core mod, pack it with the launcher
//! manifest, then upload and describe the result. Every stage blocks
//! until complete and the first failure aborts the run — there is no
//! retry and no partial-success state. Downloads and intermediate
//! archives live in the persistent scratch folder and are left behind
//! for inspection; only the final package and the descriptor land in the
//! output folder.

use crate::assemble::{self, CoreModInputs};
use crate::config::{
    PARATRANZ_SECRET_VAR, PackagerConfig, STORAGE_ACCESS_KEY_VAR, STORAGE_SECRET_KEY_VAR,
};
use crate::digest::{self, Md5Digest};
use crate::download::{ArchiveFetcher, HttpFetcher, ReleaseRequest, TranslationRequest};
use crate::error::{PackagerError, Result};
use crate::manifest::{ModFileName, ModManifest};
use crate::output::write_stderr_line;
use crate::package;
use crate::publish::{self, DistributionDescriptor, ObjectStore, S3Store};
use chrono::Utc;
use std::io::Write;
use std::path::PathBuf;

/// File name of the downloaded font release archive in the scratch
/// folder.
const FONT_ARCHIVE_NAME: &str = "font.zip";

/// File name of the downloaded translation export in the scratch folder.
const TRANSLATION_ARCHIVE_NAME: &str = "paratranz.zip";

/// File name of the assembled core mod archive in the scratch folder.
const CORE_ARCHIVE_NAME: &str = "mod.zip";

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Path of the final package archive in the output folder.
    pub package_path: PathBuf,
    /// Path of the written distribution descriptor.
    pub descriptor_path: PathBuf,
    /// Object key the package was uploaded under.
    pub object_key: String,
    /// Public CDN URL of the uploaded package.
    pub url: String,
    /// Content fingerprint of the package archive.
    pub digest: Md5Digest,
}

/// Run the full pipeline with production HTTP and storage
/// implementations.
///
/// # Errors
///
/// Returns [`PackagerError::MissingSecret`] when a storage credential is
/// absent from the environment, and propagates every stage failure
/// unchanged.
pub fn run(config: &PackagerConfig, stderr: &mut dyn Write) -> Result<RunSummary> {
    let access_key = config
        .secrets
        .storage_access_key
        .as_deref()
        .ok_or(PackagerError::MissingSecret {
            variable: STORAGE_ACCESS_KEY_VAR,
        })?;
    let secret_key = config
        .secrets
        .storage_secret_key
        .as_deref()
        .ok_or(PackagerError::MissingSecret {
            variable: STORAGE_SECRET_KEY_VAR,
        })?;
    let store = S3Store::new(&config.storage, access_key, secret_key)?;
    run_with(config, &HttpFetcher, &store, stderr)
}

/// Testable pipeline with injected fetcher and store implementations.
///
/// The production entry point [`run`] delegates here with real
/// implementations; tests inject fakes.
///
/// # Errors
///
/// Propagates every stage failure unchanged; see [`run`].
pub fn run_with(
    config: &PackagerConfig,
    fetcher: &dyn ArchiveFetcher,
    store: &dyn ObjectStore,
    stderr: &mut dyn Write,
) -> Result<RunSummary> {
    let tmp_dir = config.output.tmp_dir.as_std_path();
    let out_dir = config.output.out_dir.as_std_path();
    std::fs::create_dir_all(tmp_dir)?;
    std::fs::create_dir_all(out_dir)?;

    // Step 1: fetch the font release asset.
    write_stderr_line(
        stderr,
        format!(
            "Fetching font release for {}/{}...",
            config.source.owner, config.source.repo
        ),
    );
    let font_path = tmp_dir.join(FONT_ARCHIVE_NAME);
    let release = ReleaseRequest {
        owner: config.source.owner.clone(),
        repo: config.source.repo.clone(),
        tag: config.source.tag.clone(),
        asset: config.source.asset.clone(),
    };
    let resolved = fetcher.fetch_release_asset(&release, &font_path)?;
    write_stderr_line(
        stderr,
        format!("Fetched {} from release {}.", resolved.asset, resolved.tag),
    );

    // Step 2: fetch the translation export.
    let token = config
        .secrets
        .paratranz_token
        .as_deref()
        .ok_or(PackagerError::MissingSecret {
            variable: PARATRANZ_SECRET_VAR,
        })?;
    write_stderr_line(
        stderr,
        format!(
            "Fetching translation export for project {}...",
            config.translation.project_id
        ),
    );
    let translation_path = tmp_dir.join(TRANSLATION_ARCHIVE_NAME);
    fetcher.fetch_translation_export(
        &TranslationRequest {
            project_id: config.translation.project_id,
            base_url: config.translation.base_url.clone(),
        },
        token,
        &translation_path,
    )?;

    // Step 3: assemble the core mod.
    write_stderr_line(stderr, "Assembling core mod...");
    let core_path = tmp_dir.join(CORE_ARCHIVE_NAME);
    assemble::assemble_core_mod(
        &CoreModInputs {
            font_archive: &font_path,
            translation_archive: &translation_path,
            image: config.resources.image.as_std_path(),
            interface_dir: config.resources.interface_dir.as_std_path(),
        },
        &config.curation,
        &core_path,
    )?;

    // Step 4: pack the core mod with the launcher manifest.
    write_stderr_line(stderr, "Packing mod archive...");
    let file_name = ModFileName::try_from(config.mod_info.file_base_name.as_str())?;
    let mut manifest = ModManifest::new(
        config.mod_info.title.clone(),
        file_name,
        config.mod_info.tags.clone(),
        config.mod_info.picture.clone(),
    );
    if let Some(user_dir) = &config.mod_info.user_dir {
        manifest = manifest.with_user_dir(user_dir.clone());
    }
    let package_path = out_dir.join(format!("{}.zip", config.output.package_name));
    package::pack_mod(&core_path, &manifest, &package_path)?;

    // Step 5: upload and write the distribution descriptor.
    let file_md5 = digest::compute_md5(&package_path)?;
    let object_key = publish::object_key(&Utc::now(), &config.storage.key_suffix);
    write_stderr_line(
        stderr,
        format!(
            "Uploading {object_key} to bucket {}...",
            config.storage.bucket
        ),
    );
    store.put_object(&package_path, &object_key)?;

    let url = publish::public_url(&config.storage.cdn_base_url, &object_key);
    let descriptor_path = out_dir.join(&config.output.descriptor_name);
    DistributionDescriptor {
        file_md5: file_md5.clone(),
        url: url.clone(),
    }
    .write_to(&descriptor_path)?;
    write_stderr_line(stderr, format!("Published {url}"));

    Ok(RunSummary {
        package_path,
        descriptor_path,
        object_key,
        url,
        digest: file_md5,
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
