//! Localization mod packager entrypoint.
//!
//! This binary runs the full packaging pipeline: fetch the font release
//! and the translation export, assemble and pack the core mod, upload it
//! to object storage and write the distribution descriptor. There are no
//! command-line flags — configuration comes from an optional
//! `locmod.toml` next to the working directory and from the secret
//! environment variables.

use camino::Utf8Path;
use locmod_packager::config::PackagerConfig;
use locmod_packager::error::Result;
use locmod_packager::output::write_stderr_line;
use locmod_packager::pipeline::{self, RunSummary};
use std::io::Write;

/// Configuration file consulted when present in the working directory.
const CONFIG_FILE: &str = "locmod.toml";

fn main() {
    let mut stderr = std::io::stderr();
    let run_result = run(&mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(stderr: &mut dyn Write) -> Result<RunSummary> {
    let config = PackagerConfig::load_or_default(Utf8Path::new(CONFIG_FILE))?;
    pipeline::run(&config, stderr)
}

fn exit_code_for_run_result(result: Result<RunSummary>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(summary) => {
            write_stderr_line(
                stderr,
                format!(
                    "Package published; descriptor written to {}",
                    summary.descriptor_path.display()
                ),
            );
            0
        }
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locmod_packager::digest::Md5Digest;
    use locmod_packager::error::PackagerError;
    use std::path::PathBuf;

    fn sample_summary() -> RunSummary {
        RunSummary {
            package_path: PathBuf::from("out/ck2_core_mod.zip"),
            descriptor_path: PathBuf::from("out/dist.v1.json"),
            object_key: "2026-08-05_10-30-00-ck2-core".to_owned(),
            url: "https://cdn.example.net/2026-08-05_10-30-00-ck2-core".to_owned(),
            digest: Md5Digest::try_from("5eb63bbbe01eeed093cb22bb8f5acdc3")
                .expect("valid digest"),
        }
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(sample_summary()), &mut stderr);
        assert_eq!(exit_code, 0);
        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.contains("dist.v1.json"));
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = PackagerError::MissingSecret {
            variable: "PARATRANZ_SECRET",
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.contains("PARATRANZ_SECRET"));
    }
}
