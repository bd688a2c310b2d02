//! Dynamic library dependency discovery and bundling for macOS .app bundles.
//!
//! Computes the transitive closure of non-system dylib dependencies of the
//! root executables and copies the resolved libraries into
//! `Contents/Frameworks`.

use crate::bundler::{
    builder::tool_detection::locate,
    error::{Error, Result, Warning},
    utils::fs,
};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Prefix of dependency paths resolved through the binary's rpath list.
pub const RPATH_MARKER: &str = "@rpath/";

/// Reports the direct dependencies of a file.
///
/// Entries are returned as recorded in the binary: absolute paths or
/// `@rpath/`-relative references, without version annotations.
pub trait DependencyProbe {
    /// Lists the dependency entries of `path`.
    ///
    /// # Errors
    ///
    /// [`Error::ProbeFailure`] when the probe cannot produce a report.
    fn dependencies(&self, path: &str) -> Result<Vec<String>>;
}

/// `otool -L` backed dependency probe.
#[derive(Debug, Clone)]
pub struct Otool {
    program: PathBuf,
}

impl Otool {
    /// Locates `program` on PATH (or checks it directly when it is a path).
    pub fn locate(program: &Path) -> Result<Self> {
        let program = locate(program).map_err(|reason| Error::ProbeFailure {
            path: program.display().to_string(),
            reason,
        })?;
        Ok(Self { program })
    }
}

impl DependencyProbe for Otool {
    fn dependencies(&self, path: &str) -> Result<Vec<String>> {
        let output = Command::new(&self.program)
            .arg("-L")
            .arg(path)
            .output()
            .map_err(|e| Error::ProbeFailure {
                path: path.to_string(),
                reason: format!("failed to execute {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            return Err(Error::ProbeFailure {
                path: path.to_string(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(parse_probe_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Extracts dependency paths from an `otool -L` report.
///
/// The first line names the probed file and is discarded. Every other line
/// is `<path> (compatibility version ..., current version ...)`.
pub fn parse_probe_output(report: &str) -> Vec<String> {
    report
        .lines()
        .skip(1)
        .map(|line| {
            let line = line.trim();
            line.split("(compatibility ")
                .next()
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .filter(|lib| !lib.is_empty())
        .collect()
}

/// Resolves an `@rpath/` reference against `search_dirs`, in order.
///
/// Returns the first existing candidate; anything else is returned unchanged,
/// including references no directory can satisfy.
pub fn resolve_relocatable(reference: &str, search_dirs: &[PathBuf]) -> String {
    let Some(name) = reference.strip_prefix(RPATH_MARKER) else {
        return reference.to_string();
    };

    search_dirs
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
        .map(|candidate| candidate.to_string_lossy().into_owned())
        .unwrap_or_else(|| reference.to_string())
}

/// True when `path` lives under one of the `blacklist` prefixes.
pub fn is_blacklisted(path: &str, blacklist: &[String]) -> bool {
    blacklist.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// Computes the transitive dependency closure of `roots`.
///
/// Worklist traversal: each path is probed once; resolved, non-blacklisted
/// entries join the result and the frontier. References still carrying the
/// `@rpath/` marker after resolution are kept in the result but not probed.
///
/// The result is sorted and free of duplicates.
pub fn scan<P: DependencyProbe + ?Sized>(
    probe: &P,
    roots: &[PathBuf],
    search_dirs: &[PathBuf],
    blacklist: &[String],
) -> Result<Vec<PathBuf>> {
    let mut frontier: Vec<String> = roots
        .iter()
        .map(|root| root.to_string_lossy().into_owned())
        .collect();
    let mut visited = HashSet::new();
    let mut found = BTreeSet::new();

    while let Some(name) = frontier.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        if name.starts_with(RPATH_MARKER) {
            log::debug!("not probing unresolved reference: {}", name);
            continue;
        }

        log::debug!("computing dependencies for: {}", name);
        for entry in probe.dependencies(&name)? {
            let lib = resolve_relocatable(&entry, search_dirs);
            if is_blacklisted(&lib, blacklist) {
                continue;
            }
            log::debug!("   {}", lib);
            if found.insert(lib.clone()) {
                frontier.push(lib);
            }
        }
    }

    Ok(found.into_iter().map(PathBuf::from).collect())
}

/// Copies every library into `frameworks_dir` under its file name.
///
/// A library that cannot be copied is recorded as a [`Warning::LibraryCopy`]
/// and skipped. Returns the destinations that were written.
pub async fn bundle_libraries(
    libraries: &[PathBuf],
    frameworks_dir: &Path,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(frameworks_dir, false).await?;

    let mut copied = Vec::new();
    for lib in libraries {
        log::debug!("copying: {}", lib.display());

        let Some(file_name) = lib.file_name() else {
            record(warnings, lib, "not a file path".into());
            continue;
        };
        let dest = frameworks_dir.join(file_name);
        match fs::copy_file(lib, &dest).await {
            Ok(_) => copied.push(dest),
            Err(e) => record(warnings, lib, e.to_string()),
        }
    }

    log::info!(
        "Bundled {} of {} dylibs into {}",
        copied.len(),
        libraries.len(),
        frameworks_dir.display()
    );
    Ok(copied)
}

fn record(warnings: &mut Vec<Warning>, lib: &Path, reason: String) {
    let warning = Warning::LibraryCopy {
        library: lib.display().to_string(),
        reason,
    };
    log::warn!("{}", warning);
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Probe answering from a fixed table; unknown paths are probe failures.
    struct TableProbe(HashMap<String, Vec<String>>);

    impl TableProbe {
        fn new(entries: Vec<(&str, Vec<&str>)>) -> Self {
            Self(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.into_iter().map(String::from).collect()))
                    .collect(),
            )
        }
    }

    impl DependencyProbe for TableProbe {
        fn dependencies(&self, path: &str) -> Result<Vec<String>> {
            self.0.get(path).cloned().ok_or_else(|| Error::ProbeFailure {
                path: path.into(),
                reason: "no such file".into(),
            })
        }
    }

    fn blacklist() -> Vec<String> {
        vec!["/System/".into(), "/usr/lib/".into()]
    }

    #[test]
    fn parse_skips_header_and_strips_versions() {
        let report = "/app/Contents/MacOS/ART:\n\
            \t@rpath/libfoo.dylib (compatibility version 1.0.0, current version 1.2.0)\n\
            \t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1311.0.0)\n\
            \n";
        assert_eq!(
            parse_probe_output(report),
            vec!["@rpath/libfoo.dylib", "/usr/lib/libSystem.B.dylib"]
        );
    }

    #[test]
    fn resolve_uses_the_directory_holding_the_file() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty");
        let libs = temp.path().join("libs");
        std::fs::create_dir_all(&empty).unwrap();
        std::fs::create_dir_all(&libs).unwrap();
        std::fs::write(libs.join("libfoo.dylib"), "").unwrap();

        let resolved = resolve_relocatable("@rpath/libfoo.dylib", &[empty, libs.clone()]);
        assert_eq!(resolved, libs.join("libfoo.dylib").to_string_lossy());
    }

    #[test]
    fn resolve_prefers_earlier_search_dirs() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("a");
        let second = temp.path().join("b");
        for dir in [&first, &second] {
            std::fs::create_dir_all(dir).unwrap();
            std::fs::write(dir.join("libz.dylib"), "").unwrap();
        }
        let resolved = resolve_relocatable("@rpath/libz.dylib", &[first.clone(), second]);
        assert_eq!(resolved, first.join("libz.dylib").to_string_lossy());
    }

    #[test]
    fn unresolvable_reference_is_returned_unchanged() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_relocatable("@rpath/libmissing.dylib", &[temp.path().into()]);
        assert_eq!(resolved, "@rpath/libmissing.dylib");
        assert_eq!(resolve_relocatable("/opt/lib/libx.dylib", &[]), "/opt/lib/libx.dylib");
    }

    #[test]
    fn scan_resolves_rpath_and_drops_system_libraries() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("libfoo.dylib"), "").unwrap();
        let libfoo = temp.path().join("libfoo.dylib");
        let libfoo_str = libfoo.to_string_lossy().into_owned();

        let probe = TableProbe::new(vec![
            (
                "/app/ART",
                vec!["@rpath/libfoo.dylib", "/usr/lib/libSystem.B.dylib"],
            ),
            (libfoo_str.as_str(), vec!["/usr/lib/libc++.1.dylib"]),
        ]);

        let result = scan(
            &probe,
            &[PathBuf::from("/app/ART")],
            &[temp.path().to_path_buf()],
            &blacklist(),
        )
        .unwrap();

        assert_eq!(result, vec![libfoo]);
    }

    #[test]
    fn scan_follows_transitive_edges_and_cycles() {
        let probe = TableProbe::new(vec![
            ("/app/ART", vec!["/opt/local/lib/libgtk-3.0.dylib", "/System/Library/Foo"]),
            (
                "/opt/local/lib/libgtk-3.0.dylib",
                vec!["/opt/local/lib/libgtk-3.0.dylib", "/opt/local/lib/libglib-2.0.dylib"],
            ),
            (
                "/opt/local/lib/libglib-2.0.dylib",
                vec!["/opt/local/lib/libintl.dylib", "/opt/local/lib/libgtk-3.0.dylib"],
            ),
            ("/opt/local/lib/libintl.dylib", vec![]),
        ]);

        let result = scan(&probe, &[PathBuf::from("/app/ART")], &[], &blacklist()).unwrap();

        assert_eq!(
            result,
            vec![
                PathBuf::from("/opt/local/lib/libglib-2.0.dylib"),
                PathBuf::from("/opt/local/lib/libgtk-3.0.dylib"),
                PathBuf::from("/opt/local/lib/libintl.dylib"),
            ]
        );
        assert!(
            result
                .iter()
                .all(|p| !is_blacklisted(&p.to_string_lossy(), &blacklist()))
        );
    }

    #[test]
    fn scan_is_independent_of_report_order() {
        let forward = TableProbe::new(vec![
            ("/r1", vec!["/opt/a.dylib", "/opt/b.dylib"]),
            ("/r2", vec!["/opt/c.dylib"]),
            ("/opt/a.dylib", vec!["/opt/c.dylib"]),
            ("/opt/b.dylib", vec![]),
            ("/opt/c.dylib", vec!["/opt/b.dylib"]),
        ]);
        let reversed = TableProbe::new(vec![
            ("/r1", vec!["/opt/b.dylib", "/opt/a.dylib"]),
            ("/r2", vec!["/opt/c.dylib"]),
            ("/opt/a.dylib", vec!["/opt/c.dylib"]),
            ("/opt/b.dylib", vec![]),
            ("/opt/c.dylib", vec!["/opt/b.dylib"]),
        ]);
        let roots = [PathBuf::from("/r1"), PathBuf::from("/r2")];
        let swapped = [PathBuf::from("/r2"), PathBuf::from("/r1")];

        let a = scan(&forward, &roots, &[], &blacklist()).unwrap();
        let b = scan(&reversed, &swapped, &[], &blacklist()).unwrap();
        let again = scan(&forward, &roots, &[], &blacklist()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a, again);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn unresolved_reference_is_kept_but_not_probed() {
        // Probing "@rpath/libgone.dylib" would fail with the table probe.
        let probe = TableProbe::new(vec![("/app/ART", vec!["@rpath/libgone.dylib"])]);
        let result = scan(&probe, &[PathBuf::from("/app/ART")], &[], &blacklist()).unwrap();
        assert_eq!(result, vec![PathBuf::from("@rpath/libgone.dylib")]);
    }

    #[test]
    fn probe_failure_aborts_the_scan() {
        let probe = TableProbe::new(vec![("/app/ART", vec!["/opt/local/lib/libunknown.dylib"])]);
        let err = scan(&probe, &[PathBuf::from("/app/ART")], &[], &blacklist()).unwrap_err();
        assert!(matches!(err, Error::ProbeFailure { ref path, .. } if path == "/opt/local/lib/libunknown.dylib"));
    }

    #[tokio::test]
    async fn missing_libraries_become_warnings() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("libpresent.dylib");
        std::fs::write(&present, "mach-o").unwrap();
        let frameworks = temp.path().join("ART.app/Contents/Frameworks");

        let mut warnings = Vec::new();
        let copied = bundle_libraries(
            &[present, PathBuf::from("@rpath/libgone.dylib")],
            &frameworks,
            &mut warnings,
        )
        .await
        .unwrap();

        assert_eq!(copied, vec![frameworks.join("libpresent.dylib")]);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], Warning::LibraryCopy { library, .. } if library == "@rpath/libgone.dylib"));
    }

    #[cfg(unix)]
    #[test]
    fn otool_reports_nonzero_exit_as_probe_failure() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("otool");
        std::fs::write(&tool, "#!/bin/sh\necho 'not an object file' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let otool = Otool::locate(&tool).unwrap();
        let err = otool.dependencies("/app/ART").unwrap_err();
        assert!(matches!(err, Error::ProbeFailure { ref reason, .. } if reason.contains("not an object file")));
    }

    #[cfg(unix)]
    #[test]
    fn otool_output_is_parsed() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("otool");
        std::fs::write(
            &tool,
            "#!/bin/sh\necho \"$2:\"\necho '\t/opt/local/lib/libz.1.dylib (compatibility version 1.0.0, current version 1.3.1)'\n",
        )
        .unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let otool = Otool::locate(&tool).unwrap();
        assert_eq!(
            otool.dependencies("/app/ART").unwrap(),
            vec!["/opt/local/lib/libz.1.dylib"]
        );
    }

    #[test]
    fn missing_probe_program_is_a_probe_failure() {
        let err = Otool::locate(Path::new("definitely-not-a-real-otool-binary")).unwrap_err();
        assert!(matches!(err, Error::ProbeFailure { .. }));
    }
}
