//! Auxiliary runtime assets copied from the install prefix.
//!
//! The manifest is a flat, ordered list of [`ManifestEntry`] values. Applying
//! it is best-effort: a missing or mismatched source produces exactly one
//! [`Warning::ResourceCopy`] and copies nothing for that entry.

use crate::bundler::{error::Warning, utils::fs};
use std::path::{Path, PathBuf};

/// One asset to place in the bundle.
///
/// `category` is relative to `Contents/`; the asset lands at
/// `Contents/<category>/<name>` where `name` is the source's file name unless
/// the entry renames it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// Single file, keeping its name.
    File { source: PathBuf, category: PathBuf },
    /// Directory tree, keeping its name.
    Directory { source: PathBuf, category: PathBuf },
    /// Single file stored under a new name.
    RenamedFile {
        source: PathBuf,
        category: PathBuf,
        name: String,
    },
    /// Directory tree stored under a new name.
    RenamedDirectory {
        source: PathBuf,
        category: PathBuf,
        name: String,
    },
}

impl ManifestEntry {
    pub fn file(source: impl Into<PathBuf>, category: impl Into<PathBuf>) -> Self {
        Self::File {
            source: source.into(),
            category: category.into(),
        }
    }

    pub fn dir(source: impl Into<PathBuf>, category: impl Into<PathBuf>) -> Self {
        Self::Directory {
            source: source.into(),
            category: category.into(),
        }
    }

    /// Source path on the build host.
    pub fn source(&self) -> &Path {
        match self {
            Self::File { source, .. }
            | Self::Directory { source, .. }
            | Self::RenamedFile { source, .. }
            | Self::RenamedDirectory { source, .. } => source,
        }
    }

    /// True for directory entries.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. } | Self::RenamedDirectory { .. })
    }

    /// Destination relative to `Contents/`, or `None` when the source has no file name.
    pub fn destination(&self) -> Option<PathBuf> {
        match self {
            Self::File { source, category } | Self::Directory { source, category } => {
                source.file_name().map(|name| category.join(name))
            }
            Self::RenamedFile { category, name, .. }
            | Self::RenamedDirectory { category, name, .. } => Some(category.join(name)),
        }
    }
}

/// Inputs to [`build`] besides the prefix.
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    /// exiftool script to bundle; `None` when the helper is disabled.
    pub exiftool: Option<PathBuf>,
    /// Lensfun database directory.
    pub lensfun_database: Option<PathBuf>,
}

/// Per-entry outcome of [`apply`].
#[derive(Debug, Default)]
pub struct ManifestReport {
    /// Bytes copied per entry, in manifest order (0 for skipped entries).
    pub copied: Vec<(ManifestEntry, u64)>,
    /// One warning per skipped entry.
    pub warnings: Vec<Warning>,
}

impl ManifestReport {
    /// Total bytes copied.
    pub fn total_bytes(&self) -> u64 {
        self.copied.iter().map(|(_, n)| n).sum()
    }
}

/// Builds the asset list for a GTK 3 install under `prefix`.
pub fn build(prefix: &Path, options: &ManifestOptions) -> Vec<ManifestEntry> {
    let p = |s: &str| prefix.join(s);

    let mut entries = Vec::new();

    for pattern in [
        "lib/gdk-pixbuf-2.0/2.10.0/loaders/*.so",
        "lib/gtk-3.0/3*/immodules/*.so",
    ] {
        entries.extend(
            expand(&p(pattern))
                .into_iter()
                .map(|module| ManifestEntry::file(module, "Frameworks")),
        );
    }

    entries.extend([
        ManifestEntry::file(p("bin/gtk-query-immodules-3.0"), "Resources"),
        ManifestEntry::file(p("bin/gdk-pixbuf-query-loaders"), "Resources"),
        ManifestEntry::file(p("bin/dbus-daemon"), "Resources"),
        ManifestEntry::file(p("share/dbus-1/session.conf"), "Resources/dbus-1"),
        ManifestEntry::dir(
            p("share/icons/Adwaita/scalable"),
            "Resources/share/icons/Adwaita",
        ),
        ManifestEntry::file(
            p("share/icons/Adwaita/index.theme"),
            "Resources/share/icons/Adwaita",
        ),
        ManifestEntry::dir(
            p("share/icons/Adwaita/cursors"),
            "Resources/share/icons/Adwaita",
        ),
        ManifestEntry::dir(p("share/icons/hicolor"), "Resources/share/icons"),
        ManifestEntry::file(
            p("share/glib-2.0/schemas/gschemas.compiled"),
            "Resources/share/glib-2.0/schemas",
        ),
    ]);

    if let Some(lensfun) = &options.lensfun_database {
        entries.push(ManifestEntry::RenamedDirectory {
            source: lensfun.clone(),
            category: "Resources".into(),
            name: "lensfun".into(),
        });
    }

    entries.extend([
        ManifestEntry::dir(p("etc/gtk-3.0"), "Resources/etc"),
        ManifestEntry::file(p("etc/fonts/fonts.conf"), "Resources"),
    ]);

    if let Some(exiftool) = options.exiftool.as_deref().filter(|e| e.exists()) {
        entries.push(ManifestEntry::RenamedFile {
            source: exiftool.to_path_buf(),
            category: "Resources/exiftool".into(),
            name: "exiftool".into(),
        });
        entries.push(ManifestEntry::RenamedDirectory {
            source: exiftool.with_file_name("lib"),
            category: "Resources/exiftool".into(),
            name: "lib".into(),
        });
    }

    entries
}

/// Expands a glob pattern into the matching paths, sorted.
fn expand(pattern: &Path) -> Vec<PathBuf> {
    let Some(pattern) = pattern.to_str() else {
        return Vec::new();
    };
    match glob::glob(pattern) {
        Ok(paths) => {
            let mut found: Vec<PathBuf> = paths.flatten().collect();
            found.sort();
            found
        }
        Err(e) => {
            log::debug!("invalid pattern {}: {}", pattern, e);
            Vec::new()
        }
    }
}

/// Copies every entry below `contents_dir` (the bundle's `Contents/`).
///
/// Never fails: problems become warnings in the report.
pub async fn apply(entries: &[ManifestEntry], contents_dir: &Path) -> ManifestReport {
    let mut report = ManifestReport::default();

    for entry in entries {
        log::debug!("copying: {}", entry.source().display());
        let outcome = copy_entry(entry, contents_dir).await;
        let bytes = match outcome {
            Ok(bytes) => bytes,
            Err(reason) => {
                let warning = Warning::ResourceCopy {
                    path: entry.source().to_path_buf(),
                    reason,
                };
                log::warn!("{}", warning);
                report.warnings.push(warning);
                0
            }
        };
        report.copied.push((entry.clone(), bytes));
    }

    report
}

async fn copy_entry(entry: &ManifestEntry, contents_dir: &Path) -> Result<u64, String> {
    let source = entry.source();
    if !source.exists() {
        return Err("non-existing".into());
    }
    let dest = entry
        .destination()
        .map(|rel| contents_dir.join(rel))
        .ok_or_else(|| "source has no file name".to_string())?;

    let result = match (entry.is_directory(), source.is_dir()) {
        (true, true) => fs::copy_dir(source, &dest).await,
        (false, false) => fs::copy_file(source, &dest).await,
        (true, false) => return Err("expected a directory".into()),
        (false, true) => return Err("expected a file".into()),
    };
    result.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn destinations_follow_entry_kind() {
        let plain = ManifestEntry::file("/opt/local/etc/fonts/fonts.conf", "Resources");
        assert_eq!(
            plain.destination(),
            Some(PathBuf::from("Resources/fonts.conf"))
        );

        let renamed = ManifestEntry::RenamedDirectory {
            source: "/home/u/.local/share/lensfun/updates/version_1".into(),
            category: "Resources".into(),
            name: "lensfun".into(),
        };
        assert_eq!(
            renamed.destination(),
            Some(PathBuf::from("Resources/lensfun"))
        );
        assert!(renamed.is_directory());
        assert!(!plain.is_directory());
    }

    #[test]
    fn build_lists_static_entries_in_order() {
        let entries = build(Path::new("/nonexistent/prefix"), &ManifestOptions::default());

        // No glob matches and no optional entries.
        assert_eq!(entries.len(), 11);
        assert_eq!(
            entries[0],
            ManifestEntry::file("/nonexistent/prefix/bin/gtk-query-immodules-3.0", "Resources")
        );
        assert_eq!(
            entries.last().unwrap(),
            &ManifestEntry::file("/nonexistent/prefix/etc/fonts/fonts.conf", "Resources")
        );
    }

    #[test]
    fn build_expands_loader_globs() {
        let temp = TempDir::new().unwrap();
        let prefix = temp.path();
        touch(
            &prefix.join("lib/gdk-pixbuf-2.0/2.10.0/loaders/libpixbufloader-svg.so"),
            "",
        );
        touch(
            &prefix.join("lib/gtk-3.0/3.0.0/immodules/im-quartz.so"),
            "",
        );

        let entries = build(prefix, &ManifestOptions::default());

        assert_eq!(
            entries[0],
            ManifestEntry::file(
                prefix.join("lib/gdk-pixbuf-2.0/2.10.0/loaders/libpixbufloader-svg.so"),
                "Frameworks"
            )
        );
        assert_eq!(
            entries[1],
            ManifestEntry::file(
                prefix.join("lib/gtk-3.0/3.0.0/immodules/im-quartz.so"),
                "Frameworks"
            )
        );
    }

    #[test]
    fn exiftool_requires_flag_and_presence() {
        let temp = TempDir::new().unwrap();
        let exiftool = temp.path().join("bin/exiftool");

        let absent = build(
            temp.path(),
            &ManifestOptions {
                exiftool: Some(exiftool.clone()),
                lensfun_database: None,
            },
        );
        assert!(absent.iter().all(|e| !e.source().starts_with(temp.path().join("bin/exiftool"))));

        touch(&exiftool, "#!/usr/bin/perl");
        let present = build(
            temp.path(),
            &ManifestOptions {
                exiftool: Some(exiftool.clone()),
                lensfun_database: None,
            },
        );
        let tail = &present[present.len() - 2..];
        assert_eq!(
            tail[0].destination(),
            Some(PathBuf::from("Resources/exiftool/exiftool"))
        );
        assert_eq!(tail[1].source(), temp.path().join("bin/lib"));
        assert_eq!(
            tail[1].destination(),
            Some(PathBuf::from("Resources/exiftool/lib"))
        );
    }

    #[tokio::test]
    async fn missing_directory_yields_one_warning_and_no_bytes() {
        let temp = TempDir::new().unwrap();
        let contents = temp.path().join("ART.app/Contents");
        let entries = vec![ManifestEntry::dir(
            temp.path().join("prefix/share/icons/hicolor"),
            "Resources/share/icons",
        )];

        let report = apply(&entries, &contents).await;

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.copied.len(), 1);
        assert_eq!(report.copied[0].1, 0);
        assert_eq!(report.total_bytes(), 0);
        assert!(!contents.join("Resources/share/icons/hicolor").exists());
    }

    #[tokio::test]
    async fn apply_copies_files_and_trees_and_continues_past_failures() {
        let temp = TempDir::new().unwrap();
        let prefix = temp.path().join("prefix");
        touch(&prefix.join("share/dbus-1/session.conf"), "<busconfig/>");
        touch(&prefix.join("etc/gtk-3.0/settings.ini"), "[Settings]");
        touch(&prefix.join("etc/gtk-3.0/gtk.css"), "");
        let contents = temp.path().join("ART.app/Contents");

        let entries = vec![
            ManifestEntry::file(prefix.join("bin/dbus-daemon"), "Resources"),
            ManifestEntry::file(prefix.join("share/dbus-1/session.conf"), "Resources/dbus-1"),
            ManifestEntry::file(prefix.join("etc/gtk-3.0"), "Resources/etc"),
            ManifestEntry::dir(prefix.join("etc/gtk-3.0"), "Resources/etc"),
        ];

        let report = apply(&entries, &contents).await;

        assert_eq!(report.warnings.len(), 2);
        assert!(matches!(
            &report.warnings[1],
            Warning::ResourceCopy { reason, .. } if reason == "expected a file"
        ));
        assert_eq!(
            std::fs::read_to_string(contents.join("Resources/dbus-1/session.conf")).unwrap(),
            "<busconfig/>"
        );
        assert!(contents.join("Resources/etc/gtk-3.0/gtk.css").is_file());
        assert_eq!(report.total_bytes(), 12 + 10);
    }
}
