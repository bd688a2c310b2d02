//! Common test utilities for bundler integration tests

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A build tree, a GTK prefix and stand-ins for the macOS tools
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Root of the temporary directory
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create an empty workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Create a workspace holding a complete ART build and GTK prefix
    pub fn with_build() -> Self {
        let ws = Self::new();
        ws.write_exec("build/Contents/MacOS/ART", "#!/bin/sh\necho ART\n");
        ws.write_exec("build/Contents/MacOS/ART-cli", "#!/bin/sh\necho ART-cli\n");
        ws.write_file("build/Contents/Resources/options", "[General]\n");
        ws.write_file("build/Contents/Resources/AboutThisBuild.txt", "Version: 1.25.3\n");
        for size in [16, 32, 64, 128, 256, 512, 1024] {
            ws.write_file(
                &format!("build/Contents/Resources/images/ART-logo-{size}.png"),
                "png",
            );
        }

        ws.write_file("prefix/lib/libgtk-3.0.0.dylib", "gtk");
        ws.write_file("prefix/lib/libglib-2.0.0.dylib", "glib");
        ws.write_exec("prefix/bin/dbus-daemon", "#!/bin/sh\n");
        ws.write_file("prefix/share/dbus-1/session.conf", "<busconfig/>");
        ws.write_file("prefix/etc/fonts/fonts.conf", "<fontconfig/>");
        ws.write_file("prefix/lib/gdk-pixbuf-2.0/2.10.0/loaders/libpixbufloader-png.so", "png");

        ws.install_tools();
        ws
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Write an executable file in workspace
    pub fn write_exec(&self, path: &str, content: &str) {
        self.write_file(path, content);
        std::fs::set_permissions(self.path.join(path), std::fs::Permissions::from_mode(0o755))
            .expect("Failed to set permissions");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    fn prefix(&self) -> PathBuf {
        self.path.join("prefix")
    }

    /// Tool stand-ins under `tools/`.
    ///
    /// `otool` reports libgtk and libSystem for the main executable, libglib
    /// for libgtk, and nothing for anything else.
    fn install_tools(&self) {
        let lib = self.prefix().join("lib");
        self.write_exec(
            "tools/otool",
            &format!(
                "#!/bin/sh\n\
                 echo \"$2:\"\n\
                 case \"$2\" in\n\
                 */Contents/MacOS/ART)\n\
                 printf '\\t%s (compatibility version 1.0.0, current version 1.0.0)\\n' \
                 '{lib}/libgtk-3.0.0.dylib' '/usr/lib/libSystem.B.dylib' ;;\n\
                 */libgtk-3.0.0.dylib)\n\
                 printf '\\t%s (compatibility version 1.0.0, current version 1.0.0)\\n' \
                 '@rpath/libglib-2.0.0.dylib' ;;\n\
                 esac\n",
                lib = lib.display()
            ),
        );
        self.write_exec(
            "tools/iconutil",
            "#!/bin/sh\necho icns > \"$(basename \"$3\" .iconset).icns\"\n",
        );
        self.write_exec(
            "tools/cc",
            "#!/bin/sh\nprintf '#!/bin/sh\\necho shim\\n' > \"$3\"\nchmod 755 \"$3\"\n",
        );
        self.write_exec(
            "tools/hdiutil",
            "#!/bin/sh\nfor last; do :; done\necho \"$@\" > \"$last\"\n",
        );
    }

    /// The bundler binary, wired to the tool stand-ins and an empty home
    #[allow(deprecated)]
    pub fn command(&self) -> assert_cmd::Command {
        let tools = self.path.join("tools");
        let mut cmd = assert_cmd::Command::cargo_bin("art_bundler").expect("binary not built");
        cmd.current_dir(&self.path)
            .env("HOME", self.path.join("home"))
            .env("BUNDLER_OTOOL", tools.join("otool"))
            .env("BUNDLER_ICONUTIL", tools.join("iconutil"))
            .env("BUNDLER_CC", tools.join("cc"))
            .env("BUNDLER_HDIUTIL", tools.join("hdiutil"))
            .env_remove("RUST_LOG");
        cmd
    }

    /// Absolute path inside the workspace
    pub fn abs(&self, path: &str) -> PathBuf {
        self.path.join(path)
    }

    /// Absolute path of a file as a string argument
    #[allow(dead_code)]
    pub fn arg(&self, path: &str) -> String {
        path_arg(&self.abs(path))
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}
