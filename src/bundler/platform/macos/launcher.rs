//! Native launcher shims and their bootstrap scripts.
//!
//! macOS starts `Contents/MacOS/<name>` directly, but the real startup logic
//! lives in a hidden shell script next to it. Each entry point therefore gets
//! a tiny compiled shim that replaces itself (via `execv`) with the bundled
//! shell running `.<name>.sh`, forwarding every argument untouched.

use crate::bundler::{
    builder::command::run_tool,
    error::{ErrorExt, Result},
    settings::{EntryPoint, EntryPointKind},
    utils::fs,
};
use handlebars::Handlebars;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Hidden name of the shell interpreter copied into `Contents/MacOS`.
pub const SHELL_NAME: &str = ".shell";

const LAUNCHER_TEMPLATE: &str = r#"#include <limits.h>
#include <libgen.h>
#include <stdint.h>
#include <stdio.h>
#include <stdlib.h>
#include <string.h>
#include <unistd.h>
#ifdef __APPLE__
#include <mach-o/dyld.h>
#endif

static void self_dir(const char *argv0, char *out, size_t size)
{
    char exe[PATH_MAX];
    char resolved[PATH_MAX];
#ifdef __APPLE__
    uint32_t len = sizeof(exe);
    if (_NSGetExecutablePath(exe, &len) != 0) {
        snprintf(exe, sizeof(exe), "%s", argv0);
    }
#else
    ssize_t n = readlink("/proc/self/exe", exe, sizeof(exe) - 1);
    if (n < 0) {
        snprintf(exe, sizeof(exe), "%s", argv0);
    } else {
        exe[n] = '\0';
    }
#endif
    if (realpath(exe, resolved) == NULL) {
        snprintf(resolved, sizeof(resolved), "%s", exe);
    }
    snprintf(out, size, "%s", dirname(resolved));
}

int main(int argc, char *argv[])
{
    char dir[PATH_MAX];
    char shell[PATH_MAX];
    char script[PATH_MAX];
    char **args;
    int i;

    self_dir(argv[0], dir, sizeof(dir));
    snprintf(shell, sizeof(shell), "%s/{{shell}}", dir);
    snprintf(script, sizeof(script), "%s/{{script}}", dir);

    args = malloc(sizeof(char *) * (argc + 2));
    if (args == NULL) {
        perror("malloc");
        return 1;
    }
    args[0] = shell;
    args[1] = script;
    for (i = 1; i < argc; ++i) {
        args[i + 1] = argv[i];
    }
    args[argc + 1] = NULL;

    execv(shell, args);
    perror(shell);
    return 127;
}
"#;

const GUI_SCRIPT_TEMPLATE: &str = r#"#!/bin/sh
export {{ident}}_restore_GTK_CSD=$GTK_CSD
export {{ident}}_restore_GDK_PIXBUF_MODULE_FILE=$GDK_PIXBUF_MODULE_FILE
export {{ident}}_restore_GDK_PIXBUF_MODULEDIR=$GDK_PIXBUF_MODULEDIR
export {{ident}}_restore_GIO_MODULE_DIR=$GIO_MODULE_DIR
export {{ident}}_restore_DYLD_LIBRARY_PATH=$DYLD_LIBRARY_PATH
export {{ident}}_restore_FONTCONFIG_FILE=$FONTCONFIG_FILE
export {{ident}}_restore_GTK_PATH=$GTK_PATH
export {{ident}}_restore_GTK_IM_MODULE_FILE=$GTK_IM_MODULE_FILE
export {{ident}}_restore_GSETTINGS_SCHEMA_DIR=$GSETTINGS_SCHEMA_DIR
export {{ident}}_restore_XDG_DATA_DIRS=$XDG_DATA_DIRS
export {{ident}}_restore_DBUS_SESSION_BUS_ADDRESS=$DBUS_SESSION_BUS_ADDRESS

d=$(dirname "$0")/..

export DYLD_LIBRARY_PATH="$d/Frameworks"
export GTK_CSD=0
export GDK_PIXBUF_MODULEDIR="$d/Frameworks"
export FONTCONFIG_FILE="$d/Resources/fonts.conf"
export GTK_PATH="$d/Resources/etc/gtk-3.0"
export GSETTINGS_SCHEMA_DIR="$d/Resources/share/glib-2.0/schemas"
export XDG_DATA_DIRS="$d/Resources/share"
export GDK_RENDERING=similar
export {{ident}}_EXIFTOOL_BASE_DIR="$d/Resources/exiftool"

t="${TMPDIR:-/tmp}/{{product}}-$USER"
/bin/mkdir -p "$t"

DBUS_SOCK_FILE="$t/dbus.sock"
export DBUS_SESSION_BUS_ADDRESS="unix:path=$DBUS_SOCK_FILE"
export GDK_PIXBUF_MODULE_FILE="$t/loader.cache"
export GTK_IM_MODULE_FILE="$t/gtk.immodules"

DBUS_PID_FILE="$t/dbus.pid"

DBUS_PID=
stop_dbus() {
    if [ -n "$DBUS_PID" ]; then
        kill "$DBUS_PID" 2>/dev/null
        /bin/rm -f "$DBUS_SOCK_FILE" "$DBUS_PID_FILE"
        DBUS_PID=
    fi
}

dbus_alive() {
    [ -S "$DBUS_SOCK_FILE" ] && [ -f "$DBUS_PID_FILE" ] && kill -0 "$(cat "$DBUS_PID_FILE")" 2>/dev/null
}

if ! dbus_alive; then
    /bin/rm -f "$DBUS_SOCK_FILE" "$DBUS_PID_FILE"
    trap stop_dbus EXIT
    trap 'exit 129' HUP
    trap 'exit 130' INT
    trap 'exit 143' TERM
    DBUS_PID=$("$d/Resources/dbus-daemon" --fork --print-pid --config-file="$d/Resources/dbus-1/session.conf" --address="$DBUS_SESSION_BUS_ADDRESS")
    echo "$DBUS_PID" > "$DBUS_PID_FILE"

    "$d/Resources/gdk-pixbuf-query-loaders" "$d"/Frameworks/libpixbufloader-*.so > "$GDK_PIXBUF_MODULE_FILE"
    "$d/Resources/gtk-query-immodules-3.0" "$d"/Frameworks/im-*.so > "$GTK_IM_MODULE_FILE"
fi

if [ -z "$DBUS_PID" ]; then
    exec "$d/MacOS/{{binary}}" "$@"
fi
"$d/MacOS/{{binary}}" "$@"
exit $?
"#;

const CLI_SCRIPT_TEMPLATE: &str = r#"#!/bin/sh
export {{ident}}_restore_GIO_MODULE_DIR=$GIO_MODULE_DIR
export {{ident}}_restore_DYLD_LIBRARY_PATH=$DYLD_LIBRARY_PATH
d=$(dirname "$0")/..
export DYLD_LIBRARY_PATH="$d/Frameworks"
export {{ident}}_EXIFTOOL_BASE_DIR="$d/Resources/exiftool"
exec "$d/MacOS/{{binary}}" "$@"
"#;

fn render(template: &str, data: &BTreeMap<&str, String>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    Ok(handlebars.render_template(template, data)?)
}

/// Program names end up inside C string literals and shell words.
fn check_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name
            .chars()
            .any(|c| matches!(c, '/' | '"' | '\\' | '$' | '`') || c.is_control())
    {
        crate::bail!("invalid entry point name: {:?}", name);
    }
    Ok(())
}

/// Renders the C source of the shim for `entry`.
pub fn render_launcher_source(entry: &EntryPoint) -> Result<String> {
    check_name(&entry.name)?;
    let mut data = BTreeMap::new();
    data.insert("shell", SHELL_NAME.to_string());
    data.insert("script", entry.script_name());
    render(LAUNCHER_TEMPLATE, &data)
}

/// Renders the bootstrap script for `entry` in an application named `product`.
pub fn render_bootstrap_script(entry: &EntryPoint, product: &str) -> Result<String> {
    check_name(&entry.name)?;
    check_name(product)?;

    let ident: String = product
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    let mut data = BTreeMap::new();
    data.insert("ident", ident);
    data.insert("product", product.to_string());
    data.insert("binary", entry.binary_name());

    let template = match entry.kind {
        EntryPointKind::Gui => GUI_SCRIPT_TEMPLATE,
        EntryPointKind::Cli => CLI_SCRIPT_TEMPLATE,
    };
    render(template, &data)
}

/// Compiles the shim for `entry` into `out_dir`.
///
/// The source is generated in `work_dir`; the executable is written to
/// `out_dir/<name>_launch` and its path returned.
pub async fn synthesize(
    entry: &EntryPoint,
    work_dir: &Path,
    out_dir: &Path,
    cc: &Path,
) -> Result<PathBuf> {
    let source = work_dir.join(format!("{}_launcher.c", entry.name));
    tokio::fs::write(&source, render_launcher_source(entry)?)
        .await
        .fs_context("writing launcher source", &source)?;

    let shim = out_dir.join(entry.shim_name());
    log::info!("building launcher for {}...", entry.name);
    run_tool(
        cc,
        [source.as_os_str(), OsStr::new("-o"), shim.as_os_str()],
        None,
    )
    .await?;

    Ok(shim)
}

/// Writes `.<name>.sh` into `macos_dir`, executable.
pub async fn write_bootstrap_script(
    entry: &EntryPoint,
    product: &str,
    macos_dir: &Path,
) -> Result<PathBuf> {
    let path = macos_dir.join(entry.script_name());
    fs::write_executable(&path, &render_bootstrap_script(entry, product)?).await?;
    Ok(path)
}
