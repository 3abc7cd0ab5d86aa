//! Crash-safe replacement of a single file inside a capability directory.
//!
//! Content goes to a hidden sibling first and is renamed over the target,
//! so readers observe either the old blob or the new one, never a torn
//! write.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Removes the staged file unless the rename consumed it.
struct StagedFile<'a> {
    dir: &'a Dir,
    name: String,
    committed: bool,
}

impl Drop for StagedFile<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(error) = self.dir.remove_file(&self.name) {
            debug!(file = %self.name, %error, "left staged file behind");
        }
    }
}

/// Replace `file_name` in `dir` with `contents`.
///
/// `file_name` must be a single normal path component.
pub(super) fn replace_file(dir: &Dir, file_name: &Utf8Path, contents: &str) -> io::Result<()> {
    let mut components = file_name.components();
    let (Some(Utf8Component::Normal(target)), None) = (components.next(), components.next())
    else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{file_name} is not a bare file name"),
        ));
    };

    let mut staged = StagedFile {
        dir,
        name: format!(
            ".{target}.{}.{}.staged",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ),
        committed: false,
    };

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(&staged.name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);

    clear_rename_target(dir, target)?;
    dir.rename(&staged.name, dir, target)?;
    staged.committed = true;

    if let Err(error) = dir.open(".").and_then(|handle| handle.sync_all()) {
        debug!(file = %target, %error, "directory sync after rename failed");
    }
    Ok(())
}

// Windows rename refuses to overwrite an existing file.
#[cfg(windows)]
fn clear_rename_target(dir: &Dir, target: &str) -> io::Result<()> {
    match dir.remove_file(target) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

#[cfg(not(windows))]
fn clear_rename_target(_dir: &Dir, _target: &str) -> io::Result<()> {
    Ok(())
}
