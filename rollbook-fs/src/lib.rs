//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Roster files and store databases are addressed by UTF-8 paths throughout
//! the workspace; these helpers centralise the capability-based plumbing for
//! opening them.
#![forbid(unsafe_code)]

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open the file at a UTF-8 path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create (or truncate) the file at a UTF-8 path for writing.
///
/// The parent directory is created first, so exports can target paths that
/// do not exist yet.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, file_name) = open_dir_and_file(path)?;
    dir.create(file_name)
}

/// Split a path into an ambient handle on its directory and the bare file
/// name.
///
/// A missing or empty parent resolves to the current directory, so bare file
/// names work unchanged.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path has no file name component"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name.to_owned()))
}

/// Create every missing directory leading up to `path`.
///
/// Does nothing when the path sits directly in the current or root directory.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() && parent != Utf8Path::new("/") => parent,
        _ => return Ok(()),
    };
    let (base_dir, relative) = base_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(relative)
}

/// Resolve a directory path to an ambient base handle plus the suffix to
/// create beneath it.
///
/// Absolute paths anchor at the filesystem root (or the drive prefix on
/// Windows); relative paths anchor at the current directory.
pub fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let separator = std::path::MAIN_SEPARATOR.to_string();
    let (base, relative) = match parent.components().next() {
        // Drive or UNC prefix on Windows.
        Some(Utf8Component::Prefix(prefix)) => {
            let base = Utf8PathBuf::from(prefix.as_str()).join(&separator);
            let relative = parent
                .strip_prefix(&base)
                .or_else(|_| parent.strip_prefix(prefix.as_str()))
                .map_err(|_| io::Error::other("prefixed path does not start with its prefix"))?;
            (base, relative.to_path_buf())
        }
        Some(Utf8Component::RootDir) => {
            let base = Utf8PathBuf::from(separator);
            let relative = parent
                .strip_prefix(&base)
                .map_err(|_| io::Error::other("absolute path does not start with the root"))?;
            (base, relative.to_path_buf())
        }
        _ => (Utf8PathBuf::from("."), parent.to_path_buf()),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((dir, relative))
}
