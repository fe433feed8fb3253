use std::path::Path;

use crate::GenerateError;

/// Removes and recreates the output root.
///
/// A symbolic link is never followed: deleting through it would wipe the link target.
pub fn prepare_output_root(root: &Path) -> Result<(), GenerateError> {
    match std::fs::symlink_metadata(root) {
        Ok(meta) if meta.file_type().is_symlink() => {
            return Err(GenerateError::OutputPathIsSymlink(root.to_path_buf()));
        }
        Ok(meta) if meta.is_dir() => {
            log::debug!("Removing previous output {}", root.display());
            std::fs::remove_dir_all(root).map_err(|err| GenerateError::io(root, err))?;
        }
        Ok(_) => {
            std::fs::remove_file(root).map_err(|err| GenerateError::io(root, err))?;
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(GenerateError::io(root, err)),
    }

    std::fs::create_dir_all(root).map_err(|err| GenerateError::io(root, err))
}

/// Creates the directory and its parents when missing.
pub fn ensure_dir(dir: &Path) -> Result<(), GenerateError> {
    std::fs::create_dir_all(dir).map_err(|err| GenerateError::io(dir, err))
}

/// Replaces the file at `path` with `content`.
///
/// Any previous file is removed first so the result never mixes old and new content.
pub fn write_file(path: &Path, content: &str) -> Result<(), GenerateError> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(GenerateError::io(path, err)),
    }

    log::debug!("Writing {}", path.display());
    std::fs::write(path, content).map_err(|err| GenerateError::io(path, err))
}
