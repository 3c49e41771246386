//! Local layout document files.
//!
//! # Responsibility
//! - Save the current layout to a JSON file and load it back.
//! - Emit `layout_save` / `layout_load` events with duration and status.
//!
//! # Invariants
//! - Saves write a uniquely named temp file in the target directory and
//!   persist it over the target; a crash never leaves a half-written layout.
//! - A failed load leaves the model unchanged.

use crate::grid::error::LayoutError;
use crate::grid::grid_model::GridModel;
use crate::serialization::layout_document::{export_layout_json, import_layout_json};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug)]
pub enum PersistError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Layout(LayoutError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "layout file `{}` I/O failed: {source}", path.display())
            }
            Self::Layout(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Layout(err) => Some(err),
        }
    }
}

impl From<LayoutError> for PersistError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

/// Writes the model's layout document to `path`.
pub fn save_layout_file(path: impl AsRef<Path>, model: &GridModel) -> PersistResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();

    let result = export_layout_json(model)
        .map_err(PersistError::from)
        .and_then(|text| write_atomically(path, text.as_bytes()));
    match &result {
        Ok(()) => info!(
            "event=layout_save module=persist status=ok duration_ms={} units={} path={}",
            started_at.elapsed().as_millis(),
            model.len(),
            path.display()
        ),
        Err(err) => error!(
            "event=layout_save module=persist status=error duration_ms={} path={} error={}",
            started_at.elapsed().as_millis(),
            path.display(),
            err
        ),
    }
    result
}

/// Reads a layout document from `path` and imports it into `model`.
pub fn load_layout_file(path: impl AsRef<Path>, model: &mut GridModel) -> PersistResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();

    let result = std::fs::read_to_string(path)
        .map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|text| import_layout_json(model, &text).map_err(PersistError::from));
    match &result {
        Ok(()) => info!(
            "event=layout_load module=persist status=ok duration_ms={} units={} path={}",
            started_at.elapsed().as_millis(),
            model.len(),
            path.display()
        ),
        Err(err) => error!(
            "event=layout_load module=persist status=error duration_ms={} path={} error={}",
            started_at.elapsed().as_millis(),
            path.display(),
            err
        ),
    }
    result
}

fn write_atomically(path: &Path, bytes: &[u8]) -> PersistResult<()> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = target_dir(path);
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(bytes).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    // Dropping the handle on failure removes the temp file.
    temp.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}

fn target_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::target_dir;
    use std::path::Path;

    #[test]
    fn temp_file_dir_is_target_parent() {
        assert_eq!(
            target_dir(Path::new("/data/layouts/site.json")),
            Path::new("/data/layouts")
        );
        assert_eq!(target_dir(Path::new("site.json")), Path::new("."));
    }
}
