//! Private utility module

use crate::error::{NrrdError, Result};
use std::path::{Path, PathBuf};

/// Evaluate an expression with `$t` bound to the primitive type of the
/// given `NrrdType`. Block volumes take the separate branch.
macro_rules! with_element_type {
    ($datatype:expr, $t:ident => $body:expr, Block => $block:expr) => {
        match $datatype {
            $crate::typedef::NrrdType::Int8 => {
                type $t = i8;
                $body
            }
            $crate::typedef::NrrdType::Uint8 => {
                type $t = u8;
                $body
            }
            $crate::typedef::NrrdType::Int16 => {
                type $t = i16;
                $body
            }
            $crate::typedef::NrrdType::Uint16 => {
                type $t = u16;
                $body
            }
            $crate::typedef::NrrdType::Int32 => {
                type $t = i32;
                $body
            }
            $crate::typedef::NrrdType::Uint32 => {
                type $t = u32;
                $body
            }
            $crate::typedef::NrrdType::Int64 => {
                type $t = i64;
                $body
            }
            $crate::typedef::NrrdType::Uint64 => {
                type $t = u64;
                $body
            }
            $crate::typedef::NrrdType::Float => {
                type $t = f32;
                $body
            }
            $crate::typedef::NrrdType::Double => {
                type $t = f64;
                $body
            }
            $crate::typedef::NrrdType::Block => $block,
        }
    };
}

/// Whether the path names a detached header file (`.nhdr`).
pub fn is_detached_header_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map(|ext| ext == "nhdr")
        .unwrap_or(false)
}

/// Whether the path names an attached NRRD file (`.nrrd`).
pub fn is_nrrd_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map(|ext| ext == "nrrd")
        .unwrap_or(false)
}

/// Resolve the `data file` of a detached header. Relative paths are taken
/// relative to the directory holding the header file.
///
/// # Errors
///
/// - `NrrdError::MissingHeaderPath` if the data file is relative and the
///   header did not come from a file.
pub fn resolve_data_file(data_file: &str, header_path: Option<&Path>) -> Result<PathBuf> {
    let data_file = Path::new(data_file);
    if data_file.is_absolute() {
        return Ok(data_file.to_path_buf());
    }
    let header_path = header_path.ok_or(NrrdError::MissingHeaderPath)?;
    Ok(match header_path.parent() {
        Some(dir) => dir.join(data_file),
        None => data_file.to_path_buf(),
    })
}

/// Turn a possibly relative path into an absolute one, without touching
/// the file system beyond querying the working directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_paths() {
        assert!(is_detached_header_path("a/b.nhdr"));
        assert!(!is_detached_header_path("a/b.nrrd"));
        assert!(is_nrrd_path("b.nrrd"));
        assert!(!is_nrrd_path("b.nrrd.gz"));
    }

    #[test]
    fn data_file_resolution() {
        assert_eq!(
            resolve_data_file("data.raw", Some(Path::new("dir/volume.nhdr"))).unwrap(),
            Path::new("dir/data.raw")
        );
        assert_eq!(
            resolve_data_file("data.raw", Some(Path::new("volume.nhdr"))).unwrap(),
            Path::new("data.raw")
        );
        assert!(matches!(
            resolve_data_file("data.raw", None),
            Err(NrrdError::MissingHeaderPath)
        ));
        let abs = absolute_path(Path::new("x.raw")).unwrap();
        assert!(abs.is_absolute());
        assert_eq!(resolve_data_file(abs.to_str().unwrap(), None).unwrap(), abs);
    }
}
