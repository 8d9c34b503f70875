use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use super::error::{Result, ScriptError};

/// Encoding used when the caller does not name one.
pub static DEFAULT_ENCODING: &Encoding = &encoding_rs::UTF_8_INIT;

/// Look up an encoding by its WHATWG label ("utf-8", "latin1", "windows-1252", ...).
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ScriptError::UnknownEncoding(label.to_string()))
}

/// Decode raw script bytes. A byte-order mark, if present, is dropped;
/// malformed input is an error rather than being replaced.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (encoding, bom_length) = Encoding::for_bom(bytes).unwrap_or((encoding, 0));
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_length..])
        .map(|text| text.into_owned())
}

/// A script file read into memory, together with the directory its
/// includes resolve against.
#[derive(Debug)]
pub struct ScriptFile {
    pub path: PathBuf,
    pub base_dir: PathBuf,
    pub text: String,
}

impl ScriptFile {
    /// Read and decode `path`. The file handle is closed before this returns.
    pub fn load(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| ScriptError::SourceIo {
            path: path.to_path_buf(),
            source,
        })?;
        let text = decode(&bytes, encoding).ok_or_else(|| ScriptError::SourceDecode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            base_dir: parent_dir(path),
            text,
        })
    }
}

/// Directory a file's includes resolve against. A bare file name has an
/// empty parent, which is the working directory.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
