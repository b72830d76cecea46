use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;

use crate::error::ExportError;

/// A rendered CSV document and the name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
}

/// `Progress_Journal_<pin>_<YYYY-MM-DD>.csv`, with path separators in the PIN
/// replaced so the name stays a single path component.
pub fn export_filename(pin: &str, date: NaiveDate) -> String {
    let safe_pin: String = pin
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("Progress_Journal_{}_{}.csv", safe_pin, date.format("%Y-%m-%d"))
}

/// Writes the export into `directory` without overwriting anything: an
/// existing name gets `_2`, `_3`, ... appended before the extension.
pub fn write_export(export: &CsvExport, directory: &Path) -> Result<PathBuf, ExportError> {
    if !directory.exists() {
        std::fs::create_dir_all(directory).map_err(|e| ExportError::CreateDirectory {
            path: directory.to_path_buf(),
            source: e,
        })?;
    }

    let (base, ext) = match export.filename.rfind('.') {
        Some(dot) => (&export.filename[..dot], Some(&export.filename[dot..])),
        None => (export.filename.as_str(), None),
    };

    for counter in 1..=1000 {
        let candidate = if counter == 1 {
            export.filename.clone()
        } else {
            match ext {
                Some(ext) => format!("{}_{}{}", base, counter, ext),
                None => format!("{}_{}", base, counter),
            }
        };
        let path = directory.join(&candidate);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                file.write_all(export.contents.as_bytes())
                    .map_err(|e| ExportError::WriteFile {
                        path: path.clone(),
                        source: e,
                    })?;
                info!("Exported history to {:?}", path);
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(ExportError::WriteFile { path, source: e }),
        }
    }

    Err(ExportError::FileExists(directory.join(&export.filename)))
}
