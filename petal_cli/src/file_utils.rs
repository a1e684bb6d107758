use std::path::{Path, PathBuf};

use petal_penalty::penalty::penalty_params::PenaltyParams;

pub fn read_folder(folder_path: &PathBuf) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder_path)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        } else if path.is_dir() {
            files.extend(read_folder(&path)?);
        }
    }

    files.sort();

    Ok(files)
}

/// A single file, or every file below a folder.
pub fn input_files(path: &PathBuf) -> Result<Vec<PathBuf>, std::io::Error> {
    if path.is_file() {
        Ok(vec![path.clone()])
    } else {
        read_folder(path)
    }
}

pub fn load_params<P: AsRef<Path>>(file: P) -> Result<PenaltyParams, anyhow::Error> {
    let content = std::fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}
