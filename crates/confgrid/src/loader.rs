use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// Read a configuration file
pub fn load(file_path: &Path) -> Result<String, LoadError> {
    let file_path = file_path.canonicalize()?;
    tracing::info!(path=%file_path.display(), "loading file");

    Ok(std::fs::read_to_string(&file_path)?)
}
