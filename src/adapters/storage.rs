use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".".to_string())
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        tracing::debug!("Reading {}", full_path.display());
        let data = fs::read(full_path)?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::debug!("Writing {} bytes to {}", data.len(), full_path.display());
        fs::write(full_path, data)?;
        Ok(())
    }
}
