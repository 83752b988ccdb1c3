use std::{fs::File, io::Read, path::Path};

use anyhow::{Context, Result};

pub struct FileUtils {}
impl FileUtils {
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        let mut file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Ok(data)
    }

    pub fn load_to_string(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        String::from_utf8(Self::load(path)?).with_context(|| format!("File is not valid UTF-8: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::FileUtils;

    #[test]
    fn should_fail_on_missing_file() {
        let err = FileUtils::load("/definitely/not/here.pem").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.pem"));
    }

    #[test]
    fn should_load_manifest() {
        let content = FileUtils::load_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml")).unwrap();
        assert!(content.contains("fermentation-controller"));
    }
}
