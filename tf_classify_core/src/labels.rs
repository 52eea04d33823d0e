use std::path::Path;

use anyhow::{Context, Result};

/// Class names, line N of the label file naming output class N.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    names: Vec<String>,
}

impl Labels {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read labels {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let names = text.lines().map(|l| l.trim_end().to_string()).collect();
        Labels { names }
    }

    pub fn get(&self, index: usize) -> Result<&str> {
        self.names.get(index).map(String::as_str).with_context(|| {
            format!(
                "label index {} out of range, label file has {} entries",
                index,
                self.names.len()
            )
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
