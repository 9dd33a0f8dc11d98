//! CSS asset bundling

use anyhow::{Context, Result};
use std::{fs, path::Path};

const BASE: &str = include_str!("../assets/base.css");
const LAYOUT: &str = include_str!("../assets/components/layout.css");

const INDEX_PAGE: &str = include_str!("../assets/page-index.css");
const DOC_PAGE: &str = include_str!("../assets/page-doc.css");
const MARKDOWN: &str = include_str!("../assets/markdown.css");

/// Writes all bundled CSS assets to output directory
pub fn write_css_assets(assets_dir: &Path) -> Result<()> {
    fs::create_dir_all(assets_dir).with_context(|| {
        format!(
            "Failed to create assets directory: {}",
            assets_dir.display()
        )
    })?;

    write_bundled(assets_dir, "index.css", &[BASE, LAYOUT, INDEX_PAGE])?;
    write_bundled(assets_dir, "doc.css", &[BASE, LAYOUT, DOC_PAGE])?;
    write_bundled(assets_dir, "markdown.css", &[MARKDOWN])?;
    Ok(())
}

fn write_bundled(dir: &Path, name: &str, parts: &[&str]) -> Result<()> {
    let css = parts.join("\n");
    fs::write(dir.join(name), css)
        .with_context(|| format!("Failed to write CSS asset: {}", name))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_css_assets() {
        // Arrange
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let assets = dir.path().join("assets");

        // Act
        write_css_assets(&assets).expect("Should write assets");

        // Assert
        for name in ["index.css", "doc.css", "markdown.css"] {
            assert!(assets.join(name).exists(), "{} should exist", name);
        }
        let doc = fs::read_to_string(assets.join("doc.css")).expect("Should read doc.css");
        assert!(doc.contains(".doc-card"));
        assert!(doc.contains(".container"), "Layout bundled into page CSS");
    }
}
