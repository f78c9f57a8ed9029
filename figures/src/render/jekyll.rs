//! Jekyll page whose front matter points at a data file of the same name.
//!
//! The records themselves are published separately (as `_data/<name>.json`);
//! the page only carries the reference.

use std::io::Write;
use std::path::Path;

use crate::error::RenderResult;

/// Data file name for an output path: its stem.
pub fn data_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn front_matter(name: &str) -> String {
    format!("---\ndata: {}\n---\n\n", name)
}

pub fn write_front_matter<W: Write>(name: &str, mut writer: W) -> RenderResult<()> {
    writer.write_all(front_matter(name).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_matter() {
        assert_eq!(front_matter("Auckland"), "---\ndata: Auckland\n---\n\n");
    }

    #[test]
    fn test_data_name() {
        assert_eq!(data_name(Path::new("output/Auckland.md")), "Auckland");
        assert_eq!(data_name(Path::new("New Zealand")), "New Zealand");
    }
}
