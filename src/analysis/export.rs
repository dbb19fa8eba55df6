use std::path::{Path, PathBuf};

use crate::error::AppError;

pub fn export_file_name(symbol: &str) -> String {
    let safe: String = symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("analysis-{}.html", safe)
}

/// Write the rendered HTML fragment to `<dir>/analysis-<symbol>.html`.
pub fn write_html(dir: &Path, symbol: &str, html: &str) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(symbol));
    std::fs::write(&path, html)?;
    Ok(path)
}
