use crate::error::Result;
use crate::template::{render, Variables};
use std::fs;
use std::path::Path;

/// Render the changelog-file entry from its template.
///
/// `${commits}` is the assembled fragment; every other context variable
/// is available too.
pub fn render_entry(template: &str, vars: &Variables, fragment: &str) -> String {
    let mut vars = vars.clone();
    vars.insert("commits".to_string(), fragment.to_string());
    render(template, &vars)
}

/// Prepend an entry to the changelog file, creating it if needed.
/// Existing content is kept byte for byte below the new entry.
pub fn prepend_entry(path: &Path, entry: &str) -> Result<()> {
    let existing = if path.is_file() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut content = entry.trim_end().to_string();
    content.push('\n');
    if !existing.is_empty() {
        content.push('\n');
        content.push_str(&existing);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
