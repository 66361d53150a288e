//! Writing output files via a temporary file next to them, so that
//! readers never see a half-written file.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use cj_path_util::unix::polyfill::add_extension;

/// Calls `write` with the path `<path>.tmp`, then renames that file to
/// `path`. If either step fails, the temporary file is removed.
pub fn write_via_tmp_file(path: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    let path_tmp =
        add_extension(path, "tmp").ok_or_else(|| anyhow!("path misses a file name: {path:?}"))?;
    let result = write(&path_tmp).and_then(|()| {
        std::fs::rename(&path_tmp, path)
            .with_context(|| anyhow!("renaming {path_tmp:?} to {path:?}"))
    });
    if result.is_err() {
        // Might not even have been created
        let _ = std::fs::remove_file(&path_tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn test_dir(name: &str) -> Result<PathBuf> {
        let dir = std::env::temp_dir().join(format!(
            "scalability-analyzer-tmp-file-{}-{name}",
            std::process::id()
        ));
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    #[test]
    fn t_renamed_into_place() -> Result<()> {
        let dir = test_dir("ok")?;
        let path = dir.join("out.txt");
        write_via_tmp_file(&path, |tmp| Ok(std::fs::write(tmp, "hi")?))?;
        assert_eq!(std::fs::read_to_string(&path)?, "hi");
        assert!(!dir.join("out.txt.tmp").exists());
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn t_removed_on_failed_write() -> Result<()> {
        let dir = test_dir("write-fails")?;
        let path = dir.join("out.txt");
        let r = write_via_tmp_file(&path, |tmp| {
            std::fs::write(tmp, "partial")?;
            Err(anyhow!("out of ink"))
        });
        assert!(r.is_err());
        assert!(!dir.join("out.txt.tmp").exists());
        assert!(!path.exists());
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn t_removed_on_failed_rename() -> Result<()> {
        let dir = test_dir("rename-fails")?;
        // A non-empty directory in the way can't be replaced by a file
        let path = dir.join("out.txt");
        std::fs::create_dir_all(path.join("occupied"))?;
        let r = write_via_tmp_file(&path, |tmp| Ok(std::fs::write(tmp, "done")?));
        assert!(r.is_err());
        assert!(!dir.join("out.txt.tmp").exists());
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
