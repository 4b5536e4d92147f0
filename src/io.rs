use std::path::{Path, PathBuf};

use crate::result::{bail, Result};

/// Find a path in `out_dir` for `file_name` that does not collide with an
/// existing file.
///
/// The first candidate is the name itself, then `<stem> (<n>)<ext>` for
/// increasing `n`, checked one by one until a free one is found.
pub fn find_unused_path(out_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let (stem, dot_ext) = match file_name.rfind('.') {
        Some(pos) => file_name.split_at(pos),
        None => (file_name, ""),
    };

    let mut output = out_dir.join(file_name);
    if !output.exists() {
        return Ok(output);
    }

    for n in 2u16.. {
        output.set_file_name(format!("{stem} ({n}){dot_ext}"));
        if !output.exists() {
            return Ok(output);
        }
    }

    bail("Code is broken or you have really REALLY too much files with the same name")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_used_when_free() {
        let dir = tempfile::tempdir().unwrap();
        let path = find_unused_path(dir.path(), "clip.mp4").unwrap();
        assert_eq!(path, dir.path().join("clip.mp4"));
    }

    #[test]
    fn collisions_get_a_counter_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("clip (2).mp4"), b"x").unwrap();

        let path = find_unused_path(dir.path(), "clip.mp4").unwrap();
        assert_eq!(path, dir.path().join("clip (3).mp4"));
    }
}
