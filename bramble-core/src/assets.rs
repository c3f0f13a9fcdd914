use std::fs;
use std::io;
use std::path::Path;

use log::info;

/// Asset subtrees mirrored verbatim into the build output.
pub const STATIC_SUBTREES: [&str; 3] = ["images", "js", "shaders"];

/// Copy the static subtrees from the assets root into the build root,
/// byte for byte. A subtree the site does not have is skipped; any other
/// failure propagates.
pub fn copy_static(assets_dir: &Path, build_dir: &Path) -> io::Result<()> {
    for subtree in STATIC_SUBTREES {
        let src = assets_dir.join(subtree);
        if !src.is_dir() {
            info!("no {}/ under {}, skipping", subtree, assets_dir.display());
            continue;
        }
        copy_tree(&src, &build_dir.join(subtree))?;
    }
    Ok(())
}

fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_subtrees_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("assets");
        let build = dir.path().join("build");
        fs::create_dir_all(assets.join("images/icons")).unwrap();
        fs::write(assets.join("images/logo.png"), [137, 80, 78, 71]).unwrap();
        fs::write(assets.join("images/icons/dot.png"), [1, 2, 3]).unwrap();

        copy_static(&assets, &build).unwrap();

        assert_eq!(
            fs::read(build.join("images/logo.png")).unwrap(),
            [137, 80, 78, 71]
        );
        assert_eq!(
            fs::read(build.join("images/icons/dot.png")).unwrap(),
            [1, 2, 3]
        );
    }

    #[test]
    fn missing_subtrees_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("assets");
        let build = dir.path().join("build");
        fs::create_dir_all(assets.join("js")).unwrap();
        fs::write(assets.join("js/app.js"), "console.log(1)").unwrap();

        copy_static(&assets, &build).unwrap();

        assert!(build.join("js/app.js").is_file());
        assert!(!build.join("images").exists());
        assert!(!build.join("shaders").exists());
    }
}
