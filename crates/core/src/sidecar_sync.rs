use crate::matcher::{is_json, split_sidecar_name};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

// iPhoneのライブフォト(HEIC+MP4)はMP4側のサイドカーが無いことがあるので、
// HEIC側のサイドカーを複製して両方とも解決できるようにする
const LIVE_PHOTO_STILL_EXT: &str = ".HEIC";
const LIVE_PHOTO_VIDEO_EXT: &str = ".MP4";

pub fn sync_live_photo_sidecars(entries: &[PathBuf], dryrun: bool) -> Result<usize> {
    let mut copied = 0usize;

    for path in entries {
        if !is_json(path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|v| v.to_str()) else {
            continue;
        };
        let Some(split) = split_sidecar_name(name) else {
            continue;
        };
        if !split
            .media_extension
            .eq_ignore_ascii_case(LIVE_PHOTO_STILL_EXT)
        {
            continue;
        }

        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        let suffix = split.duplicate_suffix();
        let twin_media = parent.join(format!(
            "{}{}{}",
            split.stem, suffix, LIVE_PHOTO_VIDEO_EXT
        ));
        if !twin_media.exists() {
            continue;
        }

        let twin_sidecar = parent.join(format!(
            "{}{}{}{}",
            split.stem, LIVE_PHOTO_VIDEO_EXT, suffix, split.json_extension
        ));
        if twin_sidecar.exists() {
            continue;
        }

        if dryrun {
            log::info!("サイドカー複製(dryrun): {}", twin_sidecar.display());
        } else {
            copy_sidecar(path, &twin_sidecar)?;
            log::info!("サイドカー複製: {}", twin_sidecar.display());
        }
        copied += 1;
    }

    Ok(copied)
}

// 複製失敗は実行全体を中断する致命エラー扱い
fn copy_sidecar(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).with_context(|| {
        format!(
            "サイドカーを複製できませんでした: {} -> {}",
            src.display(),
            dst.display()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::sync_live_photo_sidecars;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn listing(dir: &std::path::Path) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = fs::read_dir(dir)
            .expect("read dir")
            .flatten()
            .map(|entry| entry.path())
            .collect();
        out.sort();
        out
    }

    #[test]
    fn copies_sidecar_to_video_twin() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_0001.HEIC"), b"still").expect("write still");
        fs::write(temp.path().join("IMG_0001.MP4"), b"video").expect("write video");
        let body = br#"{"photoTakenTime":{"timestamp":"1619862000"}}"#;
        fs::write(temp.path().join("IMG_0001.HEIC.json"), body).expect("write sidecar");

        let copied =
            sync_live_photo_sidecars(&listing(temp.path()), false).expect("sync should succeed");
        assert_eq!(copied, 1);

        let twin = temp.path().join("IMG_0001.MP4.json");
        let twin_body = fs::read(&twin).expect("twin sidecar should exist");
        assert_eq!(twin_body, body);
    }

    #[test]
    fn keeps_duplicate_index_after_video_extension() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_0001(2).HEIC"), b"still").expect("write still");
        fs::write(temp.path().join("IMG_0001(2).MP4"), b"video").expect("write video");
        fs::write(temp.path().join("IMG_0001.HEIC(2).json"), b"{}").expect("write sidecar");

        let copied =
            sync_live_photo_sidecars(&listing(temp.path()), false).expect("sync should succeed");
        assert_eq!(copied, 1);
        assert!(temp.path().join("IMG_0001.MP4(2).json").exists());
    }

    #[test]
    fn skips_when_twin_sidecar_already_exists() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_0001.HEIC"), b"still").expect("write still");
        fs::write(temp.path().join("IMG_0001.MP4"), b"video").expect("write video");
        fs::write(temp.path().join("IMG_0001.HEIC.json"), b"{}").expect("write sidecar");
        fs::write(temp.path().join("IMG_0001.MP4.json"), b"already here").expect("write twin");

        let copied =
            sync_live_photo_sidecars(&listing(temp.path()), false).expect("sync should succeed");
        assert_eq!(copied, 0);
        let twin_body = fs::read(temp.path().join("IMG_0001.MP4.json")).expect("read twin");
        assert_eq!(twin_body, b"already here");
    }

    #[test]
    fn skips_when_video_twin_is_absent() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_0001.HEIC"), b"still").expect("write still");
        fs::write(temp.path().join("IMG_0001.HEIC.json"), b"{}").expect("write sidecar");

        let copied =
            sync_live_photo_sidecars(&listing(temp.path()), false).expect("sync should succeed");
        assert_eq!(copied, 0);
        assert!(!temp.path().join("IMG_0001.MP4.json").exists());
    }

    #[test]
    fn skips_non_heic_sidecars() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_0001.JPG"), b"still").expect("write still");
        fs::write(temp.path().join("IMG_0001.MP4"), b"video").expect("write video");
        fs::write(temp.path().join("IMG_0001.JPG.json"), b"{}").expect("write sidecar");

        let copied =
            sync_live_photo_sidecars(&listing(temp.path()), false).expect("sync should succeed");
        assert_eq!(copied, 0);
        assert!(!temp.path().join("IMG_0001.MP4.json").exists());
    }

    #[test]
    fn dryrun_counts_without_copying() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_0001.HEIC"), b"still").expect("write still");
        fs::write(temp.path().join("IMG_0001.MP4"), b"video").expect("write video");
        fs::write(temp.path().join("IMG_0001.HEIC.json"), b"{}").expect("write sidecar");

        let copied =
            sync_live_photo_sidecars(&listing(temp.path()), true).expect("sync should succeed");
        assert_eq!(copied, 1);
        assert!(!temp.path().join("IMG_0001.MP4.json").exists());
    }
}
