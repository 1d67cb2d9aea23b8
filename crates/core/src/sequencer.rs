use crate::metadata::ResolvedMeta;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use filetime::FileTime;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

// 1回の実行分の採番・集計。呼び出し側が持ち回る。
#[derive(Debug, Default)]
pub struct RunState {
    timestamp_seq: HashMap<String, usize>,
    pub renamed_by_ext: BTreeMap<String, usize>,
    pub unrenamed_by_ext: BTreeMap<String, usize>,
}

impl RunState {
    // 同一秒の衝突ごとに0始まりの連番を払い出す
    pub fn next_sequence(&mut self, formatted: &str) -> usize {
        let count = self.timestamp_seq.entry(formatted.to_string()).or_insert(0);
        let seq = *count;
        *count += 1;
        seq
    }

    pub fn tally_renamed(&mut self, ext_key: &str) {
        *self.renamed_by_ext.entry(ext_key.to_string()).or_insert(0) += 1;
    }

    pub fn tally_unrenamed(&mut self, ext_key: &str) {
        *self
            .unrenamed_by_ext
            .entry(ext_key.to_string())
            .or_insert(0) += 1;
    }
}

pub fn ext_tally_key(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_uppercase()))
        .unwrap_or_default()
}

pub fn rename_with_sidecar(
    state: &mut RunState,
    media_path: &Path,
    meta: &ResolvedMeta,
    dryrun: bool,
) -> Result<PathBuf> {
    let formatted = meta.taken.format(TIMESTAMP_FORMAT).to_string();
    let seq = state.next_sequence(&formatted);
    let new_base = format!("{}-{}", formatted, seq);

    let media_ext = extension_with_dot(media_path);
    let parent = media_path.parent().unwrap_or_else(|| Path::new(""));
    let new_media_path = parent.join(format!("{}{}", new_base, media_ext));

    rename_and_stamp(media_path, &new_media_path, meta.taken, dryrun)?;

    // サイドカーは新しいメディア名全体をミラーする: <新ベース名><メディア拡張子>.json
    if let Some(sidecar_path) = meta.sidecar_path.as_deref() {
        let json_ext = extension_with_dot(sidecar_path);
        let sidecar_parent = sidecar_path.parent().unwrap_or_else(|| Path::new(""));
        let new_sidecar_path =
            sidecar_parent.join(format!("{}{}{}", new_base, media_ext, json_ext));
        rename_and_stamp(sidecar_path, &new_sidecar_path, meta.taken, dryrun)?;
    }

    Ok(new_media_path)
}

fn rename_and_stamp(
    old_path: &Path,
    new_path: &Path,
    taken: DateTime<Local>,
    dryrun: bool,
) -> Result<()> {
    if old_path == new_path {
        return Ok(());
    }

    if dryrun {
        log::info!(
            "リネーム(dryrun): {} -> {}",
            old_path.display(),
            new_path.display()
        );
        return Ok(());
    }

    log::info!("リネーム: {} -> {}", old_path.display(), new_path.display());
    fs::rename(old_path, new_path).with_context(|| {
        format!(
            "リネームに失敗しました: {} -> {}",
            old_path.display(),
            new_path.display()
        )
    })?;

    // リネーム後は更新日時を撮影日時に揃える
    let stamp = FileTime::from_unix_time(taken.timestamp(), 0);
    filetime::set_file_times(new_path, stamp, stamp)
        .with_context(|| format!("更新日時を設定できませんでした: {}", new_path.display()))?;

    Ok(())
}

fn extension_with_dot(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
