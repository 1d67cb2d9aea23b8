use crate::matcher::is_json;
use crate::resolver::resolve_metadata;
use crate::sequencer::{ext_tally_key, rename_with_sidecar, RunState};
use crate::sidecar_sync::sync_live_photo_sidecars;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: PathBuf,
    pub dryrun: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub sidecar_copies: usize,
    pub renamed_by_ext: BTreeMap<String, usize>,
    pub unrenamed_by_ext: BTreeMap<String, usize>,
}

pub fn run(options: &RunOptions) -> Result<RunReport> {
    if options.target.as_os_str().is_empty() {
        anyhow::bail!("対象フォルダが指定されていません");
    }
    if options.dryrun {
        log::info!("dryrunモード");
    } else {
        log::info!("リネームモード");
    }

    let entries = list_file_entries(&options.target)?;
    let sidecar_copies = sync_live_photo_sidecars(&entries, options.dryrun)?;

    let mut state = RunState::default();
    let entries = list_file_entries(&options.target)?;
    for path in &entries {
        if is_json(path) {
            continue;
        }

        let ext_key = ext_tally_key(path);
        let meta = match resolve_metadata(path) {
            Ok(meta) => meta,
            Err(err) => {
                log::warn!("{err}");
                state.tally_unrenamed(&ext_key);
                continue;
            }
        };

        if let Err(err) = rename_with_sidecar(&mut state, path, &meta, options.dryrun) {
            log::warn!("{err:#}");
            state.tally_unrenamed(&ext_key);
            continue;
        }
        state.tally_renamed(&ext_key);
    }

    Ok(RunReport {
        sidecar_copies,
        renamed_by_ext: state.renamed_by_ext,
        unrenamed_by_ext: state.unrenamed_by_ext,
    })
}

// 平坦な1階層のみ対象。連番の割り当てを安定させるため名前順に並べる。
fn list_file_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("フォルダを読めませんでした: {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("エントリ読み取り失敗: {}", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        out.push(path);
    }
    out.sort();
    Ok(out)
}
