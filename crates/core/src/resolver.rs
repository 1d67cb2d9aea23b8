use crate::exif_reader::read_exif_date;
use crate::heic_reader::read_heic_date;
use crate::matcher::sidecar_path_for;
use crate::metadata::{epoch_to_local, MetadataSource, ResolvedMeta, SidecarDoc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("サイドカーが見つかりませんでした: {}", .0.display())]
    SidecarNotFound(PathBuf),
    #[error("サイドカーを解析できませんでした: {}: {reason}", .path.display())]
    SidecarInvalid { path: PathBuf, reason: String },
    #[error("使用可能なメタデータがありませんでした: {}: {reason}", .path.display())]
    Exhausted { path: PathBuf, reason: String },
}

// サイドカー → JPEG系EXIF → HEIC系EXIF の順で試し、最初の成功で打ち切る。
// 途中の失敗は想定内なので呼び出し側へは最後の失敗だけを返す。
pub fn resolve_metadata(media_path: &Path) -> Result<ResolvedMeta, ResolveError> {
    match from_sidecar(media_path) {
        Ok(meta) => return Ok(meta),
        Err(err) => log::debug!("サイドカー解決に失敗: {err}"),
    }

    match read_exif_date(media_path) {
        Ok(taken) => {
            return Ok(ResolvedMeta {
                source: MetadataSource::JpegExif,
                taken,
                sidecar_path: None,
            })
        }
        Err(err) => log::debug!("JPEG系EXIF解決に失敗: {err}"),
    }

    match read_heic_date(media_path) {
        Ok(taken) => Ok(ResolvedMeta {
            source: MetadataSource::HeicExif,
            taken,
            sidecar_path: None,
        }),
        Err(err) => Err(ResolveError::Exhausted {
            path: media_path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

fn from_sidecar(media_path: &Path) -> Result<ResolvedMeta, ResolveError> {
    let sidecar_path = sidecar_path_for(media_path)
        .ok_or_else(|| ResolveError::SidecarNotFound(media_path.to_path_buf()))?;

    let raw = fs::read(&sidecar_path).map_err(|err| invalid(&sidecar_path, err.to_string()))?;
    let doc: SidecarDoc =
        serde_json::from_slice(&raw).map_err(|err| invalid(&sidecar_path, err.to_string()))?;

    let epoch = doc
        .photo_taken_time
        .timestamp
        .epoch_seconds()
        .ok_or_else(|| invalid(&sidecar_path, "timestampが整数ではありません".to_string()))?;
    let taken = epoch_to_local(epoch)
        .ok_or_else(|| invalid(&sidecar_path, "timestampが範囲外です".to_string()))?;

    Ok(ResolvedMeta {
        source: MetadataSource::SidecarJson,
        taken,
        sidecar_path: Some(sidecar_path),
    })
}

fn invalid(path: &Path, reason: String) -> ResolveError {
    ResolveError::SidecarInvalid {
        path: path.to_path_buf(),
        reason,
    }
}
