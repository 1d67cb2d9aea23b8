use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use nom_exif::{EntryValue, Exif, ExifIter, ExifTag, MediaParser, MediaSource};
use std::path::Path;

use crate::exif_reader::parse_exif_date;

// HEIC系コンテナはEXIFブロックの抽出が必要なので、kamadak-exifではなくnom-exifで読む
pub fn read_heic_date(path: &Path) -> Result<DateTime<Local>> {
    let source = MediaSource::file_path(path)
        .with_context(|| format!("EXIF抽出対象を開けませんでした: {}", path.display()))?;
    let mut parser = MediaParser::new();
    let iter: ExifIter = parser
        .parse(source)
        .with_context(|| format!("EXIFブロックを抽出できませんでした: {}", path.display()))?;
    let exif: Exif = iter.into();

    let tags = [
        ExifTag::DateTimeOriginal,
        ExifTag::CreateDate,
        ExifTag::ModifyDate,
    ];
    for tag in tags {
        if let Some(date) = exif.get(tag).and_then(entry_to_local) {
            return Ok(date);
        }
    }

    anyhow::bail!("EXIFに撮影日時がありませんでした: {}", path.display())
}

fn entry_to_local(value: &EntryValue) -> Option<DateTime<Local>> {
    let raw = value.to_string();
    parse_exif_date(raw.trim().trim_matches('"'))
}
