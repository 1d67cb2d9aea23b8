use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MetadataSource {
    SidecarJson,
    JpegExif,
    HeicExif,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedMeta {
    pub source: MetadataSource,
    pub taken: DateTime<Local>,
    pub sidecar_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SidecarDoc {
    #[serde(rename = "photoTakenTime")]
    pub photo_taken_time: PhotoTakenTime,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoTakenTime {
    pub timestamp: TimestampValue,
}

// エクスポートは文字列エンコードだが、裸の数値で書かれたものも受け付ける
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TimestampValue {
    Text(String),
    Number(i64),
}

impl TimestampValue {
    pub fn epoch_seconds(&self) -> Option<i64> {
        match self {
            TimestampValue::Text(raw) => raw.trim().parse::<i64>().ok(),
            TimestampValue::Number(value) => Some(*value),
        }
    }
}

pub fn epoch_to_local(epoch: i64) -> Option<DateTime<Local>> {
    let utc = DateTime::from_timestamp(epoch, 0)?;
    Some(utc.with_timezone(&Local))
}
