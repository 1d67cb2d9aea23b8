use std::path::{Path, PathBuf};

// エクスポートツールはサイドカー名の元部分を46文字で切り詰めることがある
const SIDECAR_TRUNCATION_LIMITS: &[usize] = &[46, 255];
const SIDECAR_EXT: &str = ".json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaName {
    pub stem: String,
    pub duplicate_index: Option<u32>,
    pub extension: String,
}

impl MediaName {
    pub fn duplicate_suffix(&self) -> String {
        duplicate_suffix(self.duplicate_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarName {
    pub stem: String,
    pub media_extension: String,
    pub duplicate_index: Option<u32>,
    pub json_extension: String,
}

impl SidecarName {
    pub fn duplicate_suffix(&self) -> String {
        duplicate_suffix(self.duplicate_index)
    }
}

pub fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

pub fn split_media_name(name: &str) -> Option<MediaName> {
    let (rest, extension) = split_extension(name)?;
    let (stem, duplicate_index) = split_duplicate_suffix(rest);
    if stem.is_empty() {
        return None;
    }

    Some(MediaName {
        stem: stem.to_string(),
        duplicate_index,
        extension: extension.to_string(),
    })
}

pub fn split_sidecar_name(name: &str) -> Option<SidecarName> {
    let (rest, json_extension) = split_extension(name)?;
    if !json_extension.eq_ignore_ascii_case(SIDECAR_EXT) {
        return None;
    }

    let (rest, duplicate_index) = split_duplicate_suffix(rest);
    let (stem, media_extension) = split_extension(rest)?;
    if stem.is_empty() {
        return None;
    }

    Some(SidecarName {
        stem: stem.to_string(),
        media_extension: media_extension.to_string(),
        duplicate_index,
        json_extension: json_extension.to_string(),
    })
}

pub fn sidecar_path_for(media_path: &Path) -> Option<PathBuf> {
    if is_json(media_path) {
        return Some(media_path.to_path_buf());
    }

    let name = media_path.file_name()?.to_str()?;
    let split = split_media_name(name)?;
    let parent = media_path.parent().unwrap_or_else(|| Path::new(""));

    // 複製番号は元の拡張子の後ろに入る: IMG_0001(2).HEIC -> IMG_0001.HEIC(2).json
    for limit in SIDECAR_TRUNCATION_LIMITS {
        let candidate_name = format!(
            "{}{}{}{}",
            truncate_chars(&split.stem, *limit),
            split.extension,
            split.duplicate_suffix(),
            SIDECAR_EXT
        );
        let candidate = parent.join(candidate_name);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}

fn duplicate_suffix(index: Option<u32>) -> String {
    index.map(|n| format!("({})", n)).unwrap_or_default()
}

fn split_extension(name: &str) -> Option<(&str, &str)> {
    let dot = name.rfind('.')?;
    let (before, extension) = name.split_at(dot);
    if before.is_empty() || extension.len() < 2 {
        return None;
    }
    if !extension[1..]
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    Some((before, extension))
}

fn split_duplicate_suffix(input: &str) -> (&str, Option<u32>) {
    let Some(rest) = input.strip_suffix(')') else {
        return (input, None);
    };
    let Some(open) = rest.rfind('(') else {
        return (input, None);
    };
    let digits = &rest[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (input, None);
    }

    match digits.parse::<u32>() {
        Ok(index) => (&input[..open], Some(index)),
        Err(_) => (input, None),
    }
}

fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_json, sidecar_path_for, split_media_name, split_sidecar_name};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn split_media_name_extracts_duplicate_index() {
        let split = split_media_name("IMG_0001(2).HEIC").expect("should split");
        assert_eq!(split.stem, "IMG_0001");
        assert_eq!(split.duplicate_index, Some(2));
        assert_eq!(split.extension, ".HEIC");
        assert_eq!(split.duplicate_suffix(), "(2)");
    }

    #[test]
    fn split_media_name_without_duplicate_index() {
        let split = split_media_name("IMG_0001.jpg").expect("should split");
        assert_eq!(split.stem, "IMG_0001");
        assert_eq!(split.duplicate_index, None);
        assert_eq!(split.extension, ".jpg");
    }

    #[test]
    fn split_media_name_rejects_extensionless_names() {
        assert!(split_media_name("IMG_0001").is_none());
        assert!(split_media_name(".hidden").is_none());
    }

    #[test]
    fn split_sidecar_name_keeps_media_extension_and_index() {
        let split = split_sidecar_name("IMG_0001.HEIC(3).json").expect("should split");
        assert_eq!(split.stem, "IMG_0001");
        assert_eq!(split.media_extension, ".HEIC");
        assert_eq!(split.duplicate_index, Some(3));
        assert_eq!(split.json_extension, ".json");
    }

    #[test]
    fn split_sidecar_name_requires_media_extension() {
        assert!(split_sidecar_name("metadata.json").is_none());
        assert!(split_sidecar_name("IMG_0001.HEIC").is_none());
    }

    #[test]
    fn is_json_ignores_case() {
        assert!(is_json(Path::new("IMG_0001.HEIC.JSON")));
        assert!(is_json(Path::new("IMG_0001.HEIC.json")));
        assert!(!is_json(Path::new("IMG_0001.HEIC")));
    }

    #[test]
    fn json_path_is_returned_unchanged() {
        let path = Path::new("/tmp/IMG_0001.HEIC.json");
        assert_eq!(sidecar_path_for(path).as_deref(), Some(path));
    }

    #[test]
    fn finds_sidecar_with_duplicate_index_after_extension() {
        let temp = tempdir().expect("tempdir");
        let media = temp.path().join("IMG_0001(2).HEIC");
        let sidecar = temp.path().join("IMG_0001.HEIC(2).json");
        fs::write(&sidecar, b"{}").expect("write sidecar");

        assert_eq!(sidecar_path_for(&media).as_deref(), Some(sidecar.as_path()));
    }

    #[test]
    fn finds_sidecar_truncated_at_first_threshold() {
        let temp = tempdir().expect("tempdir");
        let stem = "a".repeat(60);
        let media = temp.path().join(format!("{}.jpg", stem));
        let truncated: String = stem.chars().take(46).collect();
        let sidecar = temp.path().join(format!("{}.jpg.json", truncated));
        fs::write(&sidecar, b"{}").expect("write sidecar");

        assert_eq!(sidecar_path_for(&media).as_deref(), Some(sidecar.as_path()));
    }

    #[test]
    fn retries_second_threshold_when_truncated_candidate_is_missing() {
        let temp = tempdir().expect("tempdir");
        let stem = "b".repeat(60);
        let media = temp.path().join(format!("{}.jpg", stem));
        let sidecar = temp.path().join(format!("{}.jpg.json", stem));
        fs::write(&sidecar, b"{}").expect("write sidecar");

        assert_eq!(sidecar_path_for(&media).as_deref(), Some(sidecar.as_path()));
    }

    #[test]
    fn reports_not_found_when_no_candidate_exists() {
        let temp = tempdir().expect("tempdir");
        let media = temp.path().join("IMG_0001.HEIC");
        assert!(sidecar_path_for(&media).is_none());
    }
}
