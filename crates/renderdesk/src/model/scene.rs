//! Scene file naming conventions.
//!
//! Scene paths are recorded from artist workstations, so both `/` and `\`
//! are treated as separators regardless of the host platform.

use std::path::{Component, Path, PathBuf};

/// Lexically normalised scene path: `.` segments and repeated separators are
/// dropped and `..` removes the preceding segment. Symlinks are left alone so
/// the path stays the one artists see. This is the form stored as a job's
/// natural key.
pub fn normalize_scene_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component.as_os_str()),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// File name of a scene path without directory or extension, e.g.
/// `ep01_sc_010_shot_042_comp_v003`.
pub fn comp_name(scene_file: &Path) -> String {
    let text = scene_file.to_string_lossy();
    let file_name = text.rsplit(['/', '\\']).next().unwrap_or_default();
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name[..dot].to_string(),
        _ => file_name.to_string(),
    }
}

/// Shot number encoded as `shot_<digits>_comp` in the scene's file name.
///
/// Returns `None` when the name does not follow the convention.
pub fn shot_number(scene_file: &Path) -> Option<u32> {
    let name = comp_name(scene_file);
    let (_, after_shot) = name.rsplit_once("shot_")?;
    let digits = after_shot.split("_comp").next().unwrap_or_default();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comp_name_strips_directory_and_extension() {
        assert_eq!(
            comp_name(Path::new("/proj/ep01/comp/ep01_shot_042_comp_v003.nk")),
            "ep01_shot_042_comp_v003"
        );
        assert_eq!(
            comp_name(Path::new("Z:\\Projects\\ep01\\ep01_shot_7_comp.nk")),
            "ep01_shot_7_comp"
        );
        assert_eq!(comp_name(Path::new("/tmp/.hidden")), ".hidden");
    }

    #[test]
    fn test_normalize_scene_path() {
        assert_eq!(
            normalize_scene_path(Path::new("/proj/./ep01//sc_010.ma")),
            PathBuf::from("/proj/ep01/sc_010.ma")
        );
        assert_eq!(
            normalize_scene_path(Path::new("/proj/ep02/../ep01/sc_010.ma")),
            PathBuf::from("/proj/ep01/sc_010.ma")
        );
        assert_eq!(
            normalize_scene_path(Path::new("/../proj/sc_010.ma")),
            PathBuf::from("/proj/sc_010.ma")
        );
    }

    #[test]
    fn test_shot_number() {
        assert_eq!(
            shot_number(Path::new("/proj/ep01_shot_042_comp_v003.nk")),
            Some(42)
        );
        assert_eq!(shot_number(Path::new("/proj/shot_7_comp.nk")), Some(7));
        // Without a `_comp` suffix the remainder must be all digits.
        assert_eq!(shot_number(Path::new("/proj/ep01_shot_15.nk")), Some(15));
    }

    #[test]
    fn test_shot_number_absent_for_other_names() {
        assert_eq!(shot_number(Path::new("/proj/lighting_v001.ma")), None);
        assert_eq!(shot_number(Path::new("/proj/ep01_shot_abc_comp.nk")), None);
        assert_eq!(shot_number(Path::new("/proj/ep01_shot__comp.nk")), None);
        assert_eq!(shot_number(Path::new("/proj/042_comp.nk")), None);
    }

    #[test]
    fn test_last_shot_marker_wins() {
        assert_eq!(
            shot_number(Path::new("/proj/shot_1_old_shot_9_comp.nk")),
            Some(9)
        );
    }
}
