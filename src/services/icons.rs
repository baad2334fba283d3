//! Icon resolution and the icon theme index.
//!
//! Resolution tries, in order: an absolute path, a file next to the
//! descriptor, a cleaned relative sub-path, and finally the index built from
//! the icon theme directories. The index is built lazily, exactly once per
//! resolver, and never refreshed.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use log::debug;
use once_cell::sync::OnceCell;
use walkdir::WalkDir;

use crate::platform::XdgDirs;

/// Extensions tried (in order) for identifiers without one.
pub const ICON_EXTENSIONS: [&str; 3] = ["png", "svg", "xpm"];

/// Fallback pixmap directory present on most distributions.
const SYSTEM_PIXMAPS: &str = "/usr/share/pixmaps";

/// Normalised icon name to chosen file.
#[derive(Debug, Default, Clone)]
pub struct IconIndex {
    entries: HashMap<String, PathBuf>,
}

impl IconIndex {
    /// Walk `dirs` in order and keep the best candidate for every key.
    pub fn build(dirs: &[PathBuf]) -> Self {
        let mut index = IconIndex::default();

        for dir in dirs {
            for entry in WalkDir::new(dir).into_iter() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!("Skipping icon path: {}", e);
                        continue;
                    }
                };

                if entry.file_type().is_dir() || !has_icon_extension(entry.path()) {
                    continue;
                }

                let key = match entry.path().file_name().and_then(|n| n.to_str()) {
                    Some(file_name) => icon_key(file_name),
                    None => continue,
                };
                if key.is_empty() {
                    continue;
                }

                index.insert(key, entry.into_path());
            }
        }

        debug!(
            "Indexed {} icons from {} directories",
            index.len(),
            dirs.len()
        );
        index
    }

    /// Insert a candidate, keeping the existing entry unless the new one is better.
    pub fn insert(&mut self, key: String, path: PathBuf) {
        match self.entries.get(&key) {
            Some(existing) if !is_better_candidate(&path, existing) => {}
            _ => {
                self.entries.insert(key, path);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&PathBuf> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps icon identifiers to files.
///
/// Shared between scanners via `Arc`; the index behind it is built on first
/// use and reused by every later lookup.
#[derive(Debug)]
pub struct IconResolver {
    dirs: Vec<PathBuf>,
    index: OnceCell<IconIndex>,
}

impl IconResolver {
    /// Create a resolver whose index will be built from `dirs`.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            index: OnceCell::new(),
        }
    }

    /// Create a resolver over the standard icon theme directories.
    pub fn from_xdg(xdg: &XdgDirs) -> Self {
        Self::new(icon_directories(xdg))
    }

    /// The index, built on first call.
    pub fn index(&self) -> &IconIndex {
        self.index.get_or_init(|| IconIndex::build(&self.dirs))
    }

    /// Resolve an icon identifier, using `context` (the descriptor's
    /// directory) for relative lookups.
    pub fn resolve(&self, identifier: &str, context: Option<&Path>) -> Option<PathBuf> {
        if identifier.is_empty() {
            return None;
        }

        let as_path = Path::new(identifier);
        if as_path.is_absolute() {
            return as_path.is_file().then(|| as_path.to_path_buf());
        }

        if let Some(dir) = context {
            if let Some(found) = find_with_extensions(&dir.join(identifier)) {
                return Some(found);
            }

            if identifier.contains(std::path::MAIN_SEPARATOR) {
                if let Some(found) = find_with_extensions(&clean_path(&dir.join(identifier))) {
                    return Some(found);
                }
            }
        }

        let key = icon_key(identifier);
        if key.is_empty() {
            return None;
        }
        self.index().get(&key).cloned()
    }

    /// Resolve as if the identifier came from the descriptor at `desktop_path`.
    pub fn debug_resolve(&self, identifier: &str, desktop_path: Option<&Path>) -> Option<PathBuf> {
        self.resolve(identifier, desktop_path.and_then(Path::parent))
    }
}

/// Icon theme directories in precedence order.
pub fn icon_directories(xdg: &XdgDirs) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Some(data_home) = &xdg.data_home {
        dirs.push(data_home.join("icons"));
        dirs.push(data_home.join("pixmaps"));
    }

    if let Some(home) = &xdg.home {
        dirs.push(home.join(".icons"));
    }

    for data_dir in &xdg.data_dirs {
        dirs.push(data_dir.join("icons"));
        dirs.push(data_dir.join("pixmaps"));
    }

    dirs.push(PathBuf::from(SYSTEM_PIXMAPS));
    dirs
}

/// Normalise an icon name: lowercase with known image extensions removed.
pub fn icon_key(name: &str) -> String {
    let mut key = name.to_lowercase();
    while let Some(stem) = strip_icon_extension(&key) {
        key = stem.to_string();
    }
    key
}

fn strip_icon_extension(name: &str) -> Option<&str> {
    ICON_EXTENSIONS.iter().find_map(|ext| {
        name.strip_suffix(ext)
            .and_then(|rest| rest.strip_suffix('.'))
    })
}

fn has_icon_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ICON_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Preference score: icons in an `apps` directory and raster formats win.
pub fn icon_score(path: &Path) -> u8 {
    let mut score = 0;

    let in_apps_dir = path
        .parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == "apps");
    if in_apps_dir {
        score += 2;
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => score += 2,
        Some(ext) if ext.eq_ignore_ascii_case("svg") => score += 1,
        _ => {}
    }

    score
}

/// Whether `candidate` should replace `existing` in the index.
pub fn is_better_candidate(candidate: &Path, existing: &Path) -> bool {
    let new_score = icon_score(candidate);
    let old_score = icon_score(existing);
    if new_score == old_score {
        return path_len(candidate) < path_len(existing);
    }
    new_score > old_score
}

fn path_len(path: &Path) -> usize {
    path.to_string_lossy().chars().count()
}

/// `base` itself if it is a file, else `base.{png,svg,xpm}` when `base` has
/// no extension.
fn find_with_extensions(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }
    if base.extension().is_some() {
        return None;
    }

    ICON_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut candidate = base.as_os_str().to_owned();
            candidate.push(".");
            candidate.push(ext);
            PathBuf::from(candidate)
        })
        .find(|candidate| candidate.is_file())
}

/// Lexically fold `.` and `..` components.
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"icon").unwrap();
    }

    #[test]
    fn test_icon_key() {
        assert_eq!(icon_key("Foo.PNG"), "foo");
        assert_eq!(icon_key("foo"), "foo");
        assert_eq!(icon_key("org.gnome.Files"), "org.gnome.files");
        assert_eq!(icon_key("icon.svg"), "icon");
        assert_eq!(icon_key("image.jpg"), "image.jpg");
        assert_eq!(icon_key(""), "");
        assert_eq!(icon_key(".png"), "");
    }

    #[test]
    fn test_icon_key_is_idempotent() {
        for name in ["Foo.PNG", "a.png.svg", "Mixed.Case.Xpm", "plain", "x.PnG.png"] {
            let once = icon_key(name);
            assert_eq!(icon_key(&once), once, "not idempotent for {}", name);
        }
    }

    #[test]
    fn test_icon_score() {
        assert_eq!(icon_score(Path::new("/t/48x48/apps/foo.png")), 4);
        assert_eq!(icon_score(Path::new("/t/scalable/apps/foo.svg")), 3);
        assert_eq!(icon_score(Path::new("/t/apps/48/foo.png")), 2);
        assert_eq!(icon_score(Path::new("/usr/share/pixmaps/foo.xpm")), 0);
        assert_eq!(icon_score(Path::new("/t/apps/foo.xpm")), 2);
    }

    #[test]
    fn test_equal_scores_prefer_shorter_path_in_any_order() {
        let short = Path::new("/a/apps/foo.png");
        let long = Path::new("/longer/apps/foo.png");
        assert!(is_better_candidate(short, long));
        assert!(!is_better_candidate(long, short));

        let mut first = IconIndex::default();
        first.insert("foo".into(), long.to_path_buf());
        first.insert("foo".into(), short.to_path_buf());

        let mut second = IconIndex::default();
        second.insert("foo".into(), short.to_path_buf());
        second.insert("foo".into(), long.to_path_buf());

        assert_eq!(first.get("foo"), Some(&short.to_path_buf()));
        assert_eq!(second.get("foo"), Some(&short.to_path_buf()));
    }

    #[test]
    fn test_higher_score_beats_shorter_path() {
        let mut index = IconIndex::default();
        index.insert("foo".into(), PathBuf::from("/p/foo.svg"));
        index.insert("foo".into(), PathBuf::from("/a/very/long/theme/apps/foo.png"));
        assert_eq!(
            index.get("foo"),
            Some(&PathBuf::from("/a/very/long/theme/apps/foo.png"))
        );
    }

    #[test]
    fn test_index_build_filters_extensions() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("hicolor/48x48/apps/Editor.PNG"));
        touch(&dir.path().join("hicolor/48x48/apps/readme.txt"));
        touch(&dir.path().join("pixmaps/editor.xpm"));

        let index = IconIndex::build(&[dir.path().to_path_buf(), dir.path().join("missing")]);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get("editor"),
            Some(&dir.path().join("hicolor/48x48/apps/Editor.PNG"))
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        let dir = TempDir::new().unwrap();
        let icon = dir.path().join("abs.png");
        touch(&icon);
        let resolver = IconResolver::new(Vec::new());

        assert_eq!(resolver.resolve(icon.to_str().unwrap(), None), Some(icon.clone()));

        let missing = dir.path().join("missing.png");
        assert_eq!(resolver.resolve(missing.to_str().unwrap(), None), None);

        // A directory is not an icon
        assert_eq!(resolver.resolve(dir.path().to_str().unwrap(), None), None);
    }

    #[test]
    fn test_resolve_next_to_descriptor() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("tool.xpm"));
        touch(&dir.path().join("tool.svg"));
        let resolver = IconResolver::new(Vec::new());

        // svg is tried before xpm
        assert_eq!(
            resolver.resolve("tool", Some(dir.path())),
            Some(dir.path().join("tool.svg"))
        );
        // explicit extension is not extended further
        assert_eq!(resolver.resolve("tool.gif", Some(dir.path())), None);
    }

    #[test]
    fn test_resolve_relative_subpath() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("share/icons/app.png"));
        let context = dir.path().join("applications");
        let resolver = IconResolver::new(Vec::new());

        assert_eq!(
            resolver.resolve("../share/icons/app", Some(&context)),
            Some(clean_path(&dir.path().join("share/icons/app.png")))
        );
    }

    #[test]
    fn test_resolve_falls_back_to_index() {
        let themes = TempDir::new().unwrap();
        let indexed = themes.path().join("hicolor/48x48/apps/myapp.png");
        touch(&indexed);
        touch(&themes.path().join("hicolor/scalable/apps/myapp.svg"));

        let descriptors = TempDir::new().unwrap();
        let resolver = IconResolver::new(vec![themes.path().to_path_buf()]);

        assert_eq!(
            resolver.resolve("myapp", Some(descriptors.path())),
            Some(indexed.clone())
        );
        assert_eq!(resolver.resolve("MyApp.png", None), Some(indexed));
        assert_eq!(resolver.resolve("unknown", None), None);
        assert_eq!(resolver.resolve("", None), None);
    }

    #[test]
    fn test_index_is_built_once() {
        let themes = TempDir::new().unwrap();
        touch(&themes.path().join("apps/first.png"));
        let resolver = Arc::new(IconResolver::new(vec![themes.path().to_path_buf()]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                std::thread::spawn(move || resolver.index().len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }

        // Files added after the first build are not picked up
        touch(&themes.path().join("apps/second.png"));
        assert_eq!(resolver.resolve("second", None), None);
        assert!(resolver.resolve("first", None).is_some());
    }

    #[test]
    fn test_icon_directories_order() {
        let xdg = XdgDirs {
            data_home: Some(PathBuf::from("/home/u/.local/share")),
            home: Some(PathBuf::from("/home/u")),
            data_dirs: vec![PathBuf::from("/usr/share")],
        };
        assert_eq!(
            icon_directories(&xdg),
            vec![
                PathBuf::from("/home/u/.local/share/icons"),
                PathBuf::from("/home/u/.local/share/pixmaps"),
                PathBuf::from("/home/u/.icons"),
                PathBuf::from("/usr/share/icons"),
                PathBuf::from("/usr/share/pixmaps"),
                PathBuf::from("/usr/share/pixmaps"),
            ]
        );
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(clean_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(clean_path(Path::new("../../b")), PathBuf::from("../../b"));
        assert_eq!(clean_path(Path::new("/../b")), PathBuf::from("/b"));
        assert_eq!(clean_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }
}
