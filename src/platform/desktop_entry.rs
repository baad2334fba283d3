//! Desktop entry parsing.
//!
//! Only the `[Desktop Entry]` group matters. The parser reads the handful of
//! keys the catalog needs and reports whether the entry should be shown.

use std::fs;
use std::path::Path;

use crate::error::{SiftError, SiftResult};
use crate::platform::Application;
use crate::services::icons::IconResolver;

const MAIN_GROUP: &str = "[Desktop Entry]";

/// Raw fields read from the main group of a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopEntry {
    pub entry_type: String,
    pub name: String,
    pub exec: String,
    pub icon: String,
    pub hidden: bool,
    pub no_display: bool,
}

impl DesktopEntry {
    /// Parse descriptor text.
    pub fn parse(content: &str) -> Self {
        let mut entry = DesktopEntry::default();
        let mut in_main_group = false;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                in_main_group = line == MAIN_GROUP;
                continue;
            }

            if !in_main_group {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "Type" => entry.entry_type = value.to_string(),
                "Name" => entry.name = value.to_string(),
                // A localized name only fills in while nothing is set yet
                _ if key.starts_with("Name[") && entry.name.is_empty() => {
                    entry.name = value.to_string()
                }
                "Exec" => entry.exec = sanitize_exec(value),
                "Icon" => entry.icon = value.to_string(),
                "Hidden" => entry.hidden = value.eq_ignore_ascii_case("true"),
                "NoDisplay" => entry.no_display = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        entry
    }

    /// Whether the entry describes a launchable, visible application.
    pub fn is_listed(&self) -> bool {
        self.entry_type == "Application"
            && !self.hidden
            && !self.no_display
            && !self.name.is_empty()
            && !self.exec.is_empty()
    }
}

/// Drop every token containing a `%` field code and normalise whitespace.
pub fn sanitize_exec(raw: &str) -> String {
    raw.split_whitespace()
        .filter(|token| !token.contains('%'))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a .desktop file into an Application.
///
/// Returns `Ok(None)` for entries that should not be listed (wrong type,
/// hidden, or missing name/exec). Only read failures are errors; invalid
/// UTF-8 is decoded lossily so a stray byte in an unused key cannot hide
/// the entry.
pub fn parse_desktop_file(path: &Path, icons: &IconResolver) -> SiftResult<Option<Application>> {
    let bytes = fs::read(path).map_err(|source| SiftError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let entry = DesktopEntry::parse(&String::from_utf8_lossy(&bytes));
    if !entry.is_listed() {
        return Ok(None);
    }

    let icon_path = icons.resolve(&entry.icon, path.parent());
    let icon_name = if entry.icon.is_empty() {
        None
    } else {
        Some(entry.icon)
    };

    Ok(Some(Application {
        name: entry.name,
        exec: entry.exec,
        icon_name,
        icon_path,
        path: path.to_path_buf(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIREFOX: &str = "\
[Desktop Entry]
Type=Application
Name=Firefox
Exec=firefox %u
Icon=firefox

[Desktop Action new-window]
Name=New Window
Exec=firefox --new-window %u
";

    #[test]
    fn test_parse_basic_entry() {
        let entry = DesktopEntry::parse(FIREFOX);
        assert_eq!(entry.entry_type, "Application");
        assert_eq!(entry.name, "Firefox");
        assert_eq!(entry.exec, "firefox");
        assert_eq!(entry.icon, "firefox");
        assert!(entry.is_listed());
    }

    #[test]
    fn test_other_groups_are_ignored() {
        let entry = DesktopEntry::parse(
            "[Desktop Action x]\nName=Action\nExec=act\n[Desktop Entry]\nType=Application\nExec=real\n",
        );
        assert_eq!(entry.name, "");
        assert_eq!(entry.exec, "real");
        assert!(!entry.is_listed());
    }

    #[test]
    fn test_first_localized_name_wins_without_plain_name() {
        let entry = DesktopEntry::parse(
            "[Desktop Entry]\nName[de]=Dateien\nName[fr]=Fichiers\nType=Application\nExec=files\n",
        );
        assert_eq!(entry.name, "Dateien");
    }

    #[test]
    fn test_plain_name_overrides_earlier_localized_name() {
        let entry =
            DesktopEntry::parse("[Desktop Entry]\nName[de]=Dateien\nName=Files\nName[fr]=Fichiers\n");
        assert_eq!(entry.name, "Files");
    }

    #[test]
    fn test_skip_conditions() {
        let cases = [
            "[Desktop Entry]\nType=Link\nName=A\nExec=a\n",
            "[Desktop Entry]\nType=Application\nName=A\nExec=a\nHidden=TRUE\n",
            "[Desktop Entry]\nType=Application\nName=A\nExec=a\nNoDisplay=true\n",
            "[Desktop Entry]\nType=Application\nExec=a\n",
            "[Desktop Entry]\nType=Application\nName=A\nExec=%F\n",
            "[Desktop Entry]\ntype=Application\nName=A\nExec=a\n",
        ];
        for content in cases {
            assert!(
                !DesktopEntry::parse(content).is_listed(),
                "should be skipped: {:?}",
                content
            );
        }
    }

    #[test]
    fn test_boolean_false_keeps_entry() {
        let entry = DesktopEntry::parse(
            "[Desktop Entry]\nType=Application\nName=A\nExec=a\nHidden=false\nNoDisplay=False\n",
        );
        assert!(entry.is_listed());
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let entry = DesktopEntry::parse(
            "# leading comment\n\n[Desktop Entry]\n  # indented comment\nType = Application\nName = Spaced \nExec=  run  it  \nbogus line\n",
        );
        assert_eq!(entry.name, "Spaced");
        assert_eq!(entry.exec, "run it");
        assert!(entry.is_listed());
    }

    #[test]
    fn test_sanitize_exec() {
        assert_eq!(sanitize_exec("firefox %u"), "firefox");
        assert_eq!(sanitize_exec("gimp %f --new %i"), "gimp --new");
        assert_eq!(sanitize_exec("  env  FOO=1   app  "), "env FOO=1 app");
        assert_eq!(sanitize_exec("app --arg=%U"), "app");
        assert_eq!(sanitize_exec("%F"), "");
    }

    #[test]
    fn test_sanitize_exec_is_idempotent() {
        for raw in ["firefox %u", "  a\tb %c  c ", "", "x=%k y"] {
            let once = sanitize_exec(raw);
            assert_eq!(sanitize_exec(&once), once);
        }
    }

    #[test]
    fn test_parse_desktop_file_resolves_local_icon() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("myapp.svg"), "<svg/>").unwrap();
        let path = dir.path().join("myapp.desktop");
        std::fs::write(
            &path,
            "[Desktop Entry]\nType=Application\nName=My App\nExec=myapp %F\nIcon=myapp\n",
        )
        .unwrap();

        let resolver = IconResolver::new(Vec::new());
        let app = parse_desktop_file(&path, &resolver).unwrap().unwrap();
        assert_eq!(app.name, "My App");
        assert_eq!(app.exec, "myapp");
        assert_eq!(app.icon_name.as_deref(), Some("myapp"));
        assert_eq!(app.icon_path, Some(dir.path().join("myapp.svg")));
        assert_eq!(app.path, path);
    }

    #[test]
    fn test_parse_desktop_file_skip_is_not_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hidden.desktop");
        std::fs::write(
            &path,
            "[Desktop Entry]\nType=Application\nName=H\nExec=h\nHidden=true\n",
        )
        .unwrap();

        let resolver = IconResolver::new(Vec::new());
        assert!(parse_desktop_file(&path, &resolver).unwrap().is_none());
    }

    #[test]
    fn test_parse_desktop_file_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folder.desktop");
        std::fs::create_dir(&path).unwrap();

        let resolver = IconResolver::new(Vec::new());
        let err = parse_desktop_file(&path, &resolver).unwrap_err();
        assert!(matches!(err, SiftError::Parse { .. }));
        assert!(err.to_string().contains("folder.desktop"));
    }

    #[test]
    fn test_parse_desktop_file_tolerates_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.desktop");
        let mut content = b"[Desktop Entry]\nType=Application\nName=Editor\nComment[de]=Gr".to_vec();
        content.push(0xfc);
        content.extend_from_slice(b"n\nExec=editor %F\n");
        std::fs::write(&path, content).unwrap();

        let resolver = IconResolver::new(Vec::new());
        let app = parse_desktop_file(&path, &resolver).unwrap().unwrap();
        assert_eq!(app.name, "Editor");
        assert_eq!(app.exec, "editor");
    }

    #[test]
    fn test_parse_desktop_file_binary_content_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.desktop");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let resolver = IconResolver::new(Vec::new());
        assert!(parse_desktop_file(&path, &resolver).unwrap().is_none());
    }
}
