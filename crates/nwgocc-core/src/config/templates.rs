//! User shortcut templates: custom rows and buttons.

use serde::{Deserialize, Serialize};

/// A user shortcut with a label, a shell command and an icon name or path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Shortcut {
    pub name: String,
    pub cmd: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Templates {
    pub custom_rows: Vec<Shortcut>,
    pub buttons: Vec<Shortcut>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TemplateKind {
    Rows,
    Buttons,
}

impl TemplateKind {
    pub fn title(self) -> &'static str {
        match self {
            TemplateKind::Rows => "Custom rows",
            TemplateKind::Buttons => "Custom buttons",
        }
    }
}

impl Templates {
    pub fn list(&self, kind: TemplateKind) -> &[Shortcut] {
        match kind {
            TemplateKind::Rows => &self.custom_rows,
            TemplateKind::Buttons => &self.buttons,
        }
    }

    pub fn set_list(&mut self, kind: TemplateKind, list: Vec<Shortcut>) {
        match kind {
            TemplateKind::Rows => self.custom_rows = list,
            TemplateKind::Buttons => self.buttons = list,
        }
    }
}

/// Editor state for one existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcutEdit {
    pub shortcut: Shortcut,
    pub delete: bool,
}

/// Build the new entry list from the editor rows.
///
/// Entries marked for deletion are dropped; `new_entry` is appended only when
/// it carries a name.
pub fn apply_template_edits(edits: Vec<ShortcutEdit>, new_entry: Shortcut) -> Vec<Shortcut> {
    let mut list: Vec<Shortcut> = edits
        .into_iter()
        .filter(|edit| !edit.delete)
        .map(|edit| edit.shortcut)
        .collect();
    if !new_entry.name.trim().is_empty() {
        list.push(new_entry);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut(name: &str) -> Shortcut {
        Shortcut {
            name: name.to_string(),
            cmd: format!("{name} --run"),
            icon: "system-run".to_string(),
        }
    }

    #[test]
    fn deleted_entries_are_dropped_in_order() {
        let edits = vec![
            ShortcutEdit { shortcut: shortcut("a"), delete: false },
            ShortcutEdit { shortcut: shortcut("b"), delete: true },
            ShortcutEdit { shortcut: shortcut("c"), delete: false },
        ];
        let list = apply_template_edits(edits, Shortcut::default());
        let names: Vec<_> = list.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn new_entry_needs_a_name() {
        let blank = Shortcut {
            name: "   ".to_string(),
            cmd: "thunar".to_string(),
            icon: String::new(),
        };
        assert!(apply_template_edits(Vec::new(), blank).is_empty());

        let list = apply_template_edits(Vec::new(), shortcut("files"));
        assert_eq!(list, vec![shortcut("files")]);
    }

    #[test]
    fn set_list_targets_the_right_kind() {
        let mut templates = Templates::default();
        templates.set_list(TemplateKind::Buttons, vec![shortcut("lock")]);
        assert!(templates.list(TemplateKind::Rows).is_empty());
        assert_eq!(templates.list(TemplateKind::Buttons).len(), 1);
    }

    #[test]
    fn templates_parse_with_missing_fields() {
        let json = r#"{ "custom_rows": [ { "name": "Files", "cmd": "thunar" } ] }"#;
        let templates: Templates = serde_json::from_str(json).expect("parse templates");
        assert_eq!(templates.custom_rows[0].icon, "");
        assert!(templates.buttons.is_empty());
    }
}
