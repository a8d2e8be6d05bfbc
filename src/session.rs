use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::routes::FileRecord;

/// Quiet period after the last keystroke before a tab's content is flushed
/// to its persisted file.
pub const AUTO_SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Scratch buffer only; edits are never persisted.
    Single,
    /// Tabs are bound to project files and auto-saved.
    Project,
}

/// An open editor handle. Its in-memory content is authoritative over the
/// persisted file until flushed.
#[derive(Debug, Clone)]
pub struct Tab {
    pub id: u64,
    pub name: String,
    pub path: Option<String>,
    pub content: String,
    pub language: String,
    pub active: bool,
    pub file_id: Option<String>,
}

/// A debounced write the owner of the session must apply via `update_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub file_id: String,
    pub path: String,
    pub content: String,
}

/// State machine mapping open tabs to persisted files.
///
/// Invariants: exactly one tab is active whenever the tab list is non-empty,
/// and the list is never empty (the last tab cannot close). Auto-save is
/// single-flight per tab: only the latest edit within the debounce window
/// emits a write.
pub struct EditorSession {
    mode: EditorMode,
    tabs: Vec<Tab>,
    next_tab_id: u64,
    saves: mpsc::UnboundedSender<SaveRequest>,
    pending: HashMap<u64, CancellationToken>,
    debounce: Duration,
}

impl EditorSession {
    /// Creates a session seeded with one scratch tab, plus the receiving end
    /// of the auto-save channel the caller is expected to drain.
    pub fn new(mode: EditorMode) -> (Self, mpsc::UnboundedReceiver<SaveRequest>) {
        let (saves, save_rx) = mpsc::unbounded_channel();

        let session = Self {
            mode,
            tabs: vec![Tab {
                id: 1,
                name: "main.js".to_string(),
                path: Some("main.js".to_string()),
                content: starter_source("javascript"),
                language: "javascript".to_string(),
                active: true,
                file_id: None,
            }],
            next_tab_id: 2,
            saves,
            pending: HashMap::new(),
            debounce: AUTO_SAVE_DEBOUNCE,
        };

        (session, save_rx)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }

    pub fn set_active_tab(&mut self, id: u64) {
        if !self.tabs.iter().any(|t| t.id == id) {
            return;
        }
        for tab in &mut self.tabs {
            tab.active = tab.id == id;
        }
    }

    /// Opens a persisted file. Reopening an already-open path activates the
    /// existing tab and keeps showing its in-memory content; the persisted
    /// content is only read for genuinely new tabs.
    pub fn open_file(&mut self, file: &FileRecord) -> u64 {
        if let Some(existing) = self
            .tabs
            .iter()
            .find(|t| t.path.as_deref() == Some(file.path.as_str()))
        {
            let id = existing.id;
            self.set_active_tab(id);
            return id;
        }

        let id = self.next_tab_id;
        self.next_tab_id += 1;

        let name = file
            .path
            .rsplit('/')
            .next()
            .unwrap_or(file.path.as_str())
            .to_string();

        for tab in &mut self.tabs {
            tab.active = false;
        }

        self.tabs.push(Tab {
            id,
            name,
            path: Some(file.path.clone()),
            content: file.content.clone().unwrap_or_default(),
            language: language_for_path(&file.path).to_string(),
            active: true,
            file_id: Some(file.id.clone()),
        });

        id
    }

    /// Closing the sole remaining tab is a no-op. Closing the active tab
    /// activates the tab now sitting at `min(removed_index, remaining - 1)`.
    pub fn close_tab(&mut self, id: u64) {
        if self.tabs.len() <= 1 {
            return;
        }
        let Some(index) = self.tabs.iter().position(|t| t.id == id) else {
            return;
        };

        if let Some(token) = self.pending.remove(&id) {
            token.cancel();
        }

        let was_active = self.tabs[index].active;
        self.tabs.remove(index);

        if was_active {
            let next = index.min(self.tabs.len() - 1);
            let next_id = self.tabs[next].id;
            self.set_active_tab(next_id);
        }
    }

    /// Updates the working copy unconditionally. In project mode the per-tab
    /// debounce timer restarts, cancelling any pending flush; an already
    /// in-flight save is out of reach and may still land afterwards.
    pub fn edit(&mut self, tab_id: u64, content: impl Into<String>) {
        let content = content.into();
        let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) else {
            return;
        };
        tab.content = content.clone();

        if self.mode != EditorMode::Project {
            return;
        }
        let (Some(file_id), Some(path)) = (tab.file_id.clone(), tab.path.clone()) else {
            return;
        };

        if let Some(previous) = self.pending.remove(&tab_id) {
            previous.cancel();
        }

        let token = CancellationToken::new();
        self.pending.insert(tab_id, token.clone());

        let saves = self.saves.clone();
        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(debounce) => {
                    let _ = saves.send(SaveRequest { file_id, path, content });
                }
            }
        });
    }

    /// Replaces the active tab's content wholesale with the starter snippet
    /// for the new language. Destructive and irreversible.
    pub fn switch_language(&mut self, language: &str) {
        let Some(tab) = self.tabs.iter_mut().find(|t| t.active) else {
            return;
        };
        tab.language = language.to_string();
        tab.name = format!("main{}", extension_for(language));
        tab.content = starter_source(language);
    }
}

pub fn extension_for(language: &str) -> &'static str {
    match language {
        "javascript" => ".js",
        "typescript" => ".ts",
        "python" => ".py",
        "java" => ".java",
        "cpp" => ".cpp",
        "c" => ".c",
        "csharp" => ".cs",
        "go" => ".go",
        "rust" => ".rs",
        "ruby" => ".rb",
        "php" => ".php",
        "swift" => ".swift",
        "kotlin" => ".kt",
        "html" => ".html",
        "css" => ".css",
        "json" => ".json",
        "sql" => ".sql",
        "bash" | "shell" => ".sh",
        _ => ".txt",
    }
}

pub fn language_for_path(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("js") => "javascript",
        Some("ts") => "typescript",
        Some("py") => "python",
        Some("java") => "java",
        Some("cpp") => "cpp",
        Some("c") => "c",
        Some("cs") => "csharp",
        Some("go") => "go",
        Some("rs") => "rust",
        Some("rb") => "ruby",
        Some("php") => "php",
        Some("swift") => "swift",
        Some("kt") => "kotlin",
        Some("html") => "html",
        Some("css") => "css",
        Some("json") => "json",
        Some("sql") => "sql",
        Some("sh") => "bash",
        _ => "javascript",
    }
}

/// Starter content for a freshly switched language.
pub fn starter_source(language: &str) -> String {
    match language {
        "javascript" => "// JavaScript\nconsole.log(\"Hello, World!\");".to_string(),
        "typescript" => {
            "// TypeScript\nconst greeting: string = \"Hello, World!\";\nconsole.log(greeting);"
                .to_string()
        }
        "python" => "# Python\nprint(\"Hello, World!\")".to_string(),
        "java" => "// Java\npublic class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n    }\n}".to_string(),
        "cpp" => "// C++\n#include <iostream>\n\nint main() {\n    std::cout << \"Hello, World!\" << std::endl;\n    return 0;\n}".to_string(),
        "c" => "// C\n#include <stdio.h>\n\nint main() {\n    printf(\"Hello, World!\\n\");\n    return 0;\n}".to_string(),
        "go" => "// Go\npackage main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println(\"Hello, World!\")\n}".to_string(),
        "rust" => "// Rust\nfn main() {\n    println!(\"Hello, World!\");\n}".to_string(),
        "ruby" => "# Ruby\nputs \"Hello, World!\"".to_string(),
        "php" => "<?php\n// PHP\necho \"Hello, World!\";".to_string(),
        other => format!("// {other}\n// Start coding here..."),
    }
}
