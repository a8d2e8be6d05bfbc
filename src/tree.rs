use std::collections::HashSet;

use serde::Serialize;

use crate::routes::FileRecord;

/// One node of the reconstructed hierarchy. `file_id` is present when an
/// explicit record exists at this path, absent for folders that only exist
/// as path prefixes of deeper records.
#[derive(Serialize, Debug, PartialEq)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub is_folder: bool,
    pub file_id: Option<String>,
    pub children: Vec<TreeNode>,
}

/// Rebuilds the nested folder/file hierarchy from the flat record list.
///
/// For each path the intermediate folder nodes are walked or created per
/// segment; a segment is a folder if it is not the final segment of any
/// path, or if the record at that path says so. Records sharing a folder
/// prefix merge into one folder node. Sibling order follows the input
/// order, which `list_files` guarantees to be folders-first, then
/// lexicographic.
pub fn build_tree(files: &[FileRecord]) -> Vec<TreeNode> {
    let mut roots: Vec<TreeNode> = Vec::new();

    for file in files {
        let segments: Vec<&str> = file.path.split('/').collect();
        let mut cursor = &mut roots;

        for (depth, segment) in segments.iter().enumerate() {
            let last = depth == segments.len() - 1;

            let index = match cursor.iter().position(|n| n.name == *segment) {
                Some(i) => i,
                None => {
                    cursor.push(TreeNode {
                        name: segment.to_string(),
                        path: segments[..=depth].join("/"),
                        is_folder: !last || file.is_folder,
                        file_id: None,
                        children: Vec::new(),
                    });
                    cursor.len() - 1
                }
            };

            if last {
                let node = &mut cursor[index];
                node.file_id = Some(file.id.clone());
                if file.is_folder {
                    node.is_folder = true;
                }
            }

            cursor = &mut cursor[index].children;
        }
    }

    roots
}

/// Expand/collapse state of the navigation tree, tracked as a plain set of
/// paths independent of the tree's structural data. The seeded source
/// folder starts expanded.
#[derive(Debug, Clone)]
pub struct ExpandedFolders(HashSet<String>);

impl Default for ExpandedFolders {
    fn default() -> Self {
        Self(HashSet::from(["src".to_string()]))
    }
}

impl ExpandedFolders {
    /// Flips the state for `path` and returns whether it is now expanded.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.0.remove(path) {
            false
        } else {
            self.0.insert(path.to_string());
            true
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.0.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, path: &str, is_folder: bool) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            project_id: "p1".to_string(),
            path: path.to_string(),
            content: if is_folder { None } else { Some(String::new()) },
            is_folder,
            parent_path: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn files_sharing_a_prefix_merge_into_one_folder() {
        let files = vec![
            record("f1", "src", true),
            record("f2", "src/index.js", false),
            record("f3", "src/util.js", false),
            record("f4", "README.md", false),
        ];

        let tree = build_tree(&files);
        assert_eq!(tree.len(), 2);

        let src = &tree[0];
        assert_eq!(src.name, "src");
        assert!(src.is_folder);
        assert_eq!(src.file_id.as_deref(), Some("f1"));
        assert_eq!(src.children.len(), 2);
        assert_eq!(src.children[0].path, "src/index.js");
        assert!(!src.children[0].is_folder);

        let readme = &tree[1];
        assert_eq!(readme.name, "README.md");
        assert!(readme.children.is_empty());
    }

    #[test]
    fn intermediate_segments_become_folders_without_records() {
        let files = vec![record("f1", "src/lib/deep.js", false)];

        let tree = build_tree(&files);
        assert_eq!(tree.len(), 1);

        let src = &tree[0];
        assert!(src.is_folder);
        assert_eq!(src.file_id, None);

        let lib = &src.children[0];
        assert_eq!(lib.path, "src/lib");
        assert!(lib.is_folder);

        let deep = &lib.children[0];
        assert_eq!(deep.name, "deep.js");
        assert!(!deep.is_folder);
        assert_eq!(deep.file_id.as_deref(), Some("f1"));
    }

    #[test]
    fn explicit_folder_record_attaches_to_implicit_node() {
        // The deep file arrives first, the folder's own record second.
        let files = vec![
            record("f1", "src/a.js", false),
            record("f2", "src", true),
        ];

        let tree = build_tree(&files);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].file_id.as_deref(), Some("f2"));
        assert!(tree[0].is_folder);
        assert_eq!(tree[0].children.len(), 1);
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn expanded_state_is_independent_of_structure() {
        let mut expanded = ExpandedFolders::default();
        assert!(expanded.is_expanded("src"));
        assert!(!expanded.is_expanded("docs"));

        assert!(expanded.toggle("docs"));
        assert!(expanded.is_expanded("docs"));

        assert!(!expanded.toggle("src"));
        assert!(!expanded.is_expanded("src"));
    }
}
