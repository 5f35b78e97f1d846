// src/catalog/tree.rs

use crate::models::api::TagNodeData;
use log::debug;
use std::collections::HashMap;

/// 节点在 `TagTree::nodes` 中的下标
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct TagNode {
    pub tag_id: String,
    pub tag_name: String,
    /// 子层级的名称，例如 "学段"、"学科"
    pub hierarchy_name: Option<String>,
    pub level: usize,
    pub children: Vec<NodeId>,
    pub books: Vec<Book>,
}

impl TagNode {
    fn new(tag_id: String, tag_name: String, hierarchy_name: Option<String>, level: usize) -> Self {
        Self {
            tag_id,
            tag_name,
            hierarchy_name,
            level,
            children: Vec::new(),
            books: Vec::new(),
        }
    }
}

/// 某个节点下可供选择的选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOptions {
    /// (子节点, 显示名)
    Tags(Vec<(NodeId, String)>),
    /// (教材 ID, 显示名)
    Books(Vec<(String, String)>),
}

impl NodeOptions {
    pub fn labels(&self) -> Vec<String> {
        match self {
            NodeOptions::Tags(items) => items.iter().map(|(_, name)| name.clone()).collect(),
            NodeOptions::Books(items) => items.iter().map(|(_, name)| name.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            NodeOptions::Tags(items) => items.is_empty(),
            NodeOptions::Books(items) => items.is_empty(),
        }
    }
}

/// 去掉所有空白，并把 `•` 统一为 `·`
pub fn normalize_display_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '•' { '·' } else { c })
        .collect()
}

/// 教材分类树。所有节点存放在一个数组中，通过下标互相引用，根节点为 0。
#[derive(Debug, Clone)]
pub struct TagTree {
    nodes: Vec<TagNode>,
}

impl TagTree {
    pub const ROOT: NodeId = 0;

    /// 从分类 JSON 构建。根节点以 `tag_path` 作为 ID，其余节点使用 `tag_id`。
    pub fn from_tag_data(data: &TagNodeData) -> Self {
        let root = TagNode::new(
            data.tag_path.clone().or_else(|| data.tag_id.clone()).unwrap_or_default(),
            data.tag_name.clone().unwrap_or_default(),
            data.hierarchy().and_then(|h| h.hierarchy_name.clone()),
            0,
        );
        let mut tree = Self { nodes: vec![root] };

        let mut stack: Vec<(NodeId, &TagNodeData)> = vec![(Self::ROOT, data)];
        while let Some((parent, data)) = stack.pop() {
            for child in data.children() {
                let level = tree.nodes[parent].level + 1;
                let id = tree.push_child(
                    parent,
                    TagNode::new(
                        child.tag_id.clone().unwrap_or_default(),
                        child.tag_name.clone().unwrap_or_default(),
                        child.hierarchy().and_then(|h| h.hierarchy_name.clone()),
                        level,
                    ),
                );
                stack.push((id, child));
            }
        }
        debug!("tag tree built with {} nodes", tree.nodes.len());
        tree
    }

    fn push_child(&mut self, parent: NodeId, node: TagNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&TagNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> &TagNode {
        &self.nodes[Self::ROOT]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn find_child(&self, parent: NodeId, tag_id: &str) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].tag_id == tag_id)
    }

    /// 按 `tag_path` ("root/a/b/c") 逐级下降，缺失的节点以 `tag_names` 中的名称创建，
    /// 最后把教材挂到末级节点上。路径首段不是根节点时忽略该教材，返回 `false`。
    pub fn attach_book(&mut self, tag_path: &str, book: Book, tag_names: &HashMap<String, String>) -> bool {
        let mut segments = tag_path.split('/').filter(|s| !s.is_empty());
        if segments.next() != Some(self.root().tag_id.as_str()) {
            return false;
        }

        let mut current = Self::ROOT;
        for segment in segments {
            current = match self.find_child(current, segment) {
                Some(child) => child,
                None => {
                    let name = tag_names
                        .get(segment)
                        .cloned()
                        .unwrap_or_else(|| segment.to_string());
                    let level = self.nodes[current].level + 1;
                    self.push_child(
                        current,
                        TagNode::new(segment.to_string(), name.clone(), Some(name), level),
                    )
                }
            };
        }

        let node = &mut self.nodes[current];
        if !node.books.iter().any(|b| b.id == book.id) {
            node.books.push(book);
        }
        true
    }

    /// 节点下的选项：子节点都挂有教材且没有更深层级时列出教材，否则列出子分类。
    pub fn options(&self, id: NodeId) -> NodeOptions {
        let Some(node) = self.node(id) else {
            return NodeOptions::Tags(Vec::new());
        };

        let book_leaves = !node.children.is_empty()
            && node.children.iter().all(|&c| {
                let child = &self.nodes[c];
                child.children.is_empty() && !child.books.is_empty()
            });

        if node.children.is_empty() || book_leaves {
            let books = node
                .books
                .iter()
                .chain(node.children.iter().flat_map(|&c| self.nodes[c].books.iter()))
                .map(|b| (b.id.clone(), format!("《{}》", normalize_display_name(&b.title))))
                .collect();
            NodeOptions::Books(books)
        } else {
            NodeOptions::Tags(
                node.children
                    .iter()
                    .map(|&c| (c, normalize_display_name(&self.nodes[c].tag_name)))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> TagTree {
        let data: TagNodeData = serde_json::from_value(json!({
            "tag_id": "ignored",
            "tag_path": "root",
            "tag_name": "专题",
            "hierarchies": [{
                "hierarchy_name": "电子教材",
                "children": [
                    {"tag_id": "primary", "tag_name": "小学", "hierarchies": [{
                        "hierarchy_name": "学科",
                        "children": [
                            {"tag_id": "math", "tag_name": "数 学", "hierarchies": null}
                        ]
                    }]},
                    {"tag_id": "special", "tag_name": "小学（五•四学制）", "hierarchies": []}
                ]
            }]
        }))
        .unwrap();
        TagTree::from_tag_data(&data)
    }

    #[test]
    fn test_build_from_tag_data() {
        let tree = sample_tree();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root().tag_id, "root");
        assert_eq!(tree.root().hierarchy_name.as_deref(), Some("电子教材"));
        assert_eq!(
            tree.options(TagTree::ROOT),
            NodeOptions::Tags(vec![(1, "小学".into()), (2, "小学（五·四学制）".into())])
        );
    }

    #[test]
    fn test_attach_books_creates_missing_nodes_once() {
        let mut tree = sample_tree();
        let names = HashMap::from([
            ("grade1".to_string(), "一年级".to_string()),
            ("vol1".to_string(), "上册".to_string()),
            ("vol2".to_string(), "下册".to_string()),
        ]);
        let book = |id: &str, title: &str| Book { id: id.into(), title: title.into() };

        assert!(tree.attach_book("root/primary/math/grade1/vol1", book("b1", "数学 一年级 上册"), &names));
        assert!(tree.attach_book("root/primary/math/grade1/vol2", book("b2", "数学•下册"), &names));
        assert!(!tree.attach_book("other/primary", book("b3", "x"), &names));
        // 重复的教材只挂一次
        assert!(tree.attach_book("root/primary/math/grade1/vol1", book("b1", "数学 一年级 上册"), &names));

        // root, primary, special, math, grade1, vol1, vol2
        assert_eq!(tree.len(), 7);

        let math = tree.node(1).unwrap().children[0];
        let grade1 = tree.node(math).unwrap().children[0];
        assert_eq!(tree.node(grade1).unwrap().tag_name, "一年级");
        assert_eq!(
            tree.options(grade1),
            NodeOptions::Books(vec![
                ("b1".into(), "《数学一年级上册》".into()),
                ("b2".into(), "《数学·下册》".into()),
            ])
        );
        assert_eq!(tree.options(math), NodeOptions::Tags(vec![(grade1, "一年级".into())]));
    }

    #[test]
    fn test_unknown_segment_uses_id_as_name() {
        let mut tree = sample_tree();
        assert!(tree.attach_book(
            "root/special/x1",
            Book { id: "b".into(), title: "书".into() },
            &HashMap::new()
        ));
        assert_eq!(
            tree.options(2),
            NodeOptions::Books(vec![("b".into(), "《书》".into())])
        );
        assert!(tree.options(99).is_empty());
    }
}
