//! Sidebar resolution: expands autogenerated sections against the content index.

use serde::Serialize;

use crate::content::{ContentIndex, normalize_directory};
use crate::error::{Error, MissingDirectoryError, Result};
use crate::types::{AutogenNode, EmptyAutogenPolicy, LinkNode, NavNode};

/// Sidebar entry after autogenerated sections have been expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedNavNode {
    Link(LinkNode),
    Group(ResolvedGroup),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedGroup {
    pub label: String,
    pub collapsed: bool,
    pub items: Vec<ResolvedNavNode>,
}

pub type ResolvedNavTree = Vec<ResolvedNavNode>;

/// Resolve a sidebar, failing if any autogenerated directory is empty.
pub fn resolve_autogen_nodes(tree: &[NavNode], index: &ContentIndex) -> Result<ResolvedNavTree> {
    NavResolver::new(index).resolve(tree)
}

pub struct NavResolver<'a> {
    index: &'a ContentIndex,
    policy: EmptyAutogenPolicy,
}

impl<'a> NavResolver<'a> {
    pub fn new(index: &'a ContentIndex) -> Self {
        Self {
            index,
            policy: EmptyAutogenPolicy::Error,
        }
    }

    pub fn empty_directories(mut self, policy: EmptyAutogenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolve(&self, tree: &[NavNode]) -> Result<ResolvedNavTree> {
        let mut missing = Vec::new();
        let resolved = self.resolve_nodes(tree, &mut missing);

        if missing.is_empty() {
            return Ok(resolved);
        }
        match self.policy {
            EmptyAutogenPolicy::Error => Err(Error::MissingDirectory(missing)),
            EmptyAutogenPolicy::Empty => {
                for m in &missing {
                    tracing::warn!(directory = %m.source_directory, "autogenerated sidebar section is empty");
                }
                Ok(resolved)
            }
        }
    }

    fn resolve_nodes(
        &self,
        nodes: &[NavNode],
        missing: &mut Vec<MissingDirectoryError>,
    ) -> Vec<ResolvedNavNode> {
        nodes
            .iter()
            .map(|node| match node {
                NavNode::Link(link) => ResolvedNavNode::Link(link.clone()),
                NavNode::Group(group) => ResolvedNavNode::Group(ResolvedGroup {
                    label: group.label.clone(),
                    collapsed: group.collapsed,
                    items: self.resolve_nodes(&group.items, missing),
                }),
                NavNode::Autogen(autogen) => {
                    let group = self.expand(autogen);
                    if group.items.is_empty() {
                        missing.push(MissingDirectoryError {
                            source_directory: autogen.directory.clone(),
                        });
                    }
                    ResolvedNavNode::Group(group)
                }
            })
            .collect()
    }

    fn expand(&self, autogen: &AutogenNode) -> ResolvedGroup {
        let directory = normalize_directory(&autogen.directory);
        let mut root = DirTree::default();

        for entry in self.index.under(&directory) {
            let relative = if directory.is_empty() {
                entry.slug.as_str()
            } else {
                entry
                    .slug
                    .strip_prefix(&directory)
                    .unwrap_or_default()
                    .trim_start_matches('/')
            };
            let mut segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
            // The last segment names the document itself
            segments.pop();

            root.insert(
                &segments,
                LinkNode {
                    label: entry.sidebar_label().to_string(),
                    target: entry.href(),
                },
            );
        }

        tracing::debug!(
            directory = %directory,
            items = root.items.len(),
            "expanded autogenerated sidebar section"
        );

        ResolvedGroup {
            label: autogen.label.clone(),
            collapsed: autogen.collapsed,
            items: root.into_nodes(autogen.collapsed),
        }
    }
}

#[derive(Default)]
struct DirTree {
    items: Vec<DirItem>,
}

enum DirItem {
    Link(LinkNode),
    Dir(String, DirTree),
}

impl DirTree {
    fn insert(&mut self, segments: &[&str], link: LinkNode) {
        let Some((first, rest)) = segments.split_first() else {
            self.items.push(DirItem::Link(link));
            return;
        };

        let existing = self.items.iter_mut().find_map(|item| match item {
            DirItem::Dir(name, tree) if name == first => Some(tree),
            _ => None,
        });
        match existing {
            Some(tree) => tree.insert(rest, link),
            None => {
                let mut tree = DirTree::default();
                tree.insert(rest, link);
                self.items.push(DirItem::Dir(first.to_string(), tree));
            }
        }
    }

    fn into_nodes(self, collapsed: bool) -> Vec<ResolvedNavNode> {
        self.items
            .into_iter()
            .map(|item| match item {
                DirItem::Link(link) => ResolvedNavNode::Link(link),
                DirItem::Dir(label, tree) => ResolvedNavNode::Group(ResolvedGroup {
                    label,
                    collapsed,
                    items: tree.into_nodes(collapsed),
                }),
            })
            .collect()
    }
}
