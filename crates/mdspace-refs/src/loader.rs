//! Bounded recursive reference loading
//!
//! Expands normalized references into a hierarchical content tree through
//! the document provider. Three independent guards truncate expansion and
//! return partial results rather than failing:
//!
//! 1. a global node cap across the whole call,
//! 2. a maximum depth,
//! 3. a cooperative wall-clock timeout checked at the top of each step.
//!
//! A single visited set keyed `path#section` is threaded through the whole
//! traversal (not reset per branch), so content reachable via two different
//! paths is expanded once — first-reached wins. Missing or empty referenced
//! content is skipped, never an error.

use crate::extract::extract_references;
use crate::normalize::{normalize_references, NormalizedReference};
use futures::future::BoxFuture;
use futures::FutureExt;
use indexmap::IndexMap;
use mdspace_address::{namespace_of, Result};
use mdspace_provider::DocumentProvider;
use serde::Serialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Guard configuration for a load operation
#[derive(Debug, Clone, Copy)]
pub struct LoaderLimits {
    /// Maximum tree depth (roots sit at depth 1)
    pub max_depth: usize,
    /// Maximum total nodes across one call
    pub max_nodes: usize,
    /// Wall-clock budget measured from call start
    pub timeout: Duration,
}

impl Default for LoaderLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_nodes: 100,
            timeout: Duration::from_secs(5),
        }
    }
}

impl LoaderLimits {
    /// Override the maximum depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Override the node cap
    #[inline]
    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Override the wall-clock budget
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One node of a loaded reference tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchicalContent {
    /// Resolved path (`/doc.md` or `/doc.md#section`)
    pub path: String,
    /// Heading or document title
    pub title: String,
    /// Loaded markdown body
    pub content: String,
    /// Depth in the loaded tree (roots at 1)
    pub depth: usize,
    /// Namespace of the containing document
    pub namespace: String,
    /// Nested references loaded from this node's content
    pub children: Vec<HierarchicalContent>,
}

/// Read-only summary over a loaded tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyStats {
    /// Total node count
    pub total_nodes: usize,
    /// Deepest node depth (0 for an empty tree)
    pub max_depth: usize,
    /// Node counts per namespace, in first-seen order
    pub by_namespace: IndexMap<String, usize>,
}

/// Traversal state shared across the whole call
struct LoadState {
    visited: HashSet<String>,
    nodes: usize,
    started: Instant,
}

/// Recursive reference loader
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceLoader {
    limits: LoaderLimits,
}

impl ReferenceLoader {
    /// Loader with default limits
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with explicit limits
    #[inline]
    #[must_use]
    pub fn with_limits(limits: LoaderLimits) -> Self {
        Self { limits }
    }

    /// Expand normalized references into a bounded content tree
    ///
    /// Truncation by any guard is silent: partial hierarchies are valid
    /// results, not errors.
    pub async fn load_references(
        &self,
        refs: &[NormalizedReference],
        provider: &dyn DocumentProvider,
    ) -> Vec<HierarchicalContent> {
        let mut state = LoadState {
            visited: HashSet::new(),
            nodes: 0,
            started: Instant::now(),
        };
        self.expand(refs.to_vec(), 1, provider, &mut state).await
    }

    /// Extract, normalize, and load in one step
    ///
    /// # Errors
    /// Fails only when `context_path` itself is unusable; per-reference
    /// problems are skipped as usual.
    pub async fn load_references_from_content(
        &self,
        content: &str,
        context_path: &str,
        provider: &dyn DocumentProvider,
    ) -> Result<Vec<HierarchicalContent>> {
        let tokens = extract_references(content);
        let refs = normalize_references(&tokens, context_path)?;
        Ok(self.load_references(&refs, provider).await)
    }

    fn expand<'a>(
        &'a self,
        refs: Vec<NormalizedReference>,
        depth: usize,
        provider: &'a dyn DocumentProvider,
        state: &'a mut LoadState,
    ) -> BoxFuture<'a, Vec<HierarchicalContent>> {
        async move {
            let mut nodes = Vec::new();

            for reference in refs {
                if state.started.elapsed() >= self.limits.timeout {
                    trace!(path = %reference.resolved_path, "load budget exhausted, truncating");
                    break;
                }
                if state.nodes >= self.limits.max_nodes {
                    trace!(cap = self.limits.max_nodes, "node cap reached, truncating");
                    break;
                }
                if !state.visited.insert(reference.visited_key()) {
                    // First-reached wins; re-entry would cycle
                    continue;
                }

                let Some((title, content)) = self.fetch(&reference, provider).await else {
                    continue;
                };
                state.nodes += 1;

                let children = if depth < self.limits.max_depth {
                    let tokens = extract_references(&content);
                    match normalize_references(&tokens, &reference.document_path) {
                        Ok(child_refs) if !child_refs.is_empty() => {
                            self.expand(child_refs, depth + 1, provider, &mut *state).await
                        }
                        _ => Vec::new(),
                    }
                } else {
                    Vec::new()
                };

                nodes.push(HierarchicalContent {
                    namespace: namespace_of(&reference.document_path),
                    path: reference.resolved_path.clone(),
                    title,
                    content,
                    depth,
                    children,
                });
            }

            nodes
        }
        .boxed()
    }

    /// Fetch one reference's title and body; `None` means "skip quietly"
    async fn fetch(
        &self,
        reference: &NormalizedReference,
        provider: &dyn DocumentProvider,
    ) -> Option<(String, String)> {
        let content = match &reference.section_slug {
            Some(slug) => provider
                .get_section_content(&reference.document_path, slug)
                .await,
            None => provider.get_document_content(&reference.document_path).await,
        };

        let content = match content {
            Ok(Some(body)) => body,
            Ok(None) => return None,
            Err(err) => {
                warn!(path = %reference.resolved_path, error = %err, "skipping unreadable reference");
                return None;
            }
        };
        if content.trim().is_empty() {
            return None;
        }

        let title = self.resolve_title(reference, provider).await;
        Some((title, content))
    }

    async fn resolve_title(
        &self,
        reference: &NormalizedReference,
        provider: &dyn DocumentProvider,
    ) -> String {
        let document = match provider.get_document(&reference.document_path).await {
            Ok(Some(doc)) => Some(doc),
            _ => None,
        };

        match &reference.section_slug {
            Some(slug) => document
                .as_ref()
                .and_then(|doc| doc.heading(slug))
                .map(|heading| heading.title.clone())
                .unwrap_or_else(|| {
                    slug.rsplit('/').next().unwrap_or(slug).replace('-', " ")
                }),
            None => document
                .and_then(|doc| doc.metadata.title)
                .unwrap_or_else(|| {
                    let file = reference
                        .document_path
                        .rsplit('/')
                        .next()
                        .unwrap_or_default();
                    file.strip_suffix(".md").unwrap_or(file).to_string()
                }),
        }
    }
}

/// Pre-order flattening of an already-built tree; no I/O
#[must_use]
pub fn flatten_hierarchy(roots: &[HierarchicalContent]) -> Vec<&HierarchicalContent> {
    fn walk<'a>(node: &'a HierarchicalContent, out: &mut Vec<&'a HierarchicalContent>) {
        out.push(node);
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for root in roots {
        walk(root, &mut out);
    }
    out
}

/// Summary statistics over an already-built tree; no I/O
#[must_use]
pub fn hierarchy_stats(roots: &[HierarchicalContent]) -> HierarchyStats {
    let flat = flatten_hierarchy(roots);
    let mut by_namespace: IndexMap<String, usize> = IndexMap::new();
    let mut max_depth = 0;

    for node in &flat {
        max_depth = max_depth.max(node.depth);
        *by_namespace.entry(node.namespace.clone()).or_insert(0) += 1;
    }

    HierarchyStats {
        total_nodes: flat.len(),
        max_depth,
        by_namespace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdspace_testing::InMemoryProvider;

    fn guide_corpus() -> InMemoryProvider {
        let provider = InMemoryProvider::new();
        provider.insert_document(
            "/guide.md",
            "# Guide\n\nStart with @#setup and @/api/auth.md#login.\n\n## Setup\n\nInstall things.\n",
        );
        provider.insert_document(
            "/api/auth.md",
            "# Auth\n\n## Login\n\nPost credentials. See @/api/tokens.md.\n",
        );
        provider.insert_document("/api/tokens.md", "# Tokens\n\nOpaque bearer tokens.\n");
        provider
    }

    fn refs_for(content: &str, context: &str) -> Vec<NormalizedReference> {
        normalize_references(&extract_references(content), context).unwrap()
    }

    #[tokio::test]
    async fn depth_one_returns_roots_without_children() {
        let provider = guide_corpus();
        let loader = ReferenceLoader::with_limits(LoaderLimits::default().with_max_depth(1));

        let refs = refs_for(
            "Start with @#setup and @/api/auth.md#login.",
            "/guide.md",
        );
        let tree = loader.load_references(&refs, &provider).await;

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].path, "/guide.md#setup");
        assert_eq!(tree[1].path, "/api/auth.md#login");
        assert!(tree.iter().all(|n| n.depth == 1 && n.children.is_empty()));
    }

    #[tokio::test]
    async fn nested_references_expand_until_depth_cap() {
        let provider = guide_corpus();
        let loader = ReferenceLoader::new();

        let refs = refs_for("@/api/auth.md#login", "/guide.md");
        let tree = loader.load_references(&refs, &provider).await;

        assert_eq!(tree.len(), 1);
        let login = &tree[0];
        assert_eq!(login.title, "Login");
        assert_eq!(login.children.len(), 1);
        assert_eq!(login.children[0].path, "/api/tokens.md");
        assert_eq!(login.children[0].depth, 2);
    }

    #[tokio::test]
    async fn cycles_terminate_with_each_path_loaded_once() {
        let provider = InMemoryProvider::new();
        provider.insert_document("/a.md", "# A\n\nPoints at @/b.md.\n");
        provider.insert_document("/b.md", "# B\n\nPoints back at @/a.md.\n");

        let loader = ReferenceLoader::with_limits(LoaderLimits::default().with_max_depth(10));
        let refs = refs_for("@/a.md", "/root.md");
        let tree = loader.load_references(&refs, &provider).await;

        assert_eq!(tree.len(), 1);
        let a = &tree[0];
        assert_eq!(a.path, "/a.md");
        assert_eq!(a.children.len(), 1);
        let b = &a.children[0];
        assert_eq!(b.path, "/b.md");
        // The back-edge to /a.md was already visited, so B has no children
        assert!(b.children.is_empty());
    }

    #[tokio::test]
    async fn node_cap_truncates_fanout_silently() {
        let provider = InMemoryProvider::new();
        let mut hub = String::from("# Hub\n\n");
        for i in 0..10 {
            hub.push_str(&format!("See @/leaf-{i}.md.\n"));
            provider.insert_document(
                &format!("/leaf-{i}.md"),
                &format!("# Leaf {i}\n\nContent {i}.\n"),
            );
        }
        provider.insert_document("/hub.md", &hub);

        let loader = ReferenceLoader::with_limits(LoaderLimits::default().with_max_nodes(3));
        let tree = loader
            .load_references_from_content(&hub, "/hub.md", &provider)
            .await
            .unwrap();

        assert_eq!(flatten_hierarchy(&tree).len(), 3);
    }

    #[tokio::test]
    async fn missing_and_empty_documents_are_skipped() {
        let provider = InMemoryProvider::new();
        provider.insert_document("/real.md", "# Real\n\nBody.\n");
        provider.insert_document("/empty.md", "");

        let loader = ReferenceLoader::new();
        let refs = refs_for("@/real.md plus @/ghost.md and @/empty.md", "/ctx.md");
        let tree = loader.load_references(&refs, &provider).await;

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].path, "/real.md");
    }

    #[tokio::test]
    async fn duplicate_references_load_once() {
        let provider = guide_corpus();
        let loader = ReferenceLoader::new();

        let refs = refs_for("@/api/tokens.md and again @/api/tokens.md", "/guide.md");
        let tree = loader.load_references(&refs, &provider).await;
        assert_eq!(tree.len(), 1);
    }

    #[tokio::test]
    async fn timeout_zero_truncates_everything() {
        let provider = guide_corpus();
        let loader =
            ReferenceLoader::with_limits(LoaderLimits::default().with_timeout(Duration::ZERO));

        let refs = refs_for("@/api/tokens.md", "/guide.md");
        let tree = loader.load_references(&refs, &provider).await;
        assert!(tree.is_empty());
    }

    #[test]
    fn stats_cover_depth_and_namespaces() {
        let tree = vec![HierarchicalContent {
            path: "/api/auth.md#login".into(),
            title: "Login".into(),
            content: "body".into(),
            depth: 1,
            namespace: "api".into(),
            children: vec![HierarchicalContent {
                path: "/guide.md".into(),
                title: "Guide".into(),
                content: "body".into(),
                depth: 2,
                namespace: "root".into(),
                children: Vec::new(),
            }],
        }];

        let stats = hierarchy_stats(&tree);
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.by_namespace.get("api"), Some(&1));
        assert_eq!(stats.by_namespace.get("root"), Some(&1));

        assert_eq!(flatten_hierarchy(&tree).len(), 2);
        assert!(hierarchy_stats(&[]).total_nodes == 0);
    }
}
