use tree_sitter::Node;

/// Extract text from a node
pub fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Find all children of a specific kind
pub fn children_of_kind<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    let children = node
        .children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect();
    children
}

/// First child of a specific kind
pub fn first_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// All named children, in source order
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

/// Text of every `modifier` child, e.g. `public`, `static`
pub fn modifiers<'a>(node: Node<'a>, source: &'a str) -> Vec<&'a str> {
    children_of_kind(node, "modifier")
        .into_iter()
        .map(|m| node_text(m, source))
        .collect()
}

/// Names of every attribute applied to a declaration, as written
/// (`SerializeField`, `System.Serializable`)
pub fn attribute_names(node: Node<'_>, source: &str) -> Vec<String> {
    children_of_kind(node, "attribute_list")
        .into_iter()
        .flat_map(|list| children_of_kind(list, "attribute"))
        .filter_map(|attr| attr.child_by_field_name("name"))
        .map(|name| node_text(name, source).to_string())
        .collect()
}

/// Whether an attribute name as written refers to `attribute`, allowing a
/// namespace qualifier and the `Attribute` suffix
pub fn is_attribute(written: &str, attribute: &str) -> bool {
    let simple = written.rsplit('.').next().unwrap_or(written);
    let simple = simple.rsplit("::").next().unwrap_or(simple);
    simple == attribute
        || simple
            .strip_suffix("Attribute")
            .is_some_and(|stem| stem == attribute)
}

/// Iterator over all descendant nodes, parents before children
pub fn descendants<'a>(node: Node<'a>) -> impl Iterator<Item = Node<'a>> {
    DescendantIterator::new(node)
}

struct DescendantIterator<'a> {
    cursor: tree_sitter::TreeCursor<'a>,
    done: bool,
}

impl<'a> DescendantIterator<'a> {
    fn new(node: Node<'a>) -> Self {
        Self {
            cursor: node.walk(),
            done: false,
        }
    }
}

impl<'a> Iterator for DescendantIterator<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();

        // Try to go to first child
        if self.cursor.goto_first_child() {
            return Some(node);
        }

        // Try to go to next sibling
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }

            // Go up to parent
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}
