use super::{Document, Node, NodeId};

const LOREM: &[&str] = &[
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "enim",
    "minim",
    "veniam",
    "quis",
    "nostrud",
];

/// Builds flat documents of leaf blocks, each holding a single text leaf.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, kind: &str, text: &str) -> Self {
        self.document.append_leaf_block(kind, text);
        self
    }

    pub fn heading(self, text: &str) -> Self {
        self.block("heading", text)
    }

    pub fn paragraph(self, text: &str) -> Self {
        self.block("paragraph", text)
    }

    pub fn build(self) -> Document {
        self.document
    }
}

impl Document {
    /// Append a block element with one text child to the root.
    pub(crate) fn append_leaf_block(&mut self, kind: &str, text: &str) -> NodeId {
        let root = self.root;
        let block = self.append_unchecked(root, Node::element(kind));
        self.append_unchecked(block, Node::text(text));
        block
    }

    /// Append to a parent already known to be a live element.
    fn append_unchecked(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        self.parents.insert(id, parent);
        if let Some(Some(Node::Element(element))) = self.nodes.get_mut(parent.0) {
            self.sibling_indices.insert(id, element.children.len());
            element.children.push(id);
        }
        id
    }
}

/// Generate the stress-test document: `headings` headings, each followed by
/// `paragraphs` paragraphs of filler text. Output is deterministic.
pub fn generate_huge_document(headings: usize, paragraphs: usize) -> Document {
    let mut builder = DocumentBuilder::new();
    let mut seed = 0usize;

    for h in 0..headings {
        builder = builder.heading(&format!("{} {}", h + 1, lorem(&mut seed, 6)));
        for _ in 0..paragraphs {
            builder = builder.paragraph(&lorem(&mut seed, 40));
        }
    }

    builder.build()
}

fn lorem(seed: &mut usize, words: usize) -> String {
    let mut out = Vec::with_capacity(words);
    for _ in 0..words {
        *seed = seed.wrapping_mul(31).wrapping_add(7) % 9973;
        out.push(LOREM[*seed % LOREM.len()]);
    }
    out.join(" ")
}

/// Import plain text: blank-line separated blocks become paragraphs, blocks
/// starting with `#` become headings. Lines inside a block are joined with a
/// single space.
pub fn parse_plain_text(source: &str) -> Document {
    let mut builder = DocumentBuilder::new();
    let mut current: Vec<&str> = Vec::new();

    for line in source.lines().chain(std::iter::once("")) {
        let line = line.trim();
        if !line.is_empty() {
            current.push(line);
            continue;
        }
        if current.is_empty() {
            continue;
        }

        let joined = current.join(" ");
        builder = match joined.strip_prefix('#') {
            Some(rest) => builder.heading(rest.trim_start_matches('#').trim()),
            None => builder.paragraph(&joined),
        };
        current.clear();
    }

    builder.build()
}
