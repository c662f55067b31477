//! Minimal in-memory GraphML writer.
//!
//! Exports write to a `String` only; callers decide whether anything
//! reaches a file.

/// Incremental GraphML document builder with typed node and edge
/// attribute keys.
pub struct GraphMlWriter {
    directed: bool,
    keys: Vec<Key>,
    nodes: Vec<Element>,
    edges: Vec<Element>,
}

struct Key {
    id: String,
    target: &'static str,
    name: String,
    attr_type: &'static str,
}

struct Element {
    // "id" for nodes, "source target" pair for edges
    head: String,
    data: Vec<(String, String)>,
}

impl GraphMlWriter {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            keys: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Declares a node attribute; `attr_type` is a GraphML type name such
    /// as `"string"` or `"double"`.
    pub fn register_node_key(&mut self, name: &str, attr_type: &'static str) {
        self.register_key(name, "node", attr_type);
    }

    /// Declares an edge attribute.
    pub fn register_edge_key(&mut self, name: &str, attr_type: &'static str) {
        self.register_key(name, "edge", attr_type);
    }

    fn register_key(&mut self, name: &str, target: &'static str, attr_type: &'static str) {
        let id = format!("d{}", self.keys.len());
        self.keys.push(Key {
            id,
            target,
            name: name.to_string(),
            attr_type,
        });
    }

    pub fn add_node(&mut self, id: &str, attributes: &[(&str, String)]) {
        self.nodes.push(Element {
            head: format!("<node id=\"{}\">", escape(id)),
            data: self.resolve(attributes),
        });
    }

    pub fn add_edge(&mut self, source: &str, target: &str, attributes: &[(&str, String)]) {
        self.edges.push(Element {
            head: format!(
                "<edge source=\"{}\" target=\"{}\">",
                escape(source),
                escape(target)
            ),
            data: self.resolve(attributes),
        });
    }

    fn resolve(&self, attributes: &[(&str, String)]) -> Vec<(String, String)> {
        attributes
            .iter()
            .map(|(name, value)| {
                let key = self
                    .keys
                    .iter()
                    .find(|key| key.name == *name)
                    .unwrap_or_else(|| panic!("unregistered graphml attribute: {}", name));
                (key.id.clone(), escape(value))
            })
            .collect()
    }

    /// Renders the document.
    pub fn finish(self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
        for key in &self.keys {
            out.push_str(&format!(
                "  <key id=\"{}\" for=\"{}\" attr.name=\"{}\" attr.type=\"{}\"/>\n",
                key.id,
                key.target,
                escape(&key.name),
                key.attr_type
            ));
        }
        out.push_str(&format!(
            "  <graph edgedefault=\"{}\">\n",
            if self.directed { "directed" } else { "undirected" }
        ));
        for element in self.nodes.iter().chain(self.edges.iter()) {
            out.push_str("    ");
            out.push_str(&element.head);
            if element.data.is_empty() {
                // Collapse the opening tag into a self-closing one.
                out.truncate(out.len() - 1);
                out.push_str("/>\n");
                continue;
            }
            out.push('\n');
            for (key_id, value) in &element.data {
                out.push_str(&format!("      <data key=\"{}\">{}</data>\n", key_id, value));
            }
            out.push_str(if element.head.starts_with("<node") {
                "    </node>\n"
            } else {
                "    </edge>\n"
            });
        }
        out.push_str("  </graph>\n");
        out.push_str("</graphml>\n");
        out
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
