//! Markup serialization
//!
//! Writes any node back out as markup. Text and attribute values are
//! escaped; document type nodes use their own non-escaping format.

use super::document::Document;
use super::node::{NodeData, NodeId};

impl Document {
    /// Serialize a node and its subtree. Unknown ids produce an empty string.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize only the children of a node
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children_of(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Writes a subtree from a work stack so depth is not bounded by the
    /// call stack
    fn write_node(&self, id: NodeId, out: &mut String) {
        let mut pending = vec![Step::Open(id)];

        while let Some(step) = pending.pop() {
            let id = match step {
                Step::Open(id) => id,
                Step::Close(name) => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                    continue;
                }
            };
            let Some(node) = self.get_node(id) else {
                continue;
            };

            match node.data() {
                NodeData::Document => {
                    pending.extend(node.children().iter().rev().map(|&c| Step::Open(c)));
                }
                NodeData::DocumentType(doctype) => out.push_str(&doctype.to_html(node.name())),
                NodeData::Element { attributes } => {
                    out.push('<');
                    out.push_str(node.name());
                    for attr in attributes {
                        out.push(' ');
                        out.push_str(&attr.name);
                        out.push_str("=\"");
                        out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
                        out.push('"');
                    }
                    out.push('>');
                    pending.push(Step::Close(node.name()));
                    pending.extend(node.children().iter().rev().map(|&c| Step::Open(c)));
                }
                NodeData::Text(content) => out.push_str(&html_escape::encode_text(content)),
                NodeData::CData(content) => {
                    out.push_str("<![CDATA[");
                    out.push_str(content);
                    out.push_str("]]>");
                }
                NodeData::Comment(content) => {
                    out.push_str("<!--");
                    out.push_str(content);
                    out.push_str("-->");
                }
                NodeData::ProcessingInstruction(data) => {
                    out.push_str("<?");
                    out.push_str(node.name());
                    if !data.is_empty() {
                        out.push(' ');
                        out.push_str(data);
                    }
                    out.push_str("?>");
                }
            }
        }
    }
}

enum Step<'a> {
    Open(NodeId),
    Close(&'a str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_document() {
        let mut doc = Document::new();
        let doctype = doc.create_document_type("html");
        let html = doc.create_element("html");
        let body = doc.create_element("body");
        let text = doc.create_text("a < b & c");
        let comment = doc.create_comment(" note ");
        doc.append_child(Document::ROOT, doctype).unwrap();
        doc.append_child(Document::ROOT, html).unwrap();
        doc.append_child(html, body).unwrap();
        doc.append_child(body, text).unwrap();
        doc.append_child(body, comment).unwrap();
        doc.set_attribute(body, "class", "x\"y").unwrap();

        assert_eq!(
            doc.to_html(Document::ROOT),
            "<!DOCTYPE html ><html><body class=\"x&quot;y\">a &lt; b &amp; c<!-- note --></body></html>"
        );
        assert_eq!(doc.inner_html(html), doc.to_html(body));
    }

    #[test]
    fn test_doctype_identifiers_not_escaped() {
        let mut doc = Document::new();
        let doctype = doc.create_document_type("html");
        doc.document_type_mut(doctype)
            .unwrap()
            .set_system_identifier(Some("a\"<b".to_string()));
        assert_eq!(doc.to_html(doctype), "<!DOCTYPE html SYSTEM \"a\"<b\">");
    }

    #[test]
    fn test_cdata_and_pi() {
        let mut doc = Document::new();
        let root = doc.create_element("r");
        let cdata = doc.create_cdata("x < y");
        let pi = doc.create_processing_instruction("target", "");
        doc.append_child(root, cdata).unwrap();
        doc.append_child(root, pi).unwrap();
        assert_eq!(doc.to_html(root), "<r><![CDATA[x < y]]><?target?></r>");
    }

    #[test]
    fn test_deep_chain() {
        const DEPTH: usize = 100_000;
        let mut doc = Document::new();
        let mut top = doc.create_element("e");
        for _ in 1..DEPTH {
            let parent = doc.create_element("e");
            doc.append_child(parent, top).unwrap();
            top = parent;
        }

        let html = doc.to_html(top);
        assert_eq!(html.len(), DEPTH * "<e></e>".len());
        assert!(html.starts_with("<e><e>"));
        assert!(html.ends_with("</e></e>"));
    }

    #[test]
    fn test_unknown_node_is_empty() {
        let doc = Document::new();
        assert_eq!(doc.to_html(7), "");
    }
}
