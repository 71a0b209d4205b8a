/// One parsed unit of a template: either literal text emitted verbatim, or a
/// `{{type}}`/`{{type:name}}` variable resolved at render time against gathered
/// fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Literal(String),
    Variable { type_tag: String, name: Option<String> },
}

/// A parsed template. Cheap to clone; holds the section list only.
#[derive(Debug, Clone)]
pub struct Template {
    pub sections: Vec<Section>,
}

/// Parse a template string into an ordered section list.
///
/// Whitespace-only literal sections are pruned — a template that's all
/// placeholders separated by newlines doesn't emit empty system messages between
/// them.
pub fn parse(template: &str) -> Template {
    let mut sections = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let literal = &rest[..start];
        if !literal.trim().is_empty() {
            sections.push(Section::Literal(literal.to_string()));
        }

        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            // Unterminated placeholder: treat the rest as literal text, matching
            // the teacher's lenient style of not hard-failing on malformed input.
            sections.push(Section::Literal(rest[start..].to_string()));
            rest = "";
            break;
        };

        let inner = after_open[..end].trim();
        let (type_tag, name) = match inner.split_once(':') {
            Some((t, n)) => (t.trim().to_string(), Some(n.trim().to_string())),
            None => (inner.to_string(), None),
        };
        sections.push(Section::Variable { type_tag, name });

        rest = &after_open[end + 2..];
    }

    if !rest.trim().is_empty() {
        sections.push(Section::Literal(rest.to_string()));
    }

    Template { sections }
}
