use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::err::{DrcError, Result};

// Small S-expression nodes used for approval keys. Identity is the
// canonical text form: UTF-8, LF line endings, one child per line at the
// top level, children sorted by their rendered text, atoms quoted only
// when they contain whitespace, parentheses or quotes.
#[derive(Debug, Clone)]
pub enum Child {
    Atom(String),
    Node(Sexpr),
}

#[derive(Debug, Clone)]
pub struct Sexpr {
    name: String,
    children: Vec<Child>,
}

impl Sexpr {
    pub fn node(name: &str) -> Self {
        Self { name: name.to_string(), children: Vec::new() }
    }

    pub fn with_atom(mut self, atom: impl fmt::Display) -> Self {
        self.children.push(Child::Atom(atom.to_string()));
        self
    }

    pub fn with_node(mut self, node: Sexpr) -> Self {
        self.children.push(Child::Node(node));
        self
    }

    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Sexpr>) -> Self {
        self.children.extend(nodes.into_iter().map(Child::Node));
        self
    }

    // Single-entry node, the common "(key value)" form.
    pub fn entry(name: &str, value: impl fmt::Display) -> Self {
        Self::node(name).with_atom(value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    // Canonical text form; the comparison key for approvals.
    pub fn canonical(&self) -> String {
        let mut lines: Vec<String> = self.children.iter().map(render_child).collect();
        lines.sort_unstable();
        let mut out = String::from("(");
        out.push_str(&quote_atom(&self.name));
        for line in &lines {
            out.push_str("\n ");
            out.push_str(line);
        }
        out.push_str("\n)");
        out
    }

    pub fn parse(text: &str) -> Result<Sexpr> {
        let toks = lex(text)?;
        let mut idx = 0;
        let node = parse_node(&toks, &mut idx)?;
        if idx != toks.len() {
            return Err(DrcError::Runtime("trailing tokens after s-expression".to_string()));
        }
        Ok(node)
    }
}

impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl PartialEq for Sexpr {
    fn eq(&self, o: &Self) -> bool {
        self.canonical() == o.canonical()
    }
}

impl Eq for Sexpr {}

impl PartialOrd for Sexpr {
    fn partial_cmp(&self, o: &Self) -> Option<Ordering> {
        Some(self.cmp(o))
    }
}

impl Ord for Sexpr {
    fn cmp(&self, o: &Self) -> Ordering {
        self.canonical().cmp(&o.canonical())
    }
}

impl Hash for Sexpr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

fn render_child(c: &Child) -> String {
    match c {
        Child::Atom(a) => quote_atom(a),
        Child::Node(n) => render_inline(n),
    }
}

// Nested nodes render on one line with sorted children.
fn render_inline(n: &Sexpr) -> String {
    let mut parts: Vec<String> = n.children.iter().map(render_child).collect();
    parts.sort_unstable();
    let mut out = String::from("(");
    out.push_str(&quote_atom(&n.name));
    for p in &parts {
        out.push(' ');
        out.push_str(p);
    }
    out.push(')');
    out
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'))
}

fn quote_atom(s: &str) -> String {
    if !needs_quotes(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Lparen,
    Rparen,
    Atom(String),
}

fn lex(text: &str) -> Result<Vec<Tok>> {
    let data: Vec<char> = text.chars().collect();
    let mut toks = Vec::new();
    let mut idx = 0;
    while idx < data.len() {
        let c = data[idx];
        idx += 1;
        match c {
            '(' => toks.push(Tok::Lparen),
            ')' => toks.push(Tok::Rparen),
            '"' => {
                let mut atom = String::new();
                loop {
                    let Some(&n) = data.get(idx) else {
                        return Err(DrcError::Runtime("unterminated quoted atom".to_string()));
                    };
                    idx += 1;
                    match n {
                        '"' => break,
                        '\\' => {
                            let Some(&e) = data.get(idx) else {
                                return Err(DrcError::Runtime(
                                    "unterminated escape in quoted atom".to_string(),
                                ));
                            };
                            idx += 1;
                            atom.push(e);
                        }
                        _ => atom.push(n),
                    }
                }
                toks.push(Tok::Atom(atom));
            }
            c if c.is_whitespace() => {}
            _ => {
                let mut atom = String::new();
                atom.push(c);
                while let Some(&n) = data.get(idx) {
                    if n.is_whitespace() || n == '(' || n == ')' || n == '"' {
                        break;
                    }
                    atom.push(n);
                    idx += 1;
                }
                toks.push(Tok::Atom(atom));
            }
        }
    }
    Ok(toks)
}

fn parse_node(toks: &[Tok], idx: &mut usize) -> Result<Sexpr> {
    match toks.get(*idx) {
        Some(Tok::Lparen) => *idx += 1,
        _ => return Err(DrcError::Runtime("expected '('".to_string())),
    }
    let name = match toks.get(*idx) {
        Some(Tok::Atom(a)) => {
            *idx += 1;
            a.clone()
        }
        _ => return Err(DrcError::Runtime("expected node name".to_string())),
    };
    let mut node = Sexpr::node(&name);
    loop {
        match toks.get(*idx) {
            Some(Tok::Rparen) => {
                *idx += 1;
                return Ok(node);
            }
            Some(Tok::Atom(a)) => {
                *idx += 1;
                node.children.push(Child::Atom(a.clone()));
            }
            Some(Tok::Lparen) => {
                let child = parse_node(toks, idx)?;
                node.children.push(Child::Node(child));
            }
            None => return Err(DrcError::Runtime("unexpected end of s-expression".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_sorts_children() {
        let a = Sexpr::node("approved")
            .with_atom("clearance")
            .with_node(Sexpr::entry("net2", "b"))
            .with_node(Sexpr::entry("net1", "a"));
        let b = Sexpr::node("approved")
            .with_atom("clearance")
            .with_node(Sexpr::entry("net1", "a"))
            .with_node(Sexpr::entry("net2", "b"));
        assert_eq!(a, b);
        assert_eq!(a.canonical(), "(approved\n clearance\n (net1 a)\n (net2 b)\n)");
    }

    #[test]
    fn test_round_trip_is_identity() {
        let key = Sexpr::node("approved")
            .with_atom("forbidden_slot")
            .with_node(Sexpr::entry("device", "7f8c"))
            .with_node(Sexpr::node("hole").with_atom("1f2e").with_atom("odd atom"));
        let text = key.canonical();
        let parsed = Sexpr::parse(&text).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.canonical(), text);
    }

    #[test]
    fn test_quoting() {
        let n = Sexpr::node("msg").with_atom("two words").with_atom("par(en");
        let text = n.canonical();
        assert!(text.contains("\"two words\""));
        assert!(text.contains("\"par(en\""));
        assert_eq!(Sexpr::parse(&text).unwrap().canonical(), text);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Sexpr::parse("(unclosed").is_err());
        assert!(Sexpr::parse("atom-only").is_err());
        assert!(Sexpr::parse("(a) trailing").is_err());
        assert!(Sexpr::parse("(\"bad name").is_err());
    }

    #[test]
    fn test_ord_and_set_membership() {
        use std::collections::BTreeSet;
        let mut set = BTreeSet::new();
        set.insert(Sexpr::node("approved").with_atom("x"));
        assert!(set.contains(&Sexpr::parse("(approved\n x\n)").unwrap()));
        assert!(!set.contains(&Sexpr::node("approved").with_atom("y")));
    }
}
