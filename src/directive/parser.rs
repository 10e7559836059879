// ABOUTME: Scans generated text for fenced tool directives in either header form.
// ABOUTME: Payloads are returned raw; JSON decoding happens later in the orchestrator.

use std::sync::LazyLock;

use regex::Regex;

/// Colon header line: `tool:NAME` after a fence.
static COLON_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```tool:([A-Za-z0-9_]+)[ \t]*\r?\n").expect("valid regex")
});

/// Space header line: `tool NAME` after a fence.
static SPACE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```tool[ \t]+([A-Za-z0-9_]+)[ \t]*\r?\n").expect("valid regex")
});

/// A line holding nothing but a fence.
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*```+[ \t]*\r?$").expect("valid regex"));

/// Which header spelling a directive used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderSyntax {
    /// `tool:name`
    Colon,
    /// `tool name`
    Space,
}

/// A tool request found in generated text.
///
/// Nothing about it has been checked yet: the tool may not exist and the
/// payload may not be JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Tool name exactly as written in the header.
    pub name: String,
    /// Fence body, trimmed.
    pub payload: String,
    /// Byte offset of the opening fence.
    pub offset: usize,
    /// Byte length of the whole block, fences included.
    pub len: usize,
    pub syntax: HeaderSyntax,
    /// False when the body ran into another header or the end of the text
    /// before a closing fence.
    pub closed: bool,
}

/// All directives in a block of text, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    items: Vec<Directive>,
}

impl Directives {
    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Directive> {
        self.items
    }
}

impl IntoIterator for Directives {
    type Item = Directive;
    type IntoIter = std::vec::IntoIter<Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Directives {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

struct Header {
    name: String,
    offset: usize,
    body_start: usize,
    syntax: HeaderSyntax,
}

fn headers(text: &str, regex: &Regex, syntax: HeaderSyntax) -> impl Iterator<Item = Header> {
    regex.captures_iter(text).filter_map(move |caps| {
        let whole = caps.get(0)?;
        Some(Header {
            name: caps.get(1)?.as_str().to_string(),
            offset: whole.start(),
            body_start: whole.end(),
            syntax,
        })
    })
}

/// Find every directive in `text`, in the order their opening fences appear.
///
/// A body ends at the first line that is only a fence. If another tool
/// header comes first, the block is returned with `closed` unset and
/// scanning resumes at that header, so one broken block never hides the
/// next.
pub fn parse(text: &str) -> Directives {
    let mut found: Vec<Header> = headers(text, &COLON_HEADER, HeaderSyntax::Colon)
        .chain(headers(text, &SPACE_HEADER, HeaderSyntax::Space))
        .collect();
    found.sort_by_key(|h| h.offset);

    let mut items = Vec::with_capacity(found.len());
    let mut consumed = 0;
    for (i, header) in found.iter().enumerate() {
        if header.offset < consumed {
            continue;
        }
        let next_header = found[i + 1..]
            .iter()
            .map(|h| h.offset)
            .find(|&offset| offset >= header.body_start)
            .unwrap_or(text.len());
        let closing = CLOSING_FENCE
            .find_at(text, header.body_start)
            .filter(|fence| fence.start() < next_header);

        let (body_end, end, closed) = match closing {
            Some(fence) => (fence.start(), fence.end(), true),
            None => (next_header, next_header, false),
        };
        items.push(Directive {
            name: header.name.clone(),
            payload: text[header.body_start..body_end].trim().to_string(),
            offset: header.offset,
            len: end - header.offset,
            syntax: header.syntax,
            closed,
        });
        consumed = end;
    }
    Directives { items }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colon_form() {
        let text = "Creating it now.\n```tool:createFile\n{\"path\": \"a.txt\"}\n```\nDone.";
        let found = parse(text);

        assert_eq!(found.len(), 1);
        let d = found.iter().next().unwrap();
        assert_eq!(d.name, "createFile");
        assert_eq!(d.payload, "{\"path\": \"a.txt\"}");
        assert_eq!(d.syntax, HeaderSyntax::Colon);
        assert_eq!(d.offset, text.find("```").unwrap());
    }

    #[test]
    fn test_space_form() {
        let found = parse("```tool readFile\n{\"path\": \"a.txt\"}\n```");
        let d = found.iter().next().unwrap();
        assert_eq!(d.name, "readFile");
        assert_eq!(d.syntax, HeaderSyntax::Space);
    }

    #[test]
    fn test_both_forms_extract_identically() {
        let payload = "{\n  \"query\": \"main\",\n  \"maxResults\": 3\n}";
        let colon = parse(&format!("```tool:fileSearch\n{}\n```", payload));
        let space = parse(&format!("```tool   fileSearch  \n{}\n```", payload));

        let a = colon.iter().next().unwrap();
        let b = space.iter().next().unwrap();
        assert_eq!((&a.name, &a.payload), (&b.name, &b.payload));
    }

    #[test]
    fn test_mixed_forms_keep_source_order() {
        let text = "\
```tool readFile
{\"path\": \"1\"}
```
then
```tool:listDir
{\"path\": \"2\"}
```
and
```tool bash
{\"command\": \"3\"}
```";
        let names: Vec<String> = parse(text).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["readFile", "listDir", "bash"]);
    }

    #[test]
    fn test_malformed_payload_still_extracted() {
        let found = parse("```tool:bash\n{not json\n```");
        assert_eq!(found.iter().next().unwrap().payload, "{not json");
    }

    #[test]
    fn test_crlf_and_empty_body() {
        let found = parse("```tool:listDir\r\n```");
        let d = found.iter().next().unwrap();
        assert_eq!(d.name, "listDir");
        assert_eq!(d.payload, "");
        assert!(d.closed);
    }

    #[test]
    fn test_ignores_other_fences() {
        let text = "```rust\nfn main() {}\n```\n```json\n{\"a\": 1}\n```\n```tool\n{}\n```";
        assert!(parse(text).is_empty());
    }

    #[test]
    fn test_name_must_be_identifier() {
        assert!(parse("```tool:read-file\n{}\n```").is_empty());
        assert!(parse("```tool:readFile extra\n{}\n```").is_empty());
    }

    #[test]
    fn test_inline_backticks_stay_in_body() {
        let text = "```tool:createFile\n{\"path\": \"n.md\", \"content\": \"use ```rust``` here\"}\n```";
        let found = parse(text);
        assert_eq!(
            found.iter().next().unwrap().payload,
            "{\"path\": \"n.md\", \"content\": \"use ```rust``` here\"}"
        );
    }

    #[test]
    fn test_unclosed_block_is_flagged() {
        let found = parse("```tool:bash\n{\"command\": \"ls\"}\n");
        let d = found.iter().next().unwrap();
        assert_eq!(d.name, "bash");
        assert_eq!(d.payload, "{\"command\": \"ls\"}");
        assert!(!d.closed);
    }

    #[test]
    fn test_unclosed_block_does_not_hide_next_directive() {
        let text = "```tool:createFile\n{\"path\":\"a\"}\n\n```tool readFile\n{\"path\":\"b\"}\n```";
        let found = parse(text).into_vec();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "createFile");
        assert_eq!(found[0].payload, "{\"path\":\"a\"}");
        assert!(!found[0].closed);
        assert_eq!(found[0].offset + found[0].len, text.find("```tool readFile").unwrap());

        assert_eq!(found[1].name, "readFile");
        assert_eq!(found[1].payload, "{\"path\":\"b\"}");
        assert!(found[1].closed);
    }

    #[test]
    fn test_closing_fence_must_stand_alone() {
        let text = "```tool:bash\n{\"command\": \"ls\"}\n```text\nstill body\n  ```  \nafter";
        let d = parse(text).into_vec().remove(0);
        assert!(d.closed);
        assert!(d.payload.ends_with("still body"));
        assert!(text[d.offset + d.len..].starts_with("\nafter"));
    }

    #[test]
    fn test_reiterable() {
        let found = parse("```tool:a\n{}\n```\n```tool b\n{}\n```");
        assert_eq!(found.iter().count(), 2);
        assert_eq!((&found).into_iter().count(), 2);
    }
}
