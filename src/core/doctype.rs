//! DOCTYPE declaration reader
//!
//! Reads one `<!DOCTYPE name [external id] [[internal subset]]>` declaration.
//! Format: `<!DOCTYPE name PUBLIC "pubid" "uri">`, `<!DOCTYPE name SYSTEM "uri">`
//! or just `<!DOCTYPE name>`, each optionally followed by `[...]`.
//!
//! The internal subset is captured verbatim and never interpreted.

use super::scanner::Scanner;
use crate::error::{DomError, Result};

/// Fields read from a DOCTYPE declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeDecl {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub internal_subset: Option<String>,
}

/// Reader for a single DOCTYPE declaration
pub struct DoctypeReader<'a> {
    scanner: Scanner<'a>,
    strict: bool,
}

impl<'a> DoctypeReader<'a> {
    /// Lenient reader: keywords in any case, a missing `>` at the end of
    /// input is tolerated, a bare quoted literal is taken as system id
    pub fn new(input: &'a str) -> Self {
        DoctypeReader {
            scanner: Scanner::new(input.as_bytes()),
            strict: false,
        }
    }

    /// Strict reader following the XML 1.0 doctypedecl production
    pub fn new_strict(input: &'a str) -> Self {
        DoctypeReader {
            scanner: Scanner::new(input.as_bytes()),
            strict: true,
        }
    }

    pub fn read(mut self) -> Result<DoctypeDecl> {
        let decl = self.read_decl();
        match &decl {
            Ok(decl) => log::debug!("read DOCTYPE declaration for {:?}", decl.name),
            Err(err) => log::debug!("rejected DOCTYPE declaration: {err}"),
        }
        decl
    }

    fn read_decl(&mut self) -> Result<DoctypeDecl> {
        self.scanner.skip_whitespace();

        if !self.scanner.starts_with(b"<!") {
            return Err(invalid("Expected '<!' at start of declaration"));
        }
        self.scanner.advance(2);
        self.expect_keyword(b"DOCTYPE")?;

        if !self.scanner.skip_whitespace() && self.strict {
            return Err(invalid("Whitespace required after DOCTYPE"));
        }

        let name = match self.scanner.read_name() {
            Some(name) => String::from_utf8_lossy(name).into_owned(),
            None => return Err(invalid("DOCTYPE declaration requires a name")),
        };
        if self.strict && (name == "PUBLIC" || name == "SYSTEM") {
            return Err(invalid(
                "DOCTYPE declaration requires a name (found keyword without name)",
            ));
        }

        let mut decl = DoctypeDecl {
            name,
            ..DoctypeDecl::default()
        };

        self.scanner.skip_whitespace();
        self.read_external_id(&mut decl)?;

        self.scanner.skip_whitespace();
        if self.scanner.peek() == Some(b'[') {
            self.scanner.advance(1);
            let start = self.scanner.position();
            let end = self
                .scanner
                .find_subset_end()
                .ok_or_else(|| invalid("Unterminated internal subset"))?;
            let subset = &self.scanner.remaining()[..end - start];
            decl.internal_subset = Some(String::from_utf8_lossy(subset).into_owned());
            self.scanner.advance(end - start + 1);
            self.scanner.skip_whitespace();
        }

        match self.scanner.peek() {
            Some(b'>') => {
                self.scanner.advance(1);
                Ok(decl)
            }
            None if !self.strict => Ok(decl),
            None => Err(invalid("Unterminated DOCTYPE declaration")),
            Some(_) => Err(invalid("Unexpected content in DOCTYPE declaration")),
        }
    }

    /// Match a keyword, exactly in strict mode and in any case otherwise
    fn expect_keyword(&mut self, keyword: &'static [u8]) -> Result<()> {
        if self.scanner.starts_with(keyword)
            || (!self.strict && self.scanner.starts_with_ignore_case(keyword))
        {
            self.scanner.advance(keyword.len());
            return Ok(());
        }
        if self.scanner.starts_with_ignore_case(keyword) {
            return Err(DomError::InvalidDeclaration(format!(
                "'{}' keyword must be uppercase",
                String::from_utf8_lossy(keyword)
            )));
        }
        Err(DomError::InvalidDeclaration(format!(
            "Expected '{}' keyword",
            String::from_utf8_lossy(keyword)
        )))
    }

    fn read_external_id(&mut self, decl: &mut DoctypeDecl) -> Result<()> {
        if self.scanner.starts_with_ignore_case(b"PUBLIC") {
            self.expect_keyword(b"PUBLIC")?;
            if !self.scanner.skip_whitespace() && self.strict {
                return Err(invalid("Whitespace required after PUBLIC keyword"));
            }
            let public_id = self
                .read_literal()?
                .ok_or_else(|| invalid("PUBLIC keyword requires a public identifier literal"))?;
            if self.strict {
                validate_pubid_literal(&public_id)?;
            }
            decl.public_id = Some(public_id);

            let separated = self.scanner.skip_whitespace();
            if matches!(self.scanner.peek(), Some(b'"' | b'\'')) {
                if self.strict && !separated {
                    return Err(invalid(
                        "Whitespace required between public ID and system literal",
                    ));
                }
                decl.system_id = self.read_literal()?;
            } else if self.strict && self.scanner.peek() != Some(b'[') {
                // XML requires a system literal after a public id
                return Err(invalid("PUBLIC identifier requires a system literal"));
            }
        } else if self.scanner.starts_with_ignore_case(b"SYSTEM") {
            self.expect_keyword(b"SYSTEM")?;
            if !self.scanner.skip_whitespace() && self.strict {
                return Err(invalid("Whitespace required after SYSTEM keyword"));
            }
            let system_id = self
                .read_literal()?
                .ok_or_else(|| invalid("SYSTEM keyword requires a system literal"))?;
            decl.system_id = Some(system_id);
        } else if matches!(self.scanner.peek(), Some(b'"' | b'\'')) {
            if self.strict {
                return Err(invalid(
                    "DOCTYPE external ID requires SYSTEM or PUBLIC keyword before quoted literal",
                ));
            }
            decl.system_id = self.read_literal()?;
        }
        Ok(())
    }

    /// Read a quoted literal; `Ok(None)` when the next byte is no quote
    fn read_literal(&mut self) -> Result<Option<String>> {
        let quote = match self.scanner.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Ok(None),
        };
        self.scanner.advance(1);
        let literal = self
            .scanner
            .read_until(quote)
            .ok_or_else(|| invalid("Unterminated literal in DOCTYPE declaration"))?;
        Ok(Some(String::from_utf8_lossy(literal).into_owned()))
    }
}

fn invalid(message: &str) -> DomError {
    DomError::InvalidDeclaration(message.to_string())
}

/// Validate public ID literal characters.
/// PubidChar ::= #x20 | #xD | #xA | [a-zA-Z0-9] | [-'()+,./:=?;!*#@$_%]
fn validate_pubid_literal(literal: &str) -> Result<()> {
    let valid = literal.bytes().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                b,
                b' ' | b'\r' | b'\n' | b'-' | b'\'' | b'(' | b')' | b'+' | b',' | b'.' | b'/'
                    | b':' | b'=' | b'?' | b';' | b'!' | b'*' | b'#' | b'@' | b'$' | b'_' | b'%'
            )
    });
    if valid {
        Ok(())
    } else {
        Err(invalid("Invalid character in public identifier"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn decl(
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        internal_subset: Option<&str>,
    ) -> DoctypeDecl {
        DoctypeDecl {
            name: name.to_string(),
            public_id: public_id.map(str::to_string),
            system_id: system_id.map(str::to_string),
            internal_subset: internal_subset.map(str::to_string),
        }
    }

    #[rstest]
    #[case("<!DOCTYPE html>", decl("html", None, None, None))]
    #[case("<!doctype html>", decl("html", None, None, None))]
    #[case(
        "<!DOCTYPE html SYSTEM \"about:legacy-compat\">",
        decl("html", None, Some("about:legacy-compat"), None)
    )]
    #[case(
        "<!DOCTYPE html PUBLIC '-//W3C//DTD XHTML 1.0//EN' 'http://www.w3.org/TR/xhtml1/DTD/xhtml1.dtd'>",
        decl(
            "html",
            Some("-//W3C//DTD XHTML 1.0//EN"),
            Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1.dtd"),
            None
        )
    )]
    #[case(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\">",
        decl("html", Some("-//W3C//DTD HTML 4.01//EN"), None, None)
    )]
    #[case(
        "<!DOCTYPE note [<!ENTITY a \"]\">]>",
        decl("note", None, None, Some("<!ENTITY a \"]\">"))
    )]
    #[case("<!DOCTYPE html", decl("html", None, None, None))]
    #[case("<!DOCTYPE html \"legacy.dtd\">", decl("html", None, Some("legacy.dtd"), None))]
    fn test_lenient(#[case] input: &str, #[case] expected: DoctypeDecl) {
        assert_eq!(DoctypeReader::new(input).read(), Ok(expected));
    }

    #[test]
    fn test_strict_full_declaration() {
        let input = "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"svg11.dtd\" [\n  <!ENTITY s 'x'>\n]>";
        assert_eq!(
            DoctypeReader::new_strict(input).read(),
            Ok(decl(
                "svg",
                Some("-//W3C//DTD SVG 1.1//EN"),
                Some("svg11.dtd"),
                Some("\n  <!ENTITY s 'x'>\n")
            ))
        );
    }

    #[rstest]
    #[case("<!doctype html>")]
    #[case("<!DOCTYPEhtml>")]
    #[case("<!DOCTYPE PUBLIC \"x\" \"y\">")]
    #[case("<!DOCTYPE html \"legacy.dtd\">")]
    #[case("<!DOCTYPE html PUBLIC\"x\" \"y\">")]
    #[case("<!DOCTYPE html PUBLIC \"x\"\"y\">")]
    #[case("<!DOCTYPE html PUBLIC \"x\">")]
    #[case("<!DOCTYPE html public \"x\" \"y\">")]
    #[case("<!DOCTYPE html PUBLIC \"{x}\" \"y\">")]
    #[case("<!DOCTYPE html")]
    fn test_strict_rejects(#[case] input: &str) {
        assert!(matches!(
            DoctypeReader::new_strict(input).read(),
            Err(DomError::InvalidDeclaration(_))
        ));
    }

    #[rstest]
    #[case("<html>")]
    #[case("<!DOCTYPE >")]
    #[case("<!DOCTYPE html SYSTEM>")]
    #[case("<!DOCTYPE html SYSTEM \"unterminated>")]
    #[case("<!DOCTYPE html [<!ENTITY a 'b'>")]
    #[case("<!DOCTYPE html junk>")]
    fn test_lenient_rejects(#[case] input: &str) {
        assert!(DoctypeReader::new(input).read().is_err());
    }
}
