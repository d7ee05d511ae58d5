//! Line scanner shared by the mesh and material parsers.

use crate::error::{ParseError, ParseResult};

/// One whitespace-tokenized source line.
pub(crate) struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    text: &'a str,
    tokens: Vec<&'a str>,
}

/// Iterates a document line by line. Handles both `\n` and `\r\n`.
pub(crate) fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.lines().enumerate().map(|(i, raw)| Line::new(i + 1, raw))
}

impl<'a> Line<'a> {
    fn new(number: usize, raw: &'a str) -> Self {
        let text = raw.trim();
        Self {
            number,
            text,
            tokens: text.split_whitespace().collect(),
        }
    }

    /// First token, the record kind.
    #[inline]
    pub fn tag(&self) -> Option<&'a str> {
        self.tokens.first().copied()
    }

    /// Tokens after the tag.
    #[inline]
    pub fn args(&self) -> &[&'a str] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        self.text.starts_with('#')
    }

    /// Reads the first `N` arguments as finite floats. Extra arguments are ignored.
    pub fn floats<const N: usize>(
        &self,
        document: &str,
        expected: &'static str,
    ) -> ParseResult<[f32; N]> {
        let args = self.args();
        if args.len() < N {
            return Err(self.malformed(document, expected));
        }

        let mut out = [0.0f32; N];
        for (slot, token) in out.iter_mut().zip(args) {
            *slot = token
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| self.malformed(document, expected))?;
        }
        Ok(out)
    }

    pub fn malformed(&self, document: &str, expected: &'static str) -> ParseError {
        ParseError::Malformed {
            document: document.to_owned(),
            line: self.number,
            expected,
            found: self.text.to_owned(),
        }
    }
}
