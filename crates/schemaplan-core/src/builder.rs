//! Incremental SQL statement builder.
//!
//! [`Builder`] appends keywords, quoted identifiers and parenthesized groups
//! to a single buffer, taking care of the whitespace between them. Cloning a
//! builder yields an independent copy, which lets a planner build a forward
//! statement and its reverse from the same prefix.

use std::fmt;

/// SQL statement buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builder {
    buf: String,
    quote: char,
}

impl Builder {
    /// Creates an empty builder quoting identifiers with `quote`.
    #[must_use]
    pub const fn new(quote: char) -> Self {
        Self {
            buf: String::new(),
            quote,
        }
    }

    /// Creates a builder starting with `phrase`.
    #[must_use]
    pub fn build(quote: char, phrase: &str) -> Self {
        let mut b = Self::new(quote);
        b.p(phrase);
        b
    }

    /// Appends a keyword or phrase.
    pub fn p(&mut self, phrase: &str) -> &mut Self {
        self.sep();
        self.buf.push_str(phrase);
        self
    }

    /// Appends a quoted identifier.
    pub fn ident(&mut self, name: &str) -> &mut Self {
        self.sep();
        self.push_quoted(name);
        self
    }

    /// Appends a table name, qualified with its schema when one is given.
    pub fn table(&mut self, schema: Option<&str>, name: &str) -> &mut Self {
        self.sep();
        if let Some(schema) = schema.filter(|s| !s.is_empty()) {
            self.push_quoted(schema);
            self.buf.push('.');
        }
        self.push_quoted(name);
        self
    }

    /// Appends a comma directly after the previous token.
    pub fn comma(&mut self) -> &mut Self {
        self.trim_end();
        self.buf.push(',');
        self
    }

    /// Appends a parenthesized group whose content is written by `f`.
    pub fn wrap<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.sep();
        self.buf.push('(');
        f(self);
        self.trim_end();
        self.buf.push(')');
        self
    }

    /// Writes every item with `f`, separating them with commas.
    pub fn map_comma<T, F>(&mut self, items: &[T], mut f: F) -> &mut Self
    where
        F: FnMut(&T, &mut Self),
    {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            f(item, self);
        }
        self
    }

    /// Appends `text` verbatim, without a separator.
    pub fn raw(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self
    }

    /// Returns the statement built so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the builder and returns the statement.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }

    fn sep(&mut self) {
        match self.buf.chars().last() {
            None | Some(' ' | '(') => {}
            Some(_) => self.buf.push(' '),
        }
    }

    fn trim_end(&mut self) {
        let len = self.buf.trim_end_matches(' ').len();
        self.buf.truncate(len);
    }

    fn push_quoted(&mut self, name: &str) {
        self.buf.push(self.quote);
        for c in name.chars() {
            if c == self.quote {
                self.buf.push(c);
            }
            self.buf.push(c);
        }
        self.buf.push(self.quote);
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}
