//! Type names, default values and string literals.

use schemaplan_core::{Column, ColumnType, DefaultValue, IntegerKind, LobSize, PlanError, Result};

const CURRENT_TIMESTAMP: &str = "current_timestamp";

/// Renders the MySQL name of a column type.
#[must_use]
pub fn format_type(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Bool => "bool".to_string(),
        ColumnType::Integer { kind, unsigned } => {
            let name = match kind {
                IntegerKind::TinyInt => "tinyint",
                IntegerKind::SmallInt => "smallint",
                IntegerKind::MediumInt => "mediumint",
                IntegerKind::Int => "int",
                IntegerKind::BigInt => "bigint",
            };
            with_sign(name.to_string(), *unsigned)
        }
        ColumnType::Decimal {
            precision,
            scale,
            unsigned,
        } => with_sign(format!("decimal({precision},{scale})"), *unsigned),
        ColumnType::Float {
            double,
            precision,
            unsigned,
        } => {
            let name = if *double { "double" } else { "float" };
            with_sign(sized(name, *precision), *unsigned)
        }
        ColumnType::Bit(width) => sized("bit", *width),
        ColumnType::Char(n) => format!("char({n})"),
        ColumnType::Varchar(n) => format!("varchar({n})"),
        ColumnType::Text(size) => format!("{}text", lob_prefix(*size)),
        ColumnType::Binary(n) => format!("binary({n})"),
        ColumnType::Varbinary(n) => format!("varbinary({n})"),
        ColumnType::Blob(size) => format!("{}blob", lob_prefix(*size)),
        ColumnType::Date => "date".to_string(),
        ColumnType::Time(fsp) => sized("time", fsp.map(u32::from)),
        ColumnType::Datetime(fsp) => sized("datetime", fsp.map(u32::from)),
        ColumnType::Timestamp(fsp) => sized("timestamp", fsp.map(u32::from)),
        ColumnType::Year => "year".to_string(),
        ColumnType::Json => "json".to_string(),
        ColumnType::Enum(values) => format!("enum({})", quote_list(values)),
        ColumnType::Set(values) => format!("set({})", quote_list(values)),
        ColumnType::Spatial(name) => name.to_lowercase(),
        ColumnType::Raw(raw) => raw.clone(),
    }
}

fn with_sign(name: String, unsigned: bool) -> String {
    if unsigned {
        format!("{name} unsigned")
    } else {
        name
    }
}

fn sized(name: &str, size: Option<u32>) -> String {
    size.map_or_else(|| name.to_string(), |n| format!("{name}({n})"))
}

const fn lob_prefix(size: LobSize) -> &'static str {
    match size {
        LobSize::Tiny => "tiny",
        LobSize::Regular => "",
        LobSize::Medium => "medium",
        LobSize::Long => "long",
    }
}

fn quote_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| escape(v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders the default value of `c`, quoting it when MySQL would otherwise
/// read it as an expression.
///
/// Literals are left bare for numeric columns and hex values. Raw
/// expressions are also left bare when parenthesized, or when they start
/// with `CURRENT_TIMESTAMP` on a time column. Everything else is quoted.
#[must_use]
pub fn column_default(c: &Column) -> Option<String> {
    let value = match c.default.as_ref()? {
        DefaultValue::Literal(v) => {
            if c.ty.is_numeric() || is_hex(v) {
                v.clone()
            } else {
                quote(v)
            }
        }
        DefaultValue::RawExpr(x) => {
            let bare = is_hex(x)
                || c.ty.is_numeric()
                || (x.starts_with('(') && x.ends_with(')'))
                || (c.ty.is_time() && x.to_lowercase().starts_with(CURRENT_TIMESTAMP));
            if bare {
                x.clone()
            } else {
                quote(x)
            }
        }
    };
    Some(value)
}

/// Returns true for hexadecimal literals such as `0x1F`.
#[must_use]
pub fn is_hex(s: &str) -> bool {
    s.len() > 2 && s.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("0x"))
}

/// Quotes `s` as a string literal, unless it is already quoted.
#[must_use]
pub fn quote(s: &str) -> String {
    if is_quoted(s, '\'') || is_quoted(s, '"') {
        return s.to_string();
    }
    escape(s)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn is_quoted(s: &str, q: char) -> bool {
    s.len() >= 2 && s.starts_with(q) && s.ends_with(q)
}

/// Removes the quotes around a single- or double-quoted string literal.
/// Unquoted text is returned unchanged.
///
/// # Errors
///
/// Returns [`PlanError::InvalidQuoted`] on a malformed escape sequence or an
/// unescaped quote inside the literal.
pub fn unquote(s: &str) -> Result<String> {
    let q = if is_quoted(s, '\'') {
        '\''
    } else if is_quoted(s, '"') {
        '"'
    } else {
        return Ok(s.to_string());
    };
    let invalid = || PlanError::InvalidQuoted(s.to_string());
    let mut out = String::with_capacity(s.len());
    let mut chars = s[1..s.len() - 1].chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = match chars.next().ok_or_else(invalid)? {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    c @ ('\\' | '\'' | '"') => c,
                    _ => return Err(invalid()),
                };
                out.push(escaped);
            }
            c if c == q => {
                if chars.next_if_eq(&q).is_none() {
                    return Err(invalid());
                }
                out.push(q);
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Normalizes comment text into a single-quoted literal.
#[must_use]
pub fn comment(text: &str) -> String {
    unquote(text).map_or_else(|_| quote(text), |raw| quote(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> ColumnType {
        ColumnType::Integer {
            kind: IntegerKind::Int,
            unsigned: false,
        }
    }

    #[test]
    fn test_format_type() {
        assert_eq!(format_type(&int()), "int");
        assert_eq!(
            format_type(&ColumnType::Integer {
                kind: IntegerKind::BigInt,
                unsigned: true,
            }),
            "bigint unsigned"
        );
        assert_eq!(
            format_type(&ColumnType::Decimal {
                precision: 10,
                scale: 2,
                unsigned: false,
            }),
            "decimal(10,2)"
        );
        assert_eq!(
            format_type(&ColumnType::Float {
                double: true,
                precision: None,
                unsigned: false,
            }),
            "double"
        );
        assert_eq!(format_type(&ColumnType::Varchar(255)), "varchar(255)");
        assert_eq!(format_type(&ColumnType::Text(LobSize::Long)), "longtext");
        assert_eq!(format_type(&ColumnType::Blob(LobSize::Regular)), "blob");
        assert_eq!(format_type(&ColumnType::Timestamp(Some(6))), "timestamp(6)");
        assert_eq!(format_type(&ColumnType::Datetime(None)), "datetime");
        assert_eq!(
            format_type(&ColumnType::Enum(vec!["a".into(), "it's".into()])),
            "enum('a','it''s')"
        );
        assert_eq!(format_type(&ColumnType::Spatial("POINT".into())), "point");
    }

    #[test]
    fn test_literal_defaults() {
        let c = Column::new("n", int()).default_literal("5");
        assert_eq!(column_default(&c).as_deref(), Some("5"));

        let c = Column::new("s", ColumnType::Varchar(16)).default_literal("active");
        assert_eq!(column_default(&c).as_deref(), Some("'active'"));

        let c = Column::new("b", ColumnType::Varbinary(4)).default_literal("0xFF");
        assert_eq!(column_default(&c).as_deref(), Some("0xFF"));

        let c = Column::new("s", ColumnType::Varchar(16)).default_literal("'done'");
        assert_eq!(column_default(&c).as_deref(), Some("'done'"));

        assert_eq!(column_default(&Column::new("x", int())), None);
    }

    #[test]
    fn test_raw_defaults() {
        let c = Column::new("id", ColumnType::Varchar(36)).default_expr("(UUID())");
        assert_eq!(column_default(&c).as_deref(), Some("(UUID())"));

        let c = Column::new("at", ColumnType::Timestamp(None)).default_expr("CURRENT_TIMESTAMP");
        assert_eq!(column_default(&c).as_deref(), Some("CURRENT_TIMESTAMP"));

        let c = Column::new("at", ColumnType::Datetime(Some(3)))
            .default_expr("current_timestamp(3)");
        assert_eq!(column_default(&c).as_deref(), Some("current_timestamp(3)"));

        // Not a time column, so the expression is read as a literal.
        let c = Column::new("s", ColumnType::Varchar(32)).default_expr("CURRENT_TIMESTAMP");
        assert_eq!(column_default(&c).as_deref(), Some("'CURRENT_TIMESTAMP'"));

        let c = Column::new("n", int()).default_expr("1");
        assert_eq!(column_default(&c).as_deref(), Some("1"));
    }

    #[test]
    fn test_is_hex() {
        assert!(is_hex("0x1F"));
        assert!(is_hex("0XAB"));
        assert!(!is_hex("0x"));
        assert!(!is_hex("x'1F'"));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("hello"), "'hello'");
        assert_eq!(quote("it's"), "'it''s'");
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(quote("'already'"), "'already'");
        assert_eq!(quote("\"double\""), "\"double\"");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("plain").unwrap(), "plain");
        assert_eq!(unquote("'it''s'").unwrap(), "it's");
        assert_eq!(unquote(r#""say \"hi\"""#).unwrap(), r#"say "hi""#);
        assert_eq!(unquote(r"'a\\b'").unwrap(), r"a\b");
        assert!(unquote(r"'bad\q'").is_err());
        assert!(unquote("'a'b'").is_err());
    }

    #[test]
    fn test_unquote_inverts_quote() {
        for s in ["", "plain", "it's", r"back\slash", "mixed ' and \\"] {
            assert_eq!(unquote(&quote(s)).unwrap(), s);
        }
    }

    #[test]
    fn test_comment() {
        assert_eq!(comment("user accounts"), "'user accounts'");
        assert_eq!(comment("\"user accounts\""), "'user accounts'");
        assert_eq!(comment("'it''s'"), "'it''s'");
        assert_eq!(comment(r#""bad\q""#), r#""bad\q""#);
    }
}
