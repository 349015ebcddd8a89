//! Text level rewriting of `CREATE TABLE` statements.
//!
//! Used to emulate column renames, column drops and column redefinitions on databases that
//! cannot alter a column in place: the stored table definition is rewritten here and the
//! caller replays the data through the new shape. Everything in this module is pure.

use crate::{DdlError, Record, collapse_whitespace};

/// Intended change to one column of a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite<'a> {
    Rename { from: &'a str, to: &'a str },
    Drop(&'a str),
    /// Swap the whole column definition, constraints are left untouched.
    Replace { column: &'a str, definition: &'a str },
}

impl Rewrite<'_> {
    pub fn column(&self) -> &str {
        match self {
            Rewrite::Rename { from, .. } => from,
            Rewrite::Drop(column) => column,
            Rewrite::Replace { column, .. } => column,
        }
    }

    /// Applies the change to a row read from the original table.
    pub fn map_row(&self, mut record: Record) -> Record {
        match self {
            Rewrite::Rename { from, to } => {
                if let Some(key) = find_key(&record, from) {
                    if let Some(value) = record.remove(&key) {
                        record.insert((*to).into(), value);
                    }
                }
            }
            Rewrite::Drop(column) => {
                if let Some(key) = find_key(&record, column) {
                    record.remove(&key);
                }
            }
            Rewrite::Replace { .. } => {}
        }
        record
    }
}

fn find_key(record: &Record, column: &str) -> Option<String> {
    record
        .keys()
        .find(|k| k.eq_ignore_ascii_case(column))
        .cloned()
}

/// A `CREATE TABLE` statement split around its name and its outer parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    head: String,
    name: String,
    quote: Option<char>,
    between: String,
    body: String,
    tail: String,
}

impl CreateTable {
    pub fn parse(sql: &str) -> Result<Self, DdlError> {
        let one_line = collapse_whitespace(sql);
        let one_line = one_line.trim();
        let invalid = || DdlError::NoColumnDefinitions(one_line.to_string());
        let lower = one_line.to_ascii_lowercase();
        let mut position = keyword(&lower, 0, "create").ok_or_else(invalid)?;
        position = keyword(&lower, position, "table").ok_or_else(invalid)?;
        if let Some(after) = keyword(&lower, position, "if")
            .and_then(|v| keyword(&lower, v, "not"))
            .and_then(|v| keyword(&lower, v, "exists"))
        {
            position = after;
        }
        let head = one_line[..position].to_string();
        let rest = &one_line[position..];
        let Some(Piece::Identifier { text, name, quote }) = next_piece(rest) else {
            return Err(invalid());
        };
        let rest = &rest[text.len()..];
        let open = rest.find('(').ok_or_else(invalid)?;
        let close = rest.rfind(')').ok_or_else(invalid)?;
        if close < open || !rest[..open].trim().is_empty() {
            return Err(invalid());
        }
        let body = rest[open + 1..close].trim();
        if body.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            head,
            name,
            quote,
            between: rest[..open].to_string(),
            body: body.to_string(),
            tail: rest[close + 1..].to_string(),
        })
    }

    /// Unquoted table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text between the outer parentheses.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Top level column and constraint clauses.
    pub fn clauses(&self) -> Vec<String> {
        split_clauses(&self.body)
    }

    /// Same statement with other clauses.
    pub fn with_clauses(&self, clauses: &[String]) -> String {
        self.render(&quote_like(&self.name, self.quote), &clauses.join(", "))
    }

    /// Same statement creating a table with another name, in the original quoting style.
    pub fn renamed(&self, name: &str) -> String {
        self.render(&quote_like(name, self.quote), &self.body)
    }

    fn render(&self, name: &str, body: &str) -> String {
        format!(
            "{}{}{}({}){}",
            self.head, name, self.between, body, self.tail
        )
    }
}

/// Position right after `word` and the following spaces, when `lower[from..]` starts with it.
fn keyword(lower: &str, from: usize, word: &str) -> Option<usize> {
    let rest = &lower[from..];
    if !rest.starts_with(word) {
        return None;
    }
    let after = &rest[word.len()..];
    if after.chars().next().is_some_and(is_identifier_char) {
        return None;
    }
    Some(from + word.len() + (after.len() - after.trim_start().len()))
}

/// Splits a column list on top level commas. Parentheses and quoted text are never split.
pub fn split_clauses(body: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for c in body.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            current.push(c);
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '[' => quote = Some(']'),
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                push_trimmed(&mut result, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_trimmed(&mut result, &current);
    result
}

fn push_trimmed(result: &mut Vec<String>, value: &str) {
    let value = collapse_whitespace(value.trim());
    if !value.is_empty() {
        result.push(value);
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Piece of SQL text: an identifier (quoted or bare word) or anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'s> {
    Identifier {
        text: &'s str,
        name: String,
        quote: Option<char>,
    },
    Other(&'s str),
}

impl<'s> Piece<'s> {
    fn text(&self) -> &'s str {
        match self {
            Piece::Identifier { text, .. } | Piece::Other(text) => text,
        }
    }
}

fn next_piece(text: &str) -> Option<Piece<'_>> {
    let first = text.chars().next()?;
    let close = match first {
        '"' | '`' | '\'' => Some(first),
        '[' => Some(']'),
        _ => None,
    };
    if let Some(close) = close {
        let mut name = String::new();
        let mut chars = text.char_indices().skip(1).peekable();
        while let Some((i, c)) = chars.next() {
            if c == close {
                if close != ']' && chars.peek().is_some_and(|(_, n)| *n == close) {
                    name.push(c);
                    chars.next();
                    continue;
                }
                return Some(Piece::Identifier {
                    text: &text[..i + 1],
                    name,
                    quote: Some(first),
                });
            }
            name.push(c);
        }
        return Some(Piece::Other(text));
    }
    let end = text
        .char_indices()
        .find(|(_, c)| !is_identifier_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    if end > 0 {
        return Some(Piece::Identifier {
            text: &text[..end],
            name: text[..end].to_string(),
            quote: None,
        });
    }
    let end = text
        .char_indices()
        .skip(1)
        .find(|(_, c)| is_identifier_char(*c) || matches!(c, '"' | '`' | '\'' | '['))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    Some(Piece::Other(&text[..end]))
}

fn pieces(mut text: &str) -> Vec<Piece<'_>> {
    let mut result = Vec::new();
    while let Some(piece) = next_piece(text) {
        text = &text[piece.text().len()..];
        result.push(piece);
    }
    result
}

/// Renders `name` with the given quote, bare names that need quoting get double quotes.
fn quote_like(name: &str, quote: Option<char>) -> String {
    match quote {
        Some('[') => format!("[{name}]"),
        Some(q) => {
            let escaped = name.replace(q, &format!("{q}{q}"));
            format!("{q}{escaped}{q}")
        }
        None if !name.is_empty()
            && name.chars().all(is_identifier_char)
            && !name.starts_with(|c: char| c.is_ascii_digit()) =>
        {
            name.to_string()
        }
        None => format!("\"{}\"", name.replace('"', "\"\"")),
    }
}

/// Replaces every identifier of `text` matching `target`. Returns the new text and whether
/// anything matched.
fn replace_identifier(text: &str, target: &str, to: Option<&str>) -> (String, bool) {
    let mut out = String::with_capacity(text.len());
    let mut found = false;
    for piece in pieces(text) {
        match piece {
            Piece::Identifier { name, quote, .. } if name.eq_ignore_ascii_case(target) => {
                found = true;
                out.push_str(&quote_like(to.unwrap_or(&name), quote));
            }
            Piece::Identifier { text, .. } | Piece::Other(text) => out.push_str(text),
        }
    }
    (out, found)
}

/// Replaces inside the first parenthesized group only.
fn replace_in_parens(text: &str, target: &str, to: Option<&str>) -> (String, bool) {
    let (Some(open), Some(close)) = (text.find('('), text.rfind(')')) else {
        return (text.to_string(), false);
    };
    if close < open {
        return (text.to_string(), false);
    }
    let (inner, found) = replace_identifier(&text[open + 1..close], target, to);
    (
        format!("{}({}){}", &text[..open], inner, &text[close + 1..]),
        found,
    )
}

fn first_identifier(text: &str) -> Option<(String, Option<char>)> {
    match next_piece(text.trim_start())? {
        Piece::Identifier { name, quote, .. } => Some((name, quote)),
        Piece::Other(..) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClauseKind {
    Column,
    Key,
    Foreign,
    Other,
}

/// Kind of a clause and the offset where its body starts, after any `constraint name`.
fn classify(clause: &str) -> (ClauseKind, usize) {
    let lower = clause.to_ascii_lowercase();
    let mut offset = 0;
    if let Some(after) = keyword(&lower, 0, "constraint") {
        offset = after;
        if let Some(Piece::Identifier { text, .. }) = next_piece(&clause[after..]) {
            offset += text.len();
            offset += clause[offset..].len() - clause[offset..].trim_start().len();
        }
    }
    let rest = &lower[offset..];
    let kind = if rest.starts_with("primary key") || keyword(rest, 0, "unique").is_some() {
        ClauseKind::Key
    } else if rest.starts_with("foreign key") {
        ClauseKind::Foreign
    } else if offset > 0 || keyword(rest, 0, "check").is_some() {
        ClauseKind::Other
    } else {
        ClauseKind::Column
    };
    (kind, offset)
}

/// Applies `rewrite` to the definition of table `sql`, returning the new statement.
pub fn rewrite_create_table(sql: &str, rewrite: &Rewrite) -> Result<String, DdlError> {
    let table = CreateTable::parse(sql)?;
    let target = rewrite.column();
    let to = match rewrite {
        Rewrite::Rename { to, .. } => Some(*to),
        _ => None,
    };
    let mut found = false;
    let mut clauses = Vec::new();
    let mut columns_left = 0;
    for clause in table.clauses() {
        let (kind, offset) = classify(&clause);
        let rewritten = match kind {
            ClauseKind::Column => match next_piece(&clause) {
                Some(Piece::Identifier { text, name, quote })
                    if name.eq_ignore_ascii_case(target) =>
                {
                    found = true;
                    match rewrite {
                        Rewrite::Rename { to, .. } => {
                            format!("{}{}", quote_like(to, quote), &clause[text.len()..])
                        }
                        Rewrite::Drop(..) => String::new(),
                        Rewrite::Replace { definition, .. } => definition.to_string(),
                    }
                }
                _ => clause.clone(),
            },
            _ if matches!(rewrite, Rewrite::Replace { .. }) => clause,
            ClauseKind::Key => {
                let (body, matched) = replace_in_parens(&clause[offset..], target, to);
                if matched && to.is_none() {
                    String::new()
                } else {
                    format!("{}{}", &clause[..offset], body)
                }
            }
            ClauseKind::Foreign => rewrite_foreign(&clause, &table, offset, target, to),
            ClauseKind::Other => clause,
        };
        if rewritten.is_empty() {
            continue;
        }
        if classify(&rewritten).0 == ClauseKind::Column {
            columns_left += 1;
        }
        clauses.push(rewritten);
    }
    if !found {
        return Err(DdlError::ColumnToChange(target.to_string()));
    }
    if columns_left == 0 {
        return Err(DdlError::LastColumn);
    }
    Ok(table.with_clauses(&clauses))
}

fn rewrite_foreign(
    clause: &str,
    table: &CreateTable,
    offset: usize,
    target: &str,
    to: Option<&str>,
) -> String {
    let lower = clause.to_ascii_lowercase();
    let Some(split) = lower.find(" references ") else {
        return clause.to_string();
    };
    let (key, references) = (&clause[offset..split], &clause[split + " references ".len()..]);
    let (key, matched) = replace_in_parens(key, target, to);
    if matched && to.is_none() {
        return String::new();
    }
    let self_referencing = first_identifier(references)
        .is_some_and(|(name, _)| name.eq_ignore_ascii_case(table.name()));
    let references = if self_referencing {
        let (references, matched) = replace_in_parens(references, target, to);
        if matched && to.is_none() {
            return String::new();
        }
        references
    } else {
        references.to_string()
    };
    format!("{}{} references {}", &clause[..offset], key, references)
}

/// Applies `rewrite` to a stored `CREATE INDEX` statement of the rebuilt table. Returns `None`
/// when the index covers a dropped column and must not be created again.
pub fn rewrite_create_index(sql: &str, rewrite: &Rewrite) -> Option<String> {
    let to = match rewrite {
        Rewrite::Rename { to, .. } => Some(*to),
        Rewrite::Drop(..) => None,
        Rewrite::Replace { .. } => return Some(sql.to_string()),
    };
    let mut offset = 0;
    let mut after_on = false;
    let mut open = None;
    for piece in pieces(sql) {
        match &piece {
            Piece::Identifier {
                name, quote: None, ..
            } if name.eq_ignore_ascii_case("on") => after_on = true,
            Piece::Other(text) if after_on => {
                if let Some(i) = text.find('(') {
                    open = Some(offset + i);
                    break;
                }
            }
            _ => {}
        }
        offset += piece.text().len();
    }
    let Some(open) = open else {
        return Some(sql.to_string());
    };
    let (columns, found) = replace_identifier(&sql[open..], rewrite.column(), to);
    if found && to.is_none() {
        return None;
    }
    Some(format!("{}{}", &sql[..open], columns))
}

/// Removes the foreign key named `key_name`, or the one declared on `columns`.
pub fn drop_foreign_key(
    sql: &str,
    columns: &[String],
    key_name: Option<&str>,
) -> Result<String, DdlError> {
    let table = CreateTable::parse(sql)?;
    // Plain comma split: multi column keys and defaults containing commas are mis-partitioned.
    let kept: Vec<String> = table
        .body()
        .split(',')
        .map(str::trim)
        .filter(|line| !is_dropped_foreign(line, columns, key_name))
        .map(String::from)
        .collect();
    Ok(table.with_clauses(&kept))
}

fn is_dropped_foreign(line: &str, columns: &[String], key_name: Option<&str>) -> bool {
    let lower = line.to_ascii_lowercase();
    if !lower.starts_with("constraint") && !lower.contains("foreign key") {
        return false;
    }
    if let Some(key_name) = key_name {
        return pieces(line).iter().any(|v| {
            matches!(v, Piece::Identifier { name, .. } if name.eq_ignore_ascii_case(key_name))
        });
    }
    let Some(start) = lower.find("foreign key") else {
        return false;
    };
    let rest = &line[start..];
    let (Some(open), close) = (rest.find('('), rest.find(')')) else {
        return false;
    };
    let listed = &rest[open + 1..close.unwrap_or(rest.len())];
    pieces(listed).iter().any(|v| {
        matches!(v, Piece::Identifier { name, .. }
            if columns.iter().any(|c| c.eq_ignore_ascii_case(name)))
    })
}
