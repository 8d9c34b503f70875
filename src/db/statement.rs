/// One statement cut out of a SQL batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatement {
    pub text: String,
    /// 0-based index, within the batch, of the statement's first line.
    pub line: usize,
}

impl BatchStatement {
    /// 1-based line of the statement in the script file, given the line the
    /// batch starts on.
    pub fn source_line(&self, line_offset: usize) -> usize {
        line_offset + self.line
    }
}

/// How a buffered statement ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitKind {
    /// Ends at a trailing `;`, which is dropped.
    #[default]
    Plain,
    /// Ends at a `/` line and keeps its final `END;`.
    PlSql,
    /// A `CREATE` header that does not yet name what it creates.
    Undecided,
}

#[derive(Default)]
struct SplitState {
    in_single_quote: bool,
    in_block_comment: bool,
    kind: UnitKind,
    header: String,
    start_line: usize,
    current: Vec<String>,
}

impl SplitState {
    fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    fn begin(&mut self, line_index: usize) {
        self.start_line = line_index;
        self.kind = UnitKind::Undecided;
        self.header.clear();
    }

    /// Feed one more line into an undecided header.
    fn extend_header(&mut self, trimmed: &str) {
        let code = trimmed.split("--").next().unwrap_or_default();
        if !self.header.is_empty() {
            self.header.push(' ');
        }
        self.header.push_str(code);
        self.kind = unit_kind(&self.header);
    }

    fn is_plsql(&self) -> bool {
        self.kind == UnitKind::PlSql
    }

    fn push_line(&mut self, line: &str) {
        self.current.push(line.to_string());
    }

    /// Track quote and block comment state across `line` and return the byte
    /// index of its terminating `;`: the last code character outside quotes
    /// and comments, before any `--` comment.
    fn scan_terminator(&mut self, line: &str) -> Option<usize> {
        let mut last_code = None;
        let mut chars = line.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            let next = chars.peek().map(|(_, next)| *next);
            if self.in_block_comment {
                if ch == '*' && next == Some('/') {
                    chars.next();
                    self.in_block_comment = false;
                }
                continue;
            }
            if self.in_single_quote {
                if ch == '\'' {
                    if next == Some('\'') {
                        chars.next();
                    } else {
                        self.in_single_quote = false;
                    }
                }
                last_code = Some((idx, ch));
                continue;
            }
            match ch {
                '\'' => {
                    self.in_single_quote = true;
                    last_code = Some((idx, ch));
                }
                '-' if next == Some('-') => break,
                '/' if next == Some('*') => {
                    chars.next();
                    self.in_block_comment = true;
                }
                c if c.is_whitespace() => {}
                c => last_code = Some((idx, c)),
            }
        }

        match last_code {
            Some((idx, ';')) if !self.in_single_quote && !self.in_block_comment => Some(idx),
            _ => None,
        }
    }

    fn take_plain(&mut self) -> Option<BatchStatement> {
        let text = self.current.join("\n");
        let text = text.trim_end().trim_end_matches(';').trim_end().to_string();
        self.take(text)
    }

    fn take_plsql(&mut self) -> Option<BatchStatement> {
        let text = self.current.join("\n");
        let text = text.trim_end().to_string();
        self.take(text)
    }

    fn take(&mut self, text: String) -> Option<BatchStatement> {
        let line = self.start_line;
        self.current.clear();
        self.kind = UnitKind::Plain;
        self.header.clear();
        self.in_single_quote = false;
        self.in_block_comment = false;
        if text.trim().is_empty() {
            None
        } else {
            Some(BatchStatement { text, line })
        }
    }
}

/// Split a SQL batch into the statements to run one by one.
///
/// Plain statements end at a line whose last code character is `;`, which is
/// dropped. PL/SQL units (anonymous blocks and stored program units) end only
/// at a line holding a single `/` and keep their final `END;`.
pub fn split_batch(source: &str) -> Vec<BatchStatement> {
    let mut state = SplitState::default();
    let mut statements = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();

        if state.is_empty() {
            if trimmed.is_empty() || trimmed.starts_with("--") || trimmed == "/" {
                continue;
            }
            state.begin(index);
        }
        if state.kind == UnitKind::Undecided {
            state.extend_header(trimmed);
        }

        if trimmed == "/" && !state.in_single_quote && !state.in_block_comment {
            let statement = if state.is_plsql() {
                state.take_plsql()
            } else {
                state.take_plain()
            };
            statements.extend(statement);
            continue;
        }

        if state.is_plsql() {
            state.push_line(line);
            continue;
        }

        match state.scan_terminator(line) {
            Some(end) => {
                state.push_line(&line[..end]);
                statements.extend(state.take_plain());
            }
            None => state.push_line(line),
        }
    }

    if !state.is_empty() {
        let last = if state.is_plsql() {
            state.take_plsql()
        } else {
            state.take_plain()
        };
        statements.extend(last);
    }

    statements
}

/// Anonymous blocks and CREATE [OR REPLACE] [NON]EDITIONABLE program units.
pub fn is_plsql_start(line: &str) -> bool {
    unit_kind(line) == UnitKind::PlSql
}

/// Classify a statement by its leading keywords. A `CREATE` followed only by
/// modifiers stays undecided until more of the header is known.
pub fn unit_kind(header: &str) -> UnitKind {
    let upper = header.to_uppercase();
    let mut tokens = upper
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .filter(|token| !token.is_empty());

    match tokens.next() {
        Some("DECLARE") | Some("BEGIN") => UnitKind::PlSql,
        Some("CREATE") => {
            for token in tokens {
                match token {
                    "OR" | "REPLACE" | "EDITIONABLE" | "NONEDITIONABLE" => continue,
                    "PROCEDURE" | "FUNCTION" | "PACKAGE" | "TRIGGER" | "TYPE" => {
                        return UnitKind::PlSql
                    }
                    _ => return UnitKind::Plain,
                }
            }
            UnitKind::Undecided
        }
        _ => UnitKind::Plain,
    }
}
