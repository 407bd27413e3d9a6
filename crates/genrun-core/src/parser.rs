//! Line-oriented parser for `.gen` generation scripts.
//!
//! A single pass over physical lines produces a [`ParseResult`]. Nesting is
//! managed with an explicit stack of open block frames rather than a
//! grammar: the language has no recursive expressions, only recursive block
//! nesting. Blank lines and `#` comments are skipped, `>` lines are shell
//! commands, and every other line is `<WORD> <payload>` with the word
//! matched case-insensitively in both bare and `@`-sigil form.
//!
//! Two constructs consume lines out of band: `FILL` captures a verbatim
//! body between solitary `"` delimiter lines, and `TASK` collects a flat
//! body of simple commands terminated by the first blank line.
//!
//! Unknown command words are warnings, not errors; the parser is
//! deliberately permissive toward directives it does not recognize.

use tracing::warn;

use crate::ast::{
    CommandKind, CommandNode, ElseIfBranch, MetaValue, Metadata, ParseResult, ParseWarning,
};
use crate::error::ScriptError;

/// Parses script text into metadata plus the root command sequence.
pub fn parse(source: &str) -> Result<ParseResult, ScriptError> {
    let lines: Vec<&str> = source.lines().collect();
    let mut warnings: Vec<ParseWarning> = Vec::new();

    let (metadata, mut i) = extract_metadata(&lines, &mut warnings)?;

    let mut root: Vec<CommandNode> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();

    while i < lines.len() {
        let line_no = i + 1;
        let line = lines[i].trim();

        if line.is_empty() || line.starts_with('#') {
            i += 1;
            continue;
        }

        // The shell sigil always wins, regardless of word matching.
        if let Some(rest) = line.strip_prefix('>') {
            push_node(
                &mut root,
                &mut frames,
                CommandNode::new(CommandKind::Shell, rest.trim(), line_no),
            );
            i += 1;
            continue;
        }

        let (word, payload) = split_word(line);
        let word = word.trim_start_matches('@').to_ascii_uppercase();

        match word.as_str() {
            "IF" => {
                frames.push(Frame::If {
                    node: CommandNode::new(CommandKind::If, payload, line_no),
                    section: IfSection::Primary,
                });
            }
            "ELSEIF" => match frames.last_mut() {
                Some(Frame::If { node, section }) => {
                    if *section == IfSection::Else {
                        return Err(ScriptError::Parse {
                            line: line_no,
                            message: "ELSEIF after ELSE".to_string(),
                        });
                    }
                    node.else_if_branches.push(ElseIfBranch {
                        condition: payload.to_string(),
                        line: line_no,
                        children: Vec::new(),
                    });
                    *section = IfSection::ElseIf;
                }
                Some(_) => {
                    return Err(ScriptError::Parse {
                        line: line_no,
                        message: "ELSEIF not inside an IF block".to_string(),
                    });
                }
                None => {
                    return Err(ScriptError::Parse {
                        line: line_no,
                        message: "ELSEIF without corresponding IF".to_string(),
                    });
                }
            },
            "ELSE" => match frames.last_mut() {
                Some(Frame::If { node, section }) => {
                    if *section == IfSection::Else {
                        return Err(ScriptError::Parse {
                            line: line_no,
                            message: "duplicate ELSE".to_string(),
                        });
                    }
                    node.else_children = Some(Vec::new());
                    *section = IfSection::Else;
                }
                Some(_) => {
                    return Err(ScriptError::Parse {
                        line: line_no,
                        message: "ELSE not inside an IF block".to_string(),
                    });
                }
                None => {
                    return Err(ScriptError::Parse {
                        line: line_no,
                        message: "ELSE without corresponding IF".to_string(),
                    });
                }
            },
            "LOOP" | "FOREACH" => {
                frames.push(Frame::Loop {
                    node: CommandNode::new(CommandKind::Loop, payload, line_no),
                });
            }
            // Any recognized closer pops exactly one level, even when it
            // does not match the opener kind (END may close a LOOP).
            // Compatibility with existing scripts; see DESIGN.md.
            "END" | "ENDIF" | "ENDLOOP" | "ENDFOREACH" => match frames.pop() {
                Some(frame) => push_node(&mut root, &mut frames, frame.into_node()),
                None => {
                    return Err(ScriptError::Parse {
                        line: line_no,
                        message: format!("{} without corresponding opening block", word),
                    });
                }
            },
            "FILL" => {
                let (node, next) = scan_fill(&lines, i, payload, line_no)?;
                push_node(&mut root, &mut frames, node);
                i = next;
                continue;
            }
            "TASK" => {
                let (node, next) = scan_task(&lines, i, payload, line_no, &mut warnings);
                push_node(&mut root, &mut frames, node);
                i = next;
                continue;
            }
            other => match CommandKind::from_word(other) {
                Some(kind) => {
                    push_node(
                        &mut root,
                        &mut frames,
                        CommandNode::new(kind, payload, line_no),
                    );
                }
                None => {
                    warn!(line = line_no, word = other, "unknown command, skipping");
                    warnings.push(ParseWarning {
                        line: line_no,
                        message: format!("unknown command \"{}\"", other),
                    });
                }
            },
        }
        i += 1;
    }

    if let Some(frame) = frames.last() {
        return Err(ScriptError::Parse {
            line: frame.open_line(),
            message: format!("{} block is missing a closing END", frame.kind()),
        });
    }

    Ok(ParseResult {
        metadata,
        nodes: root,
        warnings,
    })
}

/// An open block being collected. Owned until its closer pops it, at which
/// point the finished node is attached to the parent sequence.
enum Frame {
    If { node: CommandNode, section: IfSection },
    Loop { node: CommandNode },
}

#[derive(PartialEq)]
enum IfSection {
    Primary,
    ElseIf,
    Else,
}

impl Frame {
    /// The sequence new nodes are currently appended to.
    fn target(&mut self) -> &mut Vec<CommandNode> {
        match self {
            Frame::Loop { node } => &mut node.children,
            Frame::If { node, section } => match section {
                IfSection::Primary => &mut node.children,
                IfSection::ElseIf => {
                    &mut node
                        .else_if_branches
                        .last_mut()
                        .expect("ELSEIF section implies a branch")
                        .children
                }
                IfSection::Else => node
                    .else_children
                    .as_mut()
                    .expect("ELSE section implies an else block"),
            },
        }
    }

    fn into_node(self) -> CommandNode {
        match self {
            Frame::If { node, .. } => node,
            Frame::Loop { node } => node,
        }
    }

    fn open_line(&self) -> usize {
        match self {
            Frame::If { node, .. } => node.line,
            Frame::Loop { node } => node.line,
        }
    }

    fn kind(&self) -> CommandKind {
        match self {
            Frame::If { .. } => CommandKind::If,
            Frame::Loop { .. } => CommandKind::Loop,
        }
    }
}

fn push_node(root: &mut Vec<CommandNode>, frames: &mut [Frame], node: CommandNode) {
    match frames.last_mut() {
        Some(frame) => frame.target().push(node),
        None => root.push(node),
    }
}

fn split_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

/// Captures a FILL node's verbatim body. Lines between the solitary `"`
/// delimiters are kept raw: no comment or blank-line stripping applies.
fn scan_fill(
    lines: &[&str],
    start: usize,
    payload: &str,
    line_no: usize,
) -> Result<(CommandNode, usize), ScriptError> {
    let mut j = start + 1;
    while j < lines.len() && lines[j].trim() != "\"" {
        j += 1;
    }
    if j >= lines.len() {
        return Err(ScriptError::Parse {
            line: line_no,
            message: "FILL missing opening quote delimiter".to_string(),
        });
    }
    j += 1;
    let body_start = j;
    while j < lines.len() && lines[j].trim() != "\"" {
        j += 1;
    }
    if j >= lines.len() {
        return Err(ScriptError::Parse {
            line: line_no,
            message: "FILL missing closing quote delimiter".to_string(),
        });
    }

    let mut node = CommandNode::new(CommandKind::Fill, payload, line_no);
    node.content_lines = lines[body_start..j].iter().map(|s| s.to_string()).collect();
    Ok((node, j + 1))
}

/// Collects a TASK body: the following non-blank lines, parsed as a flat
/// sequence of simple and shell commands. The body ends at the first blank
/// line or end of file; nested blocks are not supported in this form.
fn scan_task(
    lines: &[&str],
    start: usize,
    payload: &str,
    line_no: usize,
    warnings: &mut Vec<ParseWarning>,
) -> (CommandNode, usize) {
    let mut node = CommandNode::new(CommandKind::Task, payload, line_no);
    let mut j = start + 1;
    while j < lines.len() {
        let line = lines[j].trim();
        if line.is_empty() {
            break;
        }
        let body_line_no = j + 1;
        if line.starts_with('#') {
            j += 1;
            continue;
        }
        if let Some(rest) = line.strip_prefix('>') {
            node.children
                .push(CommandNode::new(CommandKind::Shell, rest.trim(), body_line_no));
            j += 1;
            continue;
        }
        let (word, rest) = split_word(line);
        let word = word.trim_start_matches('@').to_ascii_uppercase();
        match word.as_str() {
            "IF" | "ELSEIF" | "ELSE" | "LOOP" | "FOREACH" | "TASK" | "FILL" | "END" | "ENDIF"
            | "ENDLOOP" | "ENDFOREACH" => {
                warn!(line = body_line_no, word = %word, "not supported inside a TASK body, skipping");
                warnings.push(ParseWarning {
                    line: body_line_no,
                    message: format!("{} is not supported inside a TASK body", word),
                });
            }
            other => match CommandKind::from_word(other) {
                Some(kind) => {
                    node.children
                        .push(CommandNode::new(kind, rest, body_line_no));
                }
                None => {
                    warn!(line = body_line_no, word = other, "unknown command, skipping");
                    warnings.push(ParseWarning {
                        line: body_line_no,
                        message: format!("unknown command \"{}\"", other),
                    });
                }
            },
        }
        j += 1;
    }
    (node, j)
}

/// Extracts an optional leading `---` metadata header. Returns the parsed
/// record and the index of the first line after the header.
fn extract_metadata(
    lines: &[&str],
    warnings: &mut Vec<ParseWarning>,
) -> Result<(Metadata, usize), ScriptError> {
    let mut start = 0;
    while start < lines.len() && lines[start].trim().is_empty() {
        start += 1;
    }
    if start >= lines.len() || lines[start].trim() != "---" {
        return Ok((Metadata::default(), 0));
    }

    let mut metadata = Metadata::default();
    let mut j = start + 1;
    while j < lines.len() {
        let line = lines[j].trim();
        if line == "---" {
            return Ok((metadata, j + 1));
        }
        if line.is_empty() || line.starts_with('#') {
            j += 1;
            continue;
        }
        match line.split_once(':') {
            Some((key, value)) => {
                let value = value.trim();
                if value.starts_with('[') && value.ends_with(']') {
                    let items = value[1..value.len() - 1]
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                    metadata.insert(key.trim(), MetaValue::List(items));
                } else {
                    metadata.insert(key.trim(), MetaValue::Text(value.to_string()));
                }
            }
            None => warnings.push(ParseWarning {
                line: j + 1,
                message: format!("malformed metadata entry \"{}\"", line),
            }),
        }
        j += 1;
    }

    Err(ScriptError::Parse {
        line: start + 1,
        message: "unterminated metadata header".to_string(),
    })
}
