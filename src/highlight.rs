//! Line-numbered syntax highlighting for fenced code blocks.
//!
//! Keyword-based highlighting: strings, comments, numbers, keywords, and
//! builtins are colored from the theme palette. Languages without a
//! definition degrade to unstyled monospace; both paths get a line-number
//! gutter. Pure functions of their inputs — no I/O, no global state.

use crate::theme::{SlideTheme, subtle_bg};
use crate::types::{SlideBlock, StyledLine, StyledSegment};

/// Language definition for syntax highlighting.
struct LanguageDef {
    keywords: &'static [&'static str],
    comment_prefix: &'static str,
    builtins: &'static [&'static str],
}

fn language_def(language: &str) -> Option<LanguageDef> {
    match language.to_lowercase().as_str() {
        "rust" | "rs" => Some(LanguageDef {
            keywords: &[
                "fn", "let", "mut", "const", "static", "if", "else", "match", "for", "while",
                "loop", "return", "break", "continue", "struct", "enum", "impl", "trait", "pub",
                "use", "mod", "crate", "self", "super", "where", "async", "await", "move",
                "unsafe", "type", "as", "in", "ref", "true", "false",
            ],
            comment_prefix: "//",
            builtins: &[
                "Self", "Option", "Result", "Vec", "String", "Box", "Rc", "Arc", "Some", "None",
                "Ok", "Err",
            ],
        }),
        "python" | "py" => Some(LanguageDef {
            keywords: &[
                "def", "class", "if", "elif", "else", "for", "while", "return", "import", "from",
                "as", "try", "except", "finally", "with", "yield", "lambda", "pass", "break",
                "continue", "raise", "and", "or", "not", "in", "is", "True", "False", "None",
                "async", "await",
            ],
            comment_prefix: "#",
            builtins: &[
                "print", "len", "range", "int", "str", "float", "list", "dict", "set", "tuple",
                "bool", "type", "isinstance", "self",
            ],
        }),
        "javascript" | "js" | "typescript" | "ts" => Some(LanguageDef {
            keywords: &[
                "function", "const", "let", "var", "if", "else", "for", "while", "return",
                "class", "new", "this", "import", "export", "from", "default", "try", "catch",
                "finally", "throw", "async", "await", "yield", "switch", "case", "break",
                "continue", "typeof", "instanceof", "true", "false", "null", "undefined",
            ],
            comment_prefix: "//",
            builtins: &[
                "console", "Promise", "Array", "Object", "Map", "Set", "JSON", "Math", "String",
                "Number", "Boolean", "Error",
            ],
        }),
        "fsharp" | "fs" | "f#" => Some(LanguageDef {
            keywords: &[
                "let", "mutable", "rec", "fun", "function", "match", "with", "when", "if",
                "then", "elif", "else", "for", "in", "to", "do", "while", "type", "module",
                "open", "namespace", "member", "static", "new", "of", "and", "or", "not", "try",
                "finally", "raise", "async", "return", "yield", "use", "inline", "abstract",
                "override", "interface", "inherit", "true", "false", "null",
            ],
            comment_prefix: "//",
            builtins: &[
                "printfn", "sprintf", "failwith", "ignore", "List", "Seq", "Array", "Map",
                "Option", "Async", "Some", "None", "Ok", "Error", "int", "string", "float",
                "bool",
            ],
        }),
        "csharp" | "cs" | "c#" => Some(LanguageDef {
            keywords: &[
                "using", "namespace", "class", "struct", "interface", "enum", "record", "public",
                "private", "protected", "internal", "static", "readonly", "const", "var", "new",
                "void", "int", "string", "bool", "double", "float", "long", "if", "else",
                "switch", "case", "for", "foreach", "while", "do", "return", "break", "continue",
                "try", "catch", "finally", "throw", "async", "await", "this", "base", "null",
                "true", "false", "is", "as", "in", "out", "ref", "get", "set", "sealed",
                "override", "virtual", "abstract", "partial",
            ],
            comment_prefix: "//",
            builtins: &[
                "Console", "Task", "List", "Dictionary", "String", "Int32", "Math", "Exception",
                "IEnumerable", "Func", "Action", "Nullable",
            ],
        }),
        "json" => Some(LanguageDef {
            keywords: &["true", "false", "null"],
            comment_prefix: "",
            builtins: &[],
        }),
        "yaml" | "yml" => Some(LanguageDef {
            keywords: &["true", "false", "null", "yes", "no"],
            comment_prefix: "#",
            builtins: &[],
        }),
        "shell" | "sh" | "bash" | "zsh" => Some(LanguageDef {
            keywords: &[
                "if", "then", "else", "elif", "fi", "for", "while", "do", "done", "case", "esac",
                "function", "return", "exit", "export", "local", "readonly", "in", "select",
                "until", "true", "false",
            ],
            comment_prefix: "#",
            builtins: &[
                "echo", "cd", "ls", "cat", "grep", "sed", "awk", "find", "sort", "uniq", "wc",
                "head", "tail", "mkdir", "rm", "cp", "mv", "chmod", "chown", "curl", "wget",
            ],
        }),
        _ => None,
    }
}

/// Highlight a single code line using simple keyword matching.
fn highlight_line(
    line: &str,
    lang_def: Option<&LanguageDef>,
    theme: &SlideTheme,
) -> Vec<StyledSegment> {
    let code_bg = Some(subtle_bg(theme));

    let Some(def) = lang_def else {
        // No language definition — unstyled monospace on the code background.
        return vec![StyledSegment {
            text: line.to_string(),
            bg: code_bg,
            ..Default::default()
        }];
    };

    // Full-line comment.
    if !def.comment_prefix.is_empty() && line.trim_start().starts_with(def.comment_prefix) {
        return vec![StyledSegment {
            text: line.to_string(),
            fg: Some(theme.palette[8]),
            bg: code_bg,
            italic: true,
            ..Default::default()
        }];
    }

    let mut segments = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(byte_pos, ch)) = chars.peek() {
        // String literal.
        if ch == '"' || ch == '\'' {
            let quote = ch;
            let start = byte_pos;
            chars.next();
            let mut escaped = false;
            while let Some(&(_, c)) = chars.peek() {
                chars.next();
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    break;
                }
            }
            let end = chars.peek().map(|&(i, _)| i).unwrap_or(line.len());
            segments.push(StyledSegment {
                text: line[start..end].to_string(),
                fg: Some(theme.palette[10]),
                bg: code_bg,
                ..Default::default()
            });
            continue;
        }

        // Inline comment through end of line.
        if !def.comment_prefix.is_empty() && line[byte_pos..].starts_with(def.comment_prefix) {
            segments.push(StyledSegment {
                text: line[byte_pos..].to_string(),
                fg: Some(theme.palette[8]),
                bg: code_bg,
                italic: true,
                ..Default::default()
            });
            break;
        }

        // Number literal (digit-led token; picks up hex/float/underscore forms).
        if ch.is_ascii_digit() {
            let start = byte_pos;
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                    chars.next();
                } else {
                    break;
                }
            }
            let end = chars.peek().map(|&(i, _)| i).unwrap_or(line.len());
            segments.push(StyledSegment {
                text: line[start..end].to_string(),
                fg: Some(theme.palette[11]),
                bg: code_bg,
                ..Default::default()
            });
            continue;
        }

        // Word (identifier, keyword, or builtin).
        if ch.is_alphanumeric() || ch == '_' {
            let start = byte_pos;
            while let Some(&(_, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    chars.next();
                } else {
                    break;
                }
            }
            let end = chars.peek().map(|&(i, _)| i).unwrap_or(line.len());
            let word = &line[start..end];

            let fg = if def.keywords.contains(&word) {
                Some(theme.palette[13])
            } else if def.builtins.contains(&word) {
                Some(theme.palette[14])
            } else {
                None
            };

            segments.push(StyledSegment {
                text: word.to_string(),
                fg,
                bg: code_bg,
                ..Default::default()
            });
            continue;
        }

        // Other character (punctuation, whitespace, etc.).
        let start = byte_pos;
        chars.next();
        let end = chars.peek().map(|&(i, _)| i).unwrap_or(line.len());
        segments.push(StyledSegment {
            text: line[start..end].to_string(),
            bg: code_bg,
            ..Default::default()
        });
    }

    if segments.is_empty() {
        // Empty line within the block keeps the background.
        segments.push(StyledSegment {
            text: String::new(),
            bg: code_bg,
            ..Default::default()
        });
    }

    segments
}

/// Renders a fenced code block into a line-numbered, highlighted [`SlideBlock`].
///
/// Strips exactly one trailing newline from `text` (an artifact of fence
/// syntax, not content); every other character is preserved verbatim. Each
/// emitted line starts with a single gutter segment holding the right-aligned
/// line number, followed by the highlighted code segments.
pub fn render_code_block(language: Option<&str>, text: &str, theme: &SlideTheme) -> SlideBlock {
    let lang_def = language.and_then(language_def);
    let body = text.strip_suffix('\n').unwrap_or(text);
    let code_lines: Vec<&str> = if text.is_empty() {
        Vec::new()
    } else {
        body.split('\n').collect()
    };

    let gutter_width = code_lines.len().max(1).to_string().len();
    let mut lines = Vec::with_capacity(code_lines.len());
    for (idx, code_line) in code_lines.iter().enumerate() {
        let mut segments = vec![StyledSegment {
            text: format!("{:>gutter_width$} ", idx + 1),
            fg: Some(theme.palette[8]),
            bg: Some(subtle_bg(theme)),
            ..Default::default()
        }];
        segments.extend(highlight_line(code_line, lang_def.as_ref(), theme));
        lines.push(StyledLine::new(segments));
    }

    SlideBlock::Code {
        language: language.map(str::to_string),
        lines,
    }
}
