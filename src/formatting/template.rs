//! Status text templates
//!
//! A template mixes literal text, `{placeholder}` references and `[...]`
//! blocks. Blocks are only displayed when at least one placeholder inside them
//! has a value, which lets a template degrade gracefully when vnstat does not
//! report a field. A block may start with `\?` commands separated by `&`:
//!
//! - `color=<name>` colors the block (a color name, hex value or the name of a
//!   placeholder that has a threshold color)
//! - `show` always displays the block
//! - `if=<name>` / `if=!<name>` displays the block only when the placeholder
//!   is (or is not) truthy
//!
//! `|` separates alternatives inside a block; the first alternative that can
//! be displayed wins. `\` escapes the following character.
//!
//! ```text
//! vnStat [\?color=good {daily_rx} {daily_rx_unit}] [\?color=daily_total {daily_total}]
//! ```

use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::formatting::colors::ColorPalette;

/// Errors raised while parsing a template
#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("Unclosed placeholder starting at position {0}")]
    UnclosedPlaceholder(usize),

    #[error("Empty placeholder at position {0}")]
    EmptyPlaceholder(usize),

    #[error("Unclosed block starting at position {0}")]
    UnclosedBlock(usize),

    #[error("Unexpected ']' at position {0}")]
    UnexpectedBlockEnd(usize),
}

/// A run of output text sharing one color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Segment {
    pub fn new(text: impl Into<String>, color: Option<String>) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Joins segment texts, dropping colors
pub fn plain_text(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Placeholder(String),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Commands {
    color: Option<String>,
    show: bool,
    condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    name: String,
    negate: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Block {
    commands: Commands,
    alternatives: Vec<Vec<Node>>,
}

/// Values and colors a template is rendered against
pub struct RenderContext<'a> {
    /// Display values keyed by placeholder name
    pub values: &'a HashMap<String, String>,
    /// Already resolved threshold colors keyed by placeholder name
    pub threshold_colors: &'a HashMap<String, String>,
    pub palette: &'a ColorPalette,
}

impl RenderContext<'_> {
    fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn resolve_color(&self, name: &str) -> Option<String> {
        self.threshold_colors
            .get(name)
            .cloned()
            .or_else(|| self.palette.resolve(name))
    }
}

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parses a template string
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut parser = Parser {
            chars: source.chars().collect(),
            pos: 0,
        };
        let mut alternatives = parser.parse_alternatives(None)?;
        let nodes = alternatives.pop().unwrap_or_default();

        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_placeholders(&self.nodes, &mut names);
        names
    }

    /// Names used in `\?color=` commands, in order of first appearance
    pub fn color_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_color_names(&self.nodes, &mut names);
        names
    }

    /// Renders the template into colored segments
    ///
    /// Adjacent segments with the same color are merged and empty text is
    /// dropped.
    pub fn render(&self, ctx: &RenderContext<'_>) -> Vec<Segment> {
        let mut segments = Vec::new();
        render_nodes(&self.nodes, None, ctx, &mut segments);
        merge_segments(segments)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Parses nodes until the end of input, or until the `]` closing the
    /// block opened at `block_start`
    fn parse_alternatives(
        &mut self,
        block_start: Option<usize>,
    ) -> Result<Vec<Vec<Node>>, TemplateError> {
        let mut alternatives = Vec::new();
        let mut current = Vec::new();
        let mut text = String::new();

        loop {
            match self.peek() {
                None => {
                    if let Some(start) = block_start {
                        return Err(TemplateError::UnclosedBlock(start));
                    }
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => {
                            text.push(c);
                            self.pos += 1;
                        }
                        None => text.push('\\'),
                    }
                }
                Some('{') => {
                    flush_text(&mut text, &mut current);
                    current.push(self.parse_placeholder()?);
                }
                Some('[') => {
                    flush_text(&mut text, &mut current);
                    let start = self.pos;
                    self.pos += 1;
                    current.push(Node::Block(self.parse_block(start)?));
                }
                Some(']') => {
                    if block_start.is_none() {
                        return Err(TemplateError::UnexpectedBlockEnd(self.pos));
                    }
                    self.pos += 1;
                    break;
                }
                Some('|') if block_start.is_some() => {
                    flush_text(&mut text, &mut current);
                    alternatives.push(std::mem::take(&mut current));
                    self.pos += 1;
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }

        flush_text(&mut text, &mut current);
        alternatives.push(current);
        Ok(alternatives)
    }

    fn parse_placeholder(&mut self) -> Result<Node, TemplateError> {
        let start = self.pos;
        self.pos += 1;

        let mut inner = String::new();
        loop {
            match self.peek() {
                None => return Err(TemplateError::UnclosedPlaceholder(start)),
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    inner.push(c);
                    self.pos += 1;
                }
            }
        }

        // Format specs such as `{daily_rx:g}` are accepted and ignored
        let name = inner.split(':').next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyPlaceholder(start));
        }
        Ok(Node::Placeholder(name.to_string()))
    }

    fn parse_block(&mut self, start: usize) -> Result<Block, TemplateError> {
        let mut commands = Commands::default();

        if self.peek() == Some('\\') && self.chars.get(self.pos + 1) == Some(&'?') {
            self.pos += 2;
            let mut raw = String::new();
            while let Some(c) = self.peek() {
                if c == ' ' || c == ']' {
                    break;
                }
                raw.push(c);
                self.pos += 1;
            }
            if self.peek() == Some(' ') {
                self.pos += 1;
            }
            commands = parse_commands(&raw);
        }

        let alternatives = self.parse_alternatives(Some(start))?;
        Ok(Block {
            commands,
            alternatives,
        })
    }
}

fn flush_text(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

fn parse_commands(raw: &str) -> Commands {
    let mut commands = Commands::default();

    for command in raw.split('&').filter(|c| !c.is_empty()) {
        let (key, value) = match command.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (command, None),
        };

        match (key, value) {
            ("show", _) => commands.show = true,
            ("color", Some(color)) => commands.color = Some(color.to_string()),
            ("if", Some(name)) => {
                commands.condition = Some(match name.strip_prefix('!') {
                    Some(name) => Condition {
                        name: name.to_string(),
                        negate: true,
                    },
                    None => Condition {
                        name: name.to_string(),
                        negate: false,
                    },
                });
            }
            _ => debug!("Ignoring unsupported template command '{}'", command),
        }
    }

    commands
}

fn collect_placeholders(nodes: &[Node], names: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Placeholder(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Node::Block(block) => {
                for alternative in &block.alternatives {
                    collect_placeholders(alternative, names);
                }
            }
            Node::Text(_) => {}
        }
    }
}

fn collect_color_names(nodes: &[Node], names: &mut Vec<String>) {
    for node in nodes {
        if let Node::Block(block) = node {
            if let Some(color) = &block.commands.color {
                if !names.contains(color) {
                    names.push(color.clone());
                }
            }
            for alternative in &block.alternatives {
                collect_color_names(alternative, names);
            }
        }
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(v) => v.parse::<f64>().map(|n| n != 0.0).unwrap_or(true),
    }
}

/// Renders nodes into `out`, returning whether any placeholder had a value
fn render_nodes(
    nodes: &[Node],
    color: Option<&str>,
    ctx: &RenderContext<'_>,
    out: &mut Vec<Segment>,
) -> bool {
    let mut valid = false;

    for node in nodes {
        match node {
            Node::Text(text) => out.push(Segment::new(text.clone(), color.map(String::from))),
            Node::Placeholder(name) => match ctx.value(name) {
                Some(value) if !value.is_empty() => {
                    out.push(Segment::new(value, color.map(String::from)));
                    valid = true;
                }
                _ => {}
            },
            Node::Block(block) => {
                if let Some((segments, block_valid)) = render_block(block, color, ctx) {
                    out.extend(segments);
                    valid |= block_valid;
                }
            }
        }
    }

    valid
}

fn render_block(
    block: &Block,
    inherited_color: Option<&str>,
    ctx: &RenderContext<'_>,
) -> Option<(Vec<Segment>, bool)> {
    if let Some(condition) = &block.commands.condition {
        if is_truthy(ctx.value(&condition.name)) == condition.negate {
            return None;
        }
    }

    let color = block
        .commands
        .color
        .as_deref()
        .and_then(|name| ctx.resolve_color(name))
        .or_else(|| inherited_color.map(String::from));

    for alternative in &block.alternatives {
        let mut segments = Vec::new();
        let valid = render_nodes(alternative, color.as_deref(), ctx, &mut segments);
        if valid || block.commands.show {
            return Some((segments, valid));
        }
    }

    None
}

fn merge_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::new();

    for segment in segments.into_iter().filter(|s| !s.text.is_empty()) {
        match merged.last_mut() {
            Some(last) if last.color == segment.color => last.text.push_str(&segment.text),
            _ => merged.push(segment),
        }
    }

    merged
}
