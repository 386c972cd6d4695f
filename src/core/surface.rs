//! Editing surface abstraction and the in-process markup surface

use std::ops::Range;

use super::command::{Alignment, BlockKind, ListKind, ToolbarCommand};
use super::markup;

/// The rich-text input the editor renders into and reads edits from
///
/// The controller never parses markup itself; formatting is delegated to the
/// surface and the resulting markup is read back.
pub trait EditingSurface {
    /// Apply a formatting command at the current selection
    fn apply_command(&mut self, command: ToolbarCommand);

    /// Current markup
    fn serialized_content(&self) -> String;

    /// Current text as a reader sees it
    fn plain_text(&self) -> String;

    /// Text inside the current selection, empty when nothing is selected
    fn selected_plain_text(&self) -> String;

    /// Replace the displayed markup
    fn set_serialized_content(&mut self, markup: &str);

    /// Insert markup at the caret, replacing any selection
    fn insert_markup(&mut self, markup: &str);
}

const ALIGN_OPEN: &str = "<div style=\"text-align: ";
const ALIGN_CLOSE: &str = "</div>";

/// Markup buffer with a byte-range selection
///
/// Blocks are kept one per line so that block-level commands can address
/// the caret's line directly.
#[derive(Debug, Clone, Default)]
pub struct MarkupSurface {
    markup: String,
    selection: Range<usize>,
}

impl MarkupSurface {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_content(markup: &str) -> Self {
        let mut surface = Self::new();
        surface.set_serialized_content(markup);
        surface
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Direct access for text widgets editing the raw markup
    pub fn markup_mut(&mut self) -> &mut String {
        &mut self.markup
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Set the selection in byte offsets, snapped to character boundaries
    pub fn set_selection(&mut self, range: Range<usize>) {
        let a = snap(&self.markup, range.start);
        let b = snap(&self.markup, range.end);
        self.selection = a.min(b)..a.max(b);
    }

    /// Set the selection in character offsets
    pub fn set_selection_chars(&mut self, start: usize, end: usize) {
        let to_byte = |chars: usize| {
            self.markup
                .char_indices()
                .nth(chars)
                .map(|(i, _)| i)
                .unwrap_or(self.markup.len())
        };
        let range = to_byte(start)..to_byte(end);
        self.set_selection(range);
    }

    fn toggle_inline(&mut self, tag: &str) {
        let Range { start, end } = self.selection();
        if start == end {
            return;
        }

        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        let selected = &self.markup[start..end];

        if self.markup[..start].ends_with(&open) && self.markup[end..].starts_with(&close) {
            let outer = start - open.len();
            self.markup.replace_range(end..end + close.len(), "");
            self.markup.replace_range(outer..start, "");
            self.selection = outer..end - open.len();
        } else if selected.len() >= open.len() + close.len()
            && selected.starts_with(&open)
            && selected.ends_with(&close)
        {
            let inner = selected[open.len()..selected.len() - close.len()].to_string();
            self.markup.replace_range(start..end, &inner);
            self.selection = start..start + inner.len();
        } else {
            self.markup.insert_str(end, &close);
            self.markup.insert_str(start, &open);
            self.selection = start + open.len()..end + open.len();
        }
    }

    fn align(&mut self, alignment: Alignment) {
        let (first, last) = self.selected_lines();
        let mut lines = self.lines();
        for line in &mut lines[first..=last] {
            if line.trim().is_empty() {
                continue;
            }
            let inner = strip_alignment(line).to_string();
            *line = with_alignment(&inner, alignment);
        }
        self.replace_lines(lines, last);
    }

    fn format_block(&mut self, kind: BlockKind) {
        let (first, last) = self.selected_lines();
        let mut lines = self.lines();
        for line in &mut lines[first..=last] {
            let alignment = alignment_of(line);
            let inner = strip_block(strip_alignment(line));
            let block = format!("<{tag}>{inner}</{tag}>", tag = kind.tag());
            *line = match alignment {
                Some(alignment) => with_alignment(&block, alignment),
                None => block,
            };
        }
        self.replace_lines(lines, last);
    }

    fn toggle_list(&mut self, kind: ListKind) {
        let (first, last) = self.selected_lines();
        let mut lines = self.lines();

        let all_items = lines[first..=last].iter().all(|line| list_item(line).is_some());
        let container = (first > 0 && last + 1 < lines.len() && all_items)
            .then(|| list_container(&lines[first - 1], &lines[last + 1]))
            .flatten();

        let caret_line = match container {
            Some(existing) if existing == kind => {
                let paragraphs: Vec<String> = lines[first..=last]
                    .iter()
                    .map(|line| format!("<p>{}</p>", list_item(line).unwrap_or_default()))
                    .collect();
                let count = paragraphs.len();
                lines.splice(first - 1..=last + 1, paragraphs);
                first - 1 + count - 1
            }
            Some(_) => {
                lines[first - 1] = format!("<{}>", kind.tag());
                lines[last + 1] = format!("</{}>", kind.tag());
                last
            }
            None => {
                let mut items: Vec<String> = lines[first..=last]
                    .iter()
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| {
                        let inner = list_item(line)
                            .unwrap_or_else(|| strip_block(strip_alignment(line)));
                        format!("<li>{inner}</li>")
                    })
                    .collect();
                if items.is_empty() {
                    items.push("<li></li>".to_string());
                }
                let count = items.len();
                let mut block = Vec::with_capacity(count + 2);
                block.push(format!("<{}>", kind.tag()));
                block.extend(items);
                block.push(format!("</{}>", kind.tag()));
                lines.splice(first..=last, block);
                first + count
            }
        };
        self.replace_lines(lines, caret_line);
    }

    fn lines(&self) -> Vec<String> {
        self.markup.split('\n').map(str::to_string).collect()
    }

    fn line_index(&self, pos: usize) -> usize {
        self.markup[..pos].matches('\n').count()
    }

    /// First and last line touched by the selection
    fn selected_lines(&self) -> (usize, usize) {
        let Range { start, mut end } = self.selection();
        let first = self.line_index(start);
        if end > start && self.markup[..end].ends_with('\n') {
            end -= 1;
        }
        (first, self.line_index(end).max(first))
    }

    /// Replace the whole buffer, leaving the caret at the end of `caret_line`
    fn replace_lines(&mut self, lines: Vec<String>, caret_line: usize) {
        let caret_line = caret_line.min(lines.len().saturating_sub(1));
        let caret = lines[..=caret_line].iter().map(|l| l.len() + 1).sum::<usize>() - 1;
        self.markup = lines.join("\n");
        self.selection = caret..caret;
    }
}

impl EditingSurface for MarkupSurface {
    fn apply_command(&mut self, command: ToolbarCommand) {
        if let Some(tag) = command.inline_tag() {
            self.toggle_inline(tag);
        } else if let Some(alignment) = command.alignment() {
            self.align(alignment);
        } else if let Some(kind) = command.list_kind() {
            self.toggle_list(kind);
        } else if let ToolbarCommand::BlockFormat(kind) = command {
            self.format_block(kind);
        }
    }

    fn serialized_content(&self) -> String {
        self.markup.clone()
    }

    fn plain_text(&self) -> String {
        markup::plain_text(&self.markup)
    }

    fn selected_plain_text(&self) -> String {
        let Range { start, end } = self.selection();
        markup::plain_text(&self.markup[start..end])
    }

    fn set_serialized_content(&mut self, markup: &str) {
        if self.markup != markup {
            self.markup = markup.to_string();
        }
        let end = self.markup.len();
        self.selection = end..end;
    }

    fn insert_markup(&mut self, markup: &str) {
        let Range { start, end } = self.selection();
        self.markup.replace_range(start..end, markup);
        let caret = start + markup.len();
        self.selection = caret..caret;
    }
}

fn snap(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn alignment_of(line: &str) -> Option<Alignment> {
    let rest = line.strip_prefix(ALIGN_OPEN)?;
    let (css, _) = rest.split_once('"')?;
    [
        Alignment::Left,
        Alignment::Center,
        Alignment::Right,
        Alignment::Justify,
    ]
    .into_iter()
    .find(|a| a.css() == css)
}

fn strip_alignment(line: &str) -> &str {
    line.strip_prefix(ALIGN_OPEN)
        .and_then(|rest| rest.split_once("\">"))
        .and_then(|(_, inner)| inner.strip_suffix(ALIGN_CLOSE))
        .unwrap_or(line)
}

fn with_alignment(inner: &str, alignment: Alignment) -> String {
    match alignment {
        Alignment::Left => inner.to_string(),
        other => format!("{ALIGN_OPEN}{}\">{inner}{ALIGN_CLOSE}", other.css()),
    }
}

fn strip_block(line: &str) -> &str {
    BlockKind::ALL
        .iter()
        .find_map(|kind| {
            line.strip_prefix(&format!("<{}>", kind.tag()))
                .and_then(|rest| rest.strip_suffix(&format!("</{}>", kind.tag())))
        })
        .unwrap_or(line)
}

fn list_item(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix("<li>")
        .and_then(|rest| rest.strip_suffix("</li>"))
}

fn list_container(before: &str, after: &str) -> Option<ListKind> {
    [ListKind::Bullet, ListKind::Numbered].into_iter().find(|kind| {
        before.trim() == format!("<{}>", kind.tag()) && after.trim() == format!("</{}>", kind.tag())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(surface: &mut MarkupSurface, needle: &str) {
        let start = surface.markup().find(needle).unwrap();
        surface.set_selection(start..start + needle.len());
    }

    #[test]
    fn test_bold_wraps_and_unwraps_selection() {
        let mut surface = MarkupSurface::with_content("<p>make this bold</p>");
        select(&mut surface, "this");

        surface.apply_command(ToolbarCommand::Bold);
        assert_eq!(surface.markup(), "<p>make <b>this</b> bold</p>");
        assert_eq!(surface.selected_plain_text(), "this");

        surface.apply_command(ToolbarCommand::Bold);
        assert_eq!(surface.markup(), "<p>make this bold</p>");
        assert_eq!(surface.selected_plain_text(), "this");
    }

    #[test]
    fn test_inline_command_without_selection_is_no_op() {
        let mut surface = MarkupSurface::with_content("<p>text</p>");
        surface.apply_command(ToolbarCommand::Italic);
        assert_eq!(surface.markup(), "<p>text</p>");
    }

    #[test]
    fn test_alignment_rewraps_caret_line() {
        let mut surface = MarkupSurface::with_content("<p>one</p>\n<p>two</p>");
        surface.set_selection(2..2);

        surface.apply_command(ToolbarCommand::AlignCenter);
        assert_eq!(
            surface.markup(),
            "<div style=\"text-align: center\"><p>one</p></div>\n<p>two</p>"
        );

        surface.set_selection(2..2);
        surface.apply_command(ToolbarCommand::AlignRight);
        assert_eq!(
            surface.markup(),
            "<div style=\"text-align: right\"><p>one</p></div>\n<p>two</p>"
        );

        surface.set_selection(2..2);
        surface.apply_command(ToolbarCommand::AlignLeft);
        assert_eq!(surface.markup(), "<p>one</p>\n<p>two</p>");
    }

    #[test]
    fn test_block_format_replaces_block_tag() {
        let mut surface = MarkupSurface::with_content("<p>Intro</p>");
        surface.apply_command(ToolbarCommand::BlockFormat(BlockKind::Heading1));
        assert_eq!(surface.markup(), "<h1>Intro</h1>");

        surface.apply_command(ToolbarCommand::BlockFormat(BlockKind::Paragraph));
        assert_eq!(surface.markup(), "<p>Intro</p>");
    }

    #[test]
    fn test_block_format_keeps_alignment() {
        let mut surface =
            MarkupSurface::with_content("<div style=\"text-align: center\">Title</div>");
        surface.apply_command(ToolbarCommand::BlockFormat(BlockKind::Heading2));
        assert_eq!(
            surface.markup(),
            "<div style=\"text-align: center\"><h2>Title</h2></div>"
        );
    }

    #[test]
    fn test_list_wraps_selected_lines_and_toggles_off() {
        let mut surface = MarkupSurface::with_content("<p>a</p>\n<p>b</p>");
        surface.set_selection(0..surface.markup().len());

        surface.apply_command(ToolbarCommand::BulletList);
        assert_eq!(surface.markup(), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>");

        select(&mut surface, "<li>a</li>\n<li>b</li>");
        surface.apply_command(ToolbarCommand::NumberedList);
        assert_eq!(surface.markup(), "<ol>\n<li>a</li>\n<li>b</li>\n</ol>");

        select(&mut surface, "<li>a</li>\n<li>b</li>");
        surface.apply_command(ToolbarCommand::NumberedList);
        assert_eq!(surface.markup(), "<p>a</p>\n<p>b</p>");
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut surface = MarkupSurface::with_content("<p>see here</p>");
        select(&mut surface, "here");
        surface.insert_markup("[1]");
        assert_eq!(surface.markup(), "<p>see [1]</p>");
        assert!(surface.selected_plain_text().is_empty());
    }

    #[test]
    fn test_char_selection_handles_multibyte_text() {
        let mut surface = MarkupSurface::with_content("<p>héllo wörld</p>");
        surface.set_selection_chars(3, 8);
        assert_eq!(surface.selected_plain_text(), "héllo");
    }
}
