//! Toolbar formatting commands

/// Block-level format applied to the caret's line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Paragraph,
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
    ];

    /// Markup tag name for the block
    pub fn tag(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading1 => "h1",
            BlockKind::Heading2 => "h2",
            BlockKind::Heading3 => "h3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "Body",
            BlockKind::Heading1 => "Heading 1",
            BlockKind::Heading2 => "Heading 2",
            BlockKind::Heading3 => "Heading 3",
        }
    }
}

/// Horizontal alignment of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// CSS `text-align` value
    pub fn css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// List container kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

/// Formatting operations offered by the editor toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarCommand {
    Bold,
    Italic,
    Underline,
    AlignLeft,
    AlignCenter,
    AlignRight,
    AlignJustify,
    BulletList,
    NumberedList,
    BlockFormat(BlockKind),
}

impl ToolbarCommand {
    /// Commands shown as toolbar buttons, in display order
    pub const BUTTONS: [ToolbarCommand; 9] = [
        ToolbarCommand::Bold,
        ToolbarCommand::Italic,
        ToolbarCommand::Underline,
        ToolbarCommand::AlignLeft,
        ToolbarCommand::AlignCenter,
        ToolbarCommand::AlignRight,
        ToolbarCommand::AlignJustify,
        ToolbarCommand::BulletList,
        ToolbarCommand::NumberedList,
    ];

    /// Short button caption
    pub fn label(self) -> &'static str {
        match self {
            ToolbarCommand::Bold => "B",
            ToolbarCommand::Italic => "I",
            ToolbarCommand::Underline => "U",
            ToolbarCommand::AlignLeft => "\u{2261}L",
            ToolbarCommand::AlignCenter => "\u{2261}C",
            ToolbarCommand::AlignRight => "\u{2261}R",
            ToolbarCommand::AlignJustify => "\u{2261}J",
            ToolbarCommand::BulletList => "\u{2022} List",
            ToolbarCommand::NumberedList => "1. List",
            ToolbarCommand::BlockFormat(kind) => kind.label(),
        }
    }

    /// Hover text for the button
    pub fn description(self) -> &'static str {
        match self {
            ToolbarCommand::Bold => "Bold",
            ToolbarCommand::Italic => "Italic",
            ToolbarCommand::Underline => "Underline",
            ToolbarCommand::AlignLeft => "Align left",
            ToolbarCommand::AlignCenter => "Align center",
            ToolbarCommand::AlignRight => "Align right",
            ToolbarCommand::AlignJustify => "Justify",
            ToolbarCommand::BulletList => "Bulleted list",
            ToolbarCommand::NumberedList => "Numbered list",
            ToolbarCommand::BlockFormat(_) => "Block format",
        }
    }

    /// Inline tag wrapped around the selection, for inline commands
    pub fn inline_tag(self) -> Option<&'static str> {
        match self {
            ToolbarCommand::Bold => Some("b"),
            ToolbarCommand::Italic => Some("i"),
            ToolbarCommand::Underline => Some("u"),
            _ => None,
        }
    }

    pub fn alignment(self) -> Option<Alignment> {
        match self {
            ToolbarCommand::AlignLeft => Some(Alignment::Left),
            ToolbarCommand::AlignCenter => Some(Alignment::Center),
            ToolbarCommand::AlignRight => Some(Alignment::Right),
            ToolbarCommand::AlignJustify => Some(Alignment::Justify),
            _ => None,
        }
    }

    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            ToolbarCommand::BulletList => Some(ListKind::Bullet),
            ToolbarCommand::NumberedList => Some(ListKind::Numbered),
            _ => None,
        }
    }
}
