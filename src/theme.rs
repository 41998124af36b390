use ratatui::style::{Color, Modifier, Style};

/// Colours of the portfolio window
#[derive(Clone, Debug)]
pub struct Theme {
    /// Background of the whole window
    pub background: Color,

    /// Foreground of the top bar
    pub top_bar_fg: Color,

    /// Background of the top bar
    pub top_bar_bg: Color,

    /// Workspace label that is currently shown
    pub workspace_active_fg: Color,

    /// Foreground of tree entries
    pub tree_fg: Color,

    /// Colour of folder entries and icons in the tree
    pub tree_folder_fg: Color,

    /// Foreground of the selected tree entry
    pub tree_selected_fg: Color,

    /// Background of the selected tree entry
    pub tree_selected_bg: Color,

    /// Colour of the tree entry of the page that is open
    pub tree_current_fg: Color,

    /// Line numbers
    pub gutter_fg: Color,

    /// Line number of the row holding the cursor
    pub gutter_current_fg: Color,

    /// Foreground of the cell under the cursor
    pub cursor_fg: Color,

    /// Background of the cell under the cursor
    pub cursor_bg: Color,

    /// Background of the rows of the container holding the cursor
    pub active_line_bg: Color,

    pub heading_color: Color,
    pub link_color: Color,
    pub code_color: Color,

    /// List bullets and quote bars
    pub prefix_color: Color,

    /// Foreground of the status line
    pub status_fg: Color,

    /// Background of the status line
    pub status_bg: Color,

    /// Background of the mode label in the status line
    pub mode_bg: Color,

    /// Colour of diagnostic messages in the status line
    pub message_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            top_bar_fg: Color::Gray,
            top_bar_bg: Color::Black,
            workspace_active_fg: Color::LightCyan,
            tree_fg: Color::Gray,
            tree_folder_fg: Color::LightBlue,
            tree_selected_fg: Color::White,
            tree_selected_bg: Color::DarkGray,
            tree_current_fg: Color::LightYellow,
            gutter_fg: Color::DarkGray,
            gutter_current_fg: Color::LightYellow,
            cursor_fg: Color::Black,
            cursor_bg: Color::LightGreen,
            active_line_bg: Color::Rgb(40, 44, 52),
            heading_color: Color::LightMagenta,
            link_color: Color::Blue,
            code_color: Color::LightGreen,
            prefix_color: Color::DarkGray,
            status_fg: Color::White,
            status_bg: Color::Rgb(30, 30, 46),
            mode_bg: Color::Blue,
            message_fg: Color::LightRed,
        }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top_bar_style(&self) -> Style {
        Style::default().fg(self.top_bar_fg).bg(self.top_bar_bg)
    }

    pub fn workspace_active_style(&self) -> Style {
        self.top_bar_style()
            .fg(self.workspace_active_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tree_style(&self) -> Style {
        Style::default().fg(self.tree_fg)
    }

    pub fn tree_folder_style(&self) -> Style {
        Style::default().fg(self.tree_folder_fg)
    }

    /// Style of the selected tree entry while the tree has focus
    pub fn tree_selected_style(&self) -> Style {
        Style::default()
            .fg(self.tree_selected_fg)
            .bg(self.tree_selected_bg)
    }

    pub fn tree_current_style(&self) -> Style {
        Style::default()
            .fg(self.tree_current_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn gutter_style(&self) -> Style {
        Style::default().fg(self.gutter_fg)
    }

    pub fn gutter_current_style(&self) -> Style {
        Style::default().fg(self.gutter_current_fg)
    }

    /// Style of the single cell the cursor sits on
    pub fn cursor_style(&self) -> Style {
        Style::default().fg(self.cursor_fg).bg(self.cursor_bg)
    }

    /// Style applied to every row of the active container
    pub fn active_line_style(&self) -> Style {
        Style::default().bg(self.active_line_bg)
    }

    pub fn heading_style(&self, level: u8) -> Style {
        let style = Style::default()
            .fg(self.heading_color)
            .add_modifier(Modifier::BOLD);
        if level == 1 {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        }
    }

    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_color)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code_color)
    }

    pub fn prefix_style(&self) -> Style {
        Style::default().fg(self.prefix_color)
    }

    pub fn status_style(&self) -> Style {
        Style::default().fg(self.status_fg).bg(self.status_bg)
    }

    pub fn mode_style(&self) -> Style {
        Style::default()
            .fg(self.status_fg)
            .bg(self.mode_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Style of transient messages such as boundary hits
    pub fn message_style(&self) -> Style {
        self.status_style().fg(self.message_fg)
    }
}
