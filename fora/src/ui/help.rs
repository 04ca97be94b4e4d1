//! Modal overlays for fora: help, operation notices and quit confirmation.
//!
//! Each overlay is drawn inside the same `terminal.draw()` closure as the panels:
//! `frame.render_widget(Clear, area)` erases the background first, then a
//! bordered `Paragraph` is drawn on top.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal on top of the 3-panel layout.
///
/// Skipped on terminals narrower than 60 columns to avoid a zero-height `Rect`.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help (j/k scroll, ? or Esc to dismiss) ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Move down / up (topics, drafts) or scroll"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Half page down / up"),
        Line::from("  Ctrl-f / b    Full page down / up"),
        Line::from("  H / L, Tab    Move panel focus left / right"),
        Line::from("  { / }         Previous / next topic from any panel"),
        Line::from("  < / >         Shrink / grow the detail panel"),
        Line::from("  R             Reload all results"),
        Line::from(""),
        Line::from("Setup and results"),
        Line::from("  r             Run the full analysis"),
        Line::from("  d             Discover themes and open the editor"),
        Line::from("  e             Edit the classified themes"),
        Line::from("  t / T         Next / previous theme"),
        Line::from("  Enter         Show the theme's sample answers (detail panel)"),
        Line::from(""),
        Line::from("Theme editor"),
        Line::from("  a             Add a theme"),
        Line::from("  x             Delete the selected theme"),
        Line::from("  i / Enter     Rename the selected theme"),
        Line::from("  I             Edit its description"),
        Line::from("  d             Re-discover with instructions"),
        Line::from("  c             Classify answers with these themes"),
        Line::from("  b / Esc       Back to results, discarding edits"),
        Line::from(""),
        Line::from("Chat"),
        Line::from("  /             Type a question"),
        Line::from("  C             Open / close the chat panel"),
        Line::from(""),
        Line::from("Insert mode"),
        Line::from("  Enter         Apply"),
        Line::from("  Esc           Cancel"),
        Line::from("  Ctrl-u        Clear the line"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit (confirms if the editor holds themes)"),
    ])
}

fn small_modal(frame: &Frame, height: u16) -> Rect {
    let width = frame.area().width.saturating_sub(4).min(64);
    frame
        .area()
        .centered(Constraint::Length(width), Constraint::Length(height))
}

/// Renders a failed operation's message; dismissed with Enter or Esc.
pub fn render_notice(frame: &mut Frame, theme: &Theme, message: &str) {
    let area = small_modal(frame, 6);
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Notice ")
        .border_style(Style::default().fg(theme.notice_border));
    let text = Text::from(vec![
        Line::from(message.to_owned()),
        Line::from(""),
        Line::styled("Enter to dismiss", Style::default().fg(theme.muted)),
    ]);
    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

pub fn render_confirm_quit(frame: &mut Frame, theme: &Theme) {
    let area = small_modal(frame, 4);
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Quit ")
        .border_style(Style::default().fg(theme.border_active));
    frame.render_widget(
        Paragraph::new("Unclassified theme edits will be lost. Quit? (y/n)")
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}
