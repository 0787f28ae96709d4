//! Terminal UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use draftloop_core::{App, Focus, HighlightColor, Mode, Palette, SectionAction, StatusLevel};

// Catppuccin Mocha colors
const BASE: Color = Color::Rgb(30, 30, 46);
const SURFACE0: Color = Color::Rgb(49, 50, 68);
const SURFACE1: Color = Color::Rgb(69, 71, 90);
const TEXT: Color = Color::Rgb(205, 214, 244);
const SUBTEXT0: Color = Color::Rgb(166, 173, 200);
const RED: Color = Color::Rgb(243, 139, 168);
const YELLOW: Color = Color::Rgb(249, 226, 175);
const GREEN: Color = Color::Rgb(166, 227, 161);
const BLUE: Color = Color::Rgb(137, 180, 250);
const MAUVE: Color = Color::Rgb(203, 166, 247);
const TEAL: Color = Color::Rgb(148, 226, 213);

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Length(3), // Prompt
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    draw_prompt(frame, app, chunks[1]);
    draw_main_area(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    // Draw popups/overlays
    match app.mode {
        Mode::ColorPicker => draw_color_picker(frame, app),
        Mode::SectionPicker => draw_section_picker(frame, app),
        Mode::Input => draw_input_dialog(frame, app),
        Mode::Help => draw_help(frame),
        Mode::Normal => {}
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let count = app.document.annotations().len();
    let current = if count > 0 { app.sidebar_selected + 1 } else { 0 };

    let title_text = format!(" Draftloop - {} [{}/{}]", app.title(), current, count);

    let title_bar = Paragraph::new(title_text).style(Style::default().fg(TEXT).bg(SURFACE0));

    frame.render_widget(title_bar, area);
}

fn draw_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let flags: Vec<Span> = app
        .options
        .flags()
        .iter()
        .enumerate()
        .flat_map(|(i, (label, on))| {
            let style = if *on {
                Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(SUBTEXT0)
            };
            [
                Span::styled(format!(" {}:{}", i + 1, label), style),
                Span::raw(" "),
            ]
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SUBTEXT0))
        .title("Bid prompt (p edit, g generate)")
        .title(Line::from(flags).right_aligned());

    let prompt = Paragraph::new(app.prompt.as_str())
        .style(Style::default().fg(TEXT))
        .block(block);
    frame.render_widget(prompt, area);
}

fn draw_main_area(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Draft
            Constraint::Length(36), // Sidebar
        ])
        .split(area);

    draw_draft(frame, app, chunks[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    draw_sidebar(frame, app, side[0]);
    draw_analysis(frame, app, side[1]);
}

fn draw_draft(frame: &mut Frame, app: &App, area: Rect) {
    let border = if app.focus == Focus::Draft {
        Style::default().fg(BLUE)
    } else {
        Style::default().fg(SUBTEXT0)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title("Draft");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.document.is_empty() {
        let hint = Paragraph::new("No draft yet. Press 'g' to generate one from the prompt.")
            .style(Style::default().fg(SUBTEXT0))
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, inner);
        return;
    }

    // Style each line by the highlight ranges it intersects
    let plan = app.document.highlight_plan();
    let text: &str = &plan.text;
    let mut lines: Vec<Line> = Vec::new();
    let mut line_start = 0;

    for line_text in text.split('\n') {
        let line_end = line_start + line_text.len();
        let mut spans: Vec<Span> = Vec::new();
        let mut pos = line_start;

        for h in plan
            .highlights
            .iter()
            .filter(|h| h.range.start_offset < line_end && h.range.end_offset > line_start)
        {
            let start = h.range.start_offset.max(line_start);
            let end = h.range.end_offset.min(line_end);
            if start > pos {
                spans.push(Span::styled(&text[pos..start], Style::default().fg(TEXT)));
            }
            let mut style = Style::default().fg(BASE).bg(highlight_color(&h.annotation.color));
            if h.index == app.sidebar_selected {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            spans.push(Span::styled(&text[start..end], style));
            pos = end;
        }
        if pos < line_end {
            spans.push(Span::styled(&text[pos..line_end], Style::default().fg(TEXT)));
        }

        lines.push(Line::from(spans));
        line_start = line_end + 1; // +1 for newline
    }

    let paragraph = Paragraph::new(lines)
        .scroll((app.scroll.min(u16::MAX as usize) as u16, 0))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, inner);
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let border = if app.focus == Focus::Sidebar {
        Style::default().fg(BLUE)
    } else {
        Style::default().fg(SUBTEXT0)
    };

    let annotations = app.document.annotations();
    let stale = app.document.stale_annotations();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!("Highlights ({})", annotations.len()));

    let items: Vec<ListItem> = annotations
        .iter()
        .enumerate()
        .map(|(i, ann)| {
            let selected = i == app.sidebar_selected;
            let marker = if selected { ">" } else { " " };
            let is_stale = stale.contains(&i);

            let text_preview: String = ann
                .match_text
                .chars()
                .take(18)
                .collect::<String>()
                .replace('\n', " ");

            let line1 = format!(
                "{} {}\"{}\"",
                marker,
                if is_stale { "[stale] " } else { "" },
                text_preview
            );
            let line2 = format!("   {}", ann.comment.chars().take(28).collect::<String>());

            let style = if selected {
                Style::default().fg(TEXT).bg(SURFACE1)
            } else if is_stale {
                Style::default().fg(SUBTEXT0).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(TEXT)
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(highlight_color(&ann.color))),
                    Span::styled(line1, style),
                ]),
                Line::from(Span::styled(line2, style.fg(SUBTEXT0))),
            ])
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn draw_analysis(frame: &mut Frame, app: &App, area: Rect) {
    let (title, body) = match &app.analysis {
        Some(analysis) => (analysis.heading.as_str(), analysis.body.as_str()),
        None => ("Analysis", ""),
    };
    let style = if body.starts_with("Error:") {
        Style::default().fg(RED)
    } else {
        Style::default().fg(TEXT)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SUBTEXT0))
        .title(title.to_string());

    let paragraph = Paragraph::new(body)
        .style(style)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_str = match app.mode {
        Mode::Normal => "NORMAL",
        Mode::Input => "INPUT",
        Mode::ColorPicker => "COLOR",
        Mode::SectionPicker => "SECTION",
        Mode::Help => "HELP",
    };

    let help_hint = "g generate | h highlight | a append | x remove | s section | e export | ? help";

    let (text, fg) = match &app.status {
        Some(status) => (
            status.text.as_str(),
            match status.level {
                StatusLevel::Info => SUBTEXT0,
                StatusLevel::Success => GREEN,
                StatusLevel::Warning => YELLOW,
            },
        ),
        None => (help_hint, SUBTEXT0),
    };

    let status_bar =
        Paragraph::new(format!(" {} | {}", mode_str, text)).style(Style::default().fg(fg).bg(SURFACE0));

    frame.render_widget(status_bar, area);
}

fn draw_color_picker(frame: &mut Frame, app: &App) {
    let area = centered_rect(40, 10, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MAUVE))
        .title("Highlight color (j/k, Enter)");

    let mut items: Vec<ListItem> = Palette::all()
        .iter()
        .enumerate()
        .map(|(i, palette)| {
            let selected = i == app.color_selected;
            let marker = if selected { ">" } else { " " };
            let swatch = highlight_color(&HighlightColor::from(*palette));
            let style = if selected {
                Style::default().fg(TEXT).bg(SURFACE1)
            } else {
                Style::default().fg(TEXT)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {} ", i + 1, marker), style),
                Span::styled("■ ", Style::default().fg(swatch)),
                Span::styled(format!("{} {}", palette.as_str(), palette.hex()), style),
            ]))
        })
        .collect();

    let custom_selected = app.color_selected == Palette::all().len();
    items.push(
        ListItem::new(format!(
            "{} {} Custom...",
            Palette::all().len() + 1,
            if custom_selected { ">" } else { " " }
        ))
        .style(if custom_selected {
            Style::default().fg(TEAL).bg(SURFACE1)
        } else {
            Style::default().fg(TEAL)
        }),
    );

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn draw_section_picker(frame: &mut Frame, app: &App) {
    let area = centered_rect(40, 8, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MAUVE))
        .title("Section action (j/k, Enter)");

    let items: Vec<ListItem> = SectionAction::all()
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let selected = i == app.section_selected;
            let marker = if selected { ">" } else { " " };
            let color = match action {
                SectionAction::Flag => RED,
                SectionAction::Analyze(_) => TEAL,
            };
            let style = if selected {
                Style::default().fg(color).bg(SURFACE1)
            } else {
                Style::default().fg(color)
            };
            ListItem::new(format!("{} {} {}", i + 1, marker, action.as_str())).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn draw_input_dialog(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 7, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(GREEN))
        .title(app.input_target.title());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input = Paragraph::new(format!("{}_", app.input_buffer))
        .style(Style::default().fg(TEXT))
        .wrap(Wrap { trim: false });
    frame.render_widget(input, inner);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(60, 26, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title("Help (press any key to close)");

    let heading = |s: &'static str| {
        Line::from(Span::styled(s, Style::default().fg(MAUVE).add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        heading("Drafting"),
        Line::from("  p        Edit bid prompt"),
        Line::from("  1/2/3    Toggle honesty/sources/confidence"),
        Line::from("  g        Generate draft (clears highlights)"),
        Line::from("  R        Revise draft from highlights"),
        Line::from(""),
        heading("Review"),
        Line::from("  h        Highlight text with a comment"),
        Line::from("  a        Append a correction"),
        Line::from("  x        Remove text"),
        Line::from("  c        Replace text"),
        Line::from("  s        Explain/cite/summarize/flag a section"),
        Line::from("  d        Delete selected highlight"),
        Line::from(""),
        heading("Navigation"),
        Line::from("  j/k      Scroll (or select in sidebar)"),
        Line::from("  ]/[      Next/prev highlight"),
        Line::from("  Tab      Toggle draft/sidebar"),
        Line::from(""),
        heading("Export"),
        Line::from("  e        Write text, HTML and JSON to ~/.draftloop"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(SUBTEXT0))),
    ];

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

fn highlight_color(color: &HighlightColor) -> Color {
    color
        .rgb()
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(YELLOW)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
