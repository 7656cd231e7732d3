use crate::app::{App, InputMode, Screen};
use crate::controller::Level;
use crate::models::{Priority, StatusFilter, Task};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

/// Category colors are stored as `#RRGGBB`.
fn category_color(hex: &str) -> Color {
    hex.parse::<Color>().unwrap_or(Color::Gray)
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Blue),
    }
}

fn key_hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Red)),
        Span::raw(label),
    ]
}

fn get_legend(screen: Screen, input_mode: InputMode) -> Text<'static> {
    let hints: Vec<[Span<'static>; 2]> = match (input_mode, screen) {
        (InputMode::Normal, Screen::Tasks) => vec![
            key_hint(" q ", ": Quit "),
            key_hint(" j/k ", ": Move "),
            key_hint(" a ", ": Add "),
            key_hint(" space ", ": Toggle Done "),
            key_hint(" e ", ": Edit "),
            key_hint(" A ", ": Archive "),
            key_hint(" d ", ": Delete "),
            key_hint(" / ", ": Search "),
            key_hint(" f ", ": Status "),
            key_hint(" c ", ": Category "),
            key_hint(" r ", ": Reload "),
            key_hint(" Tab ", ": Archive View "),
        ],
        (InputMode::Normal, Screen::Archive) => vec![
            key_hint(" q ", ": Quit "),
            key_hint(" j/k ", ": Move "),
            key_hint(" u ", ": Restore "),
            key_hint(" d ", ": Delete Forever "),
            key_hint(" / ", ": Search "),
            key_hint(" r ", ": Reload "),
            key_hint(" Tab ", ": Tasks View "),
        ],
        (InputMode::Search, _) => vec![
            key_hint(" Enter ", ": Keep Filter "),
            key_hint(" Esc ", ": Clear "),
        ],
        (InputMode::Create, _) => vec![
            key_hint(" Enter ", ": Submit "),
            key_hint(" Esc ", ": Cancel "),
            key_hint(" !high #category due:YYYY-MM-DD ", ""),
        ],
        (InputMode::Edit, _) => vec![
            key_hint(" Enter ", ": Save "),
            key_hint(" Esc ", ": Cancel "),
        ],
        (InputMode::ConfirmPurge(_), _) => vec![
            key_hint(" y ", ": Delete "),
            key_hint(" n ", ": Keep "),
        ],
    };
    Text::from(Line::from(hints.into_iter().flatten().collect::<Vec<_>>()))
}

fn task_line(task: &Task, category: Option<(&str, &str)>, overdue: bool) -> Line<'static> {
    let mut spans = vec![
        Span::raw(if task.completed { "[x] " } else { "[ ] " }),
        Span::styled(
            task.title.clone(),
            if task.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            },
        ),
        Span::raw(" "),
        Span::styled(format!("!{}", task.priority), priority_style(task.priority)),
    ];
    if let Some((name, color)) = category {
        spans.push(Span::styled(
            format!(" #{}", name),
            Style::default().fg(category_color(color)),
        ));
    }
    if let Some(due) = task.due_date {
        spans.push(Span::raw(format!(" due {}", due.format("%Y-%m-%d"))));
        if overdue {
            spans.push(Span::styled(
                " OVERDUE",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
    }
    Line::from(spans)
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(area);

    let today = Paragraph::new(format!("{} completed today", app.tasks.completed_today()))
        .block(Block::default().borders(Borders::ALL).title("Today"));
    f.render_widget(today, chunks[0]);

    let summary = app.tasks.category_summary();
    let items: Vec<ListItem> = summary
        .rows
        .iter()
        .map(|row| {
            let selected = app.tasks.selected_category == Some(row.id);
            let marker = if selected { "> " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled("● ", Style::default().fg(category_color(&row.color))),
                Span::raw(row.name.clone()),
                Span::styled(
                    format!(" ({})", row.task_count),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let title = if app.tasks.selected_category.is_none() {
        "Categories (all)"
    } else {
        "Categories"
    };
    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(title)),
        chunks[1],
    );

    let stats = Paragraph::new(vec![
        Line::from(format!("Active:    {}", summary.active_total)),
        Line::from(format!("Completed: {}", summary.completed_total)),
    ])
    .block(Block::default().borders(Borders::ALL).title("Quick Stats"));
    f.render_widget(stats, chunks[2]);
}

fn draw_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Percentage(72)].as_ref())
        .split(area);
    draw_sidebar(f, app, columns[0]);

    let banner_height = if app.tasks.error.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(0),
        ])
        .split(columns[1]);

    let counts = app.tasks.status_counts();
    let titles: Vec<Line> = StatusFilter::ALL
        .iter()
        .map(|status| Line::from(format!("{} ({})", status.label(), counts.get(*status))))
        .collect();
    let selected_tab = StatusFilter::ALL
        .iter()
        .position(|s| *s == app.tasks.status_filter)
        .unwrap_or(0);
    let search_title = if app.tasks.search_query.is_empty() {
        "Tasks".to_string()
    } else {
        format!("Tasks matching \"{}\"", app.tasks.search_query)
    };
    let tabs = Tabs::new(titles)
        .select(selected_tab)
        .block(Block::default().borders(Borders::ALL).title(search_title))
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    if let Some(error) = &app.tasks.error {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(error.clone(), Style::default().fg(Color::Red)),
            Span::raw("  press "),
            Span::styled("r", Style::default().fg(Color::Red)),
            Span::raw(" to retry"),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Error"));
        f.render_widget(banner, chunks[1]);
    }

    let list_block = Block::default().borders(Borders::ALL);
    if app.tasks.loading {
        f.render_widget(
            Paragraph::new("Loading tasks...").block(list_block),
            chunks[2],
        );
        return;
    }

    let editing = app.tasks.editing().cloned();
    let items: Vec<ListItem> = app
        .tasks
        .filtered_tasks()
        .into_iter()
        .map(|task| match &editing {
            Some(edit) if edit.task_id == task.id => ListItem::new(Line::from(vec![
                Span::styled("edit: ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{}_", edit.draft)),
            ])),
            _ => {
                let category = app
                    .tasks
                    .category_for(task)
                    .map(|c| (c.name.as_str(), c.color.as_str()));
                ListItem::new(task_line(task, category, app.tasks.is_overdue(task)))
            }
        })
        .collect();

    let list = if items.is_empty() {
        List::new(vec![ListItem::new("No tasks found")]).block(list_block)
    } else {
        List::new(items)
            .block(list_block)
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ")
    };
    f.render_stateful_widget(list, chunks[2], &mut app.state);
}

fn draw_archive(f: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.archive.search_query.is_empty() {
        format!("Archive ({})", app.archive.tasks.len())
    } else {
        format!("Archive matching \"{}\"", app.archive.search_query)
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if app.archive.loading {
        f.render_widget(Paragraph::new("Loading archived tasks...").block(block), area);
        return;
    }
    if let Some(error) = &app.archive.error {
        let banner = Paragraph::new(format!("{}  press r to retry", error))
            .style(Style::default().fg(Color::Red))
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(banner, area);
        return;
    }

    let items: Vec<ListItem> = app
        .archive
        .filtered_tasks()
        .into_iter()
        .map(|task| {
            let category = app
                .archive
                .category_for(task)
                .map(|c| (c.name.as_str(), c.color.as_str()));
            ListItem::new(task_line(task, category, false))
        })
        .collect();

    let list = if items.is_empty() {
        List::new(vec![ListItem::new("No archived tasks")]).block(block)
    } else {
        List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ")
    };
    f.render_stateful_widget(list, area, &mut app.archive_state);
}

fn draw_create_popup(f: &mut Frame, app: &App, area: Rect) {
    let popup_width = (area.width / 10 * 6).saturating_sub(2).max(10);
    let lines_required = calculate_wrapped_lines(&app.new_task_input, popup_width).max(1);
    let error_lines = if app.form_error.is_some() { 1 } else { 0 };
    let popup_height = std::cmp::min(
        lines_required as u16 + error_lines + 2,
        area.height.saturating_sub(2),
    );
    let popup_area = centered_rect_absolute(popup_width + 2, popup_height, area);

    let mut lines = vec![Line::from(app.new_task_input.clone())];
    if let Some(error) = &app.form_error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let popup_block = Block::default()
        .title("New Task (Press Enter to Submit)")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    let input = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(popup_block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App, area: Rect) {
    let InputMode::ConfirmPurge(id) = app.input_mode else {
        return;
    };
    let title = app
        .archive
        .tasks
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.title.as_str())
        .unwrap_or("this task");
    let popup_area = centered_rect_absolute(50, 5, area);
    let prompt = Paragraph::new(vec![
        Line::from(format!("Delete \"{}\" permanently?", title)),
        Line::from("This cannot be undone. (y/n)"),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Confirm")
            .style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, popup_area);
    f.render_widget(prompt, popup_area);
}

fn draw_toast(f: &mut Frame, app: &App, area: Rect) {
    let Some(toast) = app.active_toast() else {
        return;
    };
    let width = std::cmp::min(toast.message.chars().count() as u16 + 4, area.width);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width),
        y: area.y,
        width,
        height: std::cmp::min(3, area.height),
    };
    let color = match toast.level {
        Level::Success => Color::Green,
        Level::Error => Color::Red,
    };
    let widget = Paragraph::new(toast.message.clone())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(Clear, toast_area);
    f.render_widget(widget, toast_area);
}

fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    // Split the main layout into body and footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(size);

    let body_chunk = chunks[0];
    let footer_chunk = chunks[1];

    match app.screen {
        Screen::Tasks => draw_tasks(f, app, body_chunk),
        Screen::Archive => draw_archive(f, app, body_chunk),
    }

    match app.input_mode {
        InputMode::Create => draw_create_popup(f, app, body_chunk),
        InputMode::ConfirmPurge(_) => draw_confirm_popup(f, app, body_chunk),
        _ => {}
    }
    draw_toast(f, app, body_chunk);

    let legend = Paragraph::new(get_legend(app.screen, app.input_mode))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(legend, footer_chunk);
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    // First frame shows the loading state while the initial fetch runs.
    app.tasks.loading = true;
    terminal.draw(|f| draw(f, &mut app))?;
    app.refresh().await;

    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_input(key).await {
                    return Ok(());
                }
            }
        }
    }
}

fn calculate_wrapped_lines(text: &str, max_width: u16) -> usize {
    let max_width = max_width.max(1) as usize;
    text.lines()
        .map(|line| line.chars().count().div_ceil(max_width).max(1))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CounterPolicy;
    use crate::store::local::Latency;
    use crate::store::Stores;
    use ratatui::backend::TestBackend;

    fn rendered(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_calculate_wrapped_lines() {
        assert_eq!(calculate_wrapped_lines("", 10), 0);
        assert_eq!(calculate_wrapped_lines("short", 10), 1);
        assert_eq!(calculate_wrapped_lines("exactly ten", 5), 3);
        assert_eq!(calculate_wrapped_lines("a\nb", 0), 2);
    }

    #[test]
    fn test_category_color_falls_back_to_gray() {
        assert_eq!(category_color("#EF4444"), Color::Rgb(0xEF, 0x44, 0x44));
        assert_eq!(category_color("not a color"), Color::Gray);
    }

    #[tokio::test]
    async fn test_tasks_screen_renders_sidebar_and_tabs() {
        let mut app = App::new(Stores::seeded(Latency::none()), CounterPolicy::Stored);
        app.refresh().await;
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let screen = rendered(&terminal);
        assert!(screen.contains("Quick Stats"));
        assert!(screen.contains("Prepare quarterly report"));
        assert!(screen.contains(&format!("All ({})", app.tasks.status_counts().all)));
        assert!(!screen.contains("Renew passport"));
    }

    #[tokio::test]
    async fn test_create_popup_on_very_wide_terminal() {
        let mut app = App::new(Stores::seeded(Latency::none()), CounterPolicy::Stored);
        app.refresh().await;
        app.input_mode = InputMode::Create;
        app.new_task_input = "Wide screen task".to_string();
        let mut terminal = Terminal::new(TestBackend::new(1200, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();

        assert!(rendered(&terminal).contains("Wide screen task"));
    }

    #[tokio::test]
    async fn test_loading_state_hides_list() {
        let mut app = App::new(Stores::seeded(Latency::none()), CounterPolicy::Stored);
        app.tasks.loading = true;
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();

        assert!(rendered(&terminal).contains("Loading tasks..."));
    }
}
