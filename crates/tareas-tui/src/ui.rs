use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, NoticeKind};
use tareas_shared::{Task, TaskPriority, TaskStatus};

fn status_tag(status: TaskStatus) -> (&'static str, Color) {
    match status {
        TaskStatus::Pendiente => ("pendiente", Color::Yellow),
        TaskStatus::EnProgreso => ("en progreso", Color::Blue),
        TaskStatus::Completada => ("completada", Color::Green),
        TaskStatus::Rechazada => ("rechazada", Color::Red),
    }
}

/// Returns (symbol, color) for a task's priority indicator
fn priority_indicator(priority: TaskPriority) -> (&'static str, Color) {
    match priority {
        TaskPriority::Alta => ("●", Color::Red),
        TaskPriority::Media => ("●", Color::Yellow),
        TaskPriority::Baja => ("●", Color::DarkGray),
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_main(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);

    match app.input_mode {
        InputMode::NewTask => draw_input_popup(f, " Nueva Tarea ", &app.new_task_title),
        InputMode::VoicePath => draw_input_popup(f, " Archivo de audio ", &app.voice_path),
        _ => {}
    }

    if let Some(ref notice) = app.notice {
        if notice.kind == NoticeKind::Error {
            draw_error_popup(f, &notice.message);
        }
    }

    if app.loading {
        draw_loading_overlay(f, &app.loading_message);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            "TAREAS",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("{} tareas", app.visible().len()),
            Style::default().fg(Color::Yellow),
        ),
    ];

    if let Some(status) = app.status_filter {
        let (label, color) = status_tag(status);
        spans.push(Span::raw(" | estado: "));
        spans.push(Span::styled(label, Style::default().fg(color)));
    }
    if let Some(priority) = app.priority_filter {
        let (_, color) = priority_indicator(priority);
        spans.push(Span::raw(" | prioridad: "));
        spans.push(Span::styled(priority.as_str(), Style::default().fg(color)));
    }
    if !app.search.is_empty() || app.input_mode == InputMode::Search {
        spans.push(Span::raw(" | /"));
        spans.push(Span::styled(
            app.search.as_str(),
            Style::default().fg(Color::Magenta),
        ));
    }

    let header =
        Paragraph::new(vec![Line::from(spans)]).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    let expanded = app
        .selected_task()
        .and_then(|t| app.thread(&t.id))
        .map(|t| t.expanded)
        .unwrap_or(false);

    if !expanded {
        draw_task_list(f, area, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_task_list(f, chunks[0], app);
    draw_comments(f, chunks[1], app);
}

fn draw_task_list(f: &mut Frame, area: Rect, app: &App) {
    let visible = app.visible();

    if visible.is_empty() {
        let empty = Paragraph::new("No hay tareas. Pulsa 'n' para crear una.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Tareas "));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(row, &idx)| task_row(app, row, &app.tasks[idx]))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Tareas ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(list, area);
}

fn task_row<'a>(app: &App, row: usize, task: &'a Task) -> ListItem<'a> {
    let selected = row == app.selected;
    let bg = if selected {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };

    let (symbol, priority_color) = priority_indicator(task.priority);
    let (status_label, status_color) = status_tag(task.status);
    let count = app.thread(&task.id).map(|t| t.count).unwrap_or(0);

    let mut spans = vec![
        Span::styled(" ", bg),
        Span::styled(symbol, bg.fg(priority_color)),
        Span::styled(" ", bg),
        Span::styled(&task.title, bg.fg(Color::White)),
        Span::styled(" ", bg),
        Span::styled(format!("[{}]", status_label), bg.fg(status_color)),
        Span::styled(format!(" 💬{}", count), bg.fg(Color::DarkGray)),
    ];

    if let Some(deadline) = task.deadline {
        spans.push(Span::styled(
            format!("  {}", deadline.format("%d %b")),
            bg.fg(Color::DarkGray),
        ));
    }

    ListItem::new(Line::from(spans))
}

fn draw_comments(f: &mut Frame, area: Rect, app: &App) {
    let Some(task) = app.selected_task() else {
        return;
    };
    let Some(thread) = app.thread(&task.id) else {
        return;
    };

    let writing = app.input_mode == InputMode::Comment || thread.submitting;
    let constraints = if writing {
        vec![Constraint::Min(0), Constraint::Length(3)]
    } else {
        vec![Constraint::Min(0)]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    // Comments list, newest first
    let items: Vec<ListItem> = thread
        .comments
        .iter()
        .map(|comment| {
            let timestamp = comment.created_at.format("%d/%m %H:%M").to_string();
            let voice_mark = if comment.voice { "🎤 " } else { "" };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} ", comment.author_name),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        format!("[{}]", timestamp),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(vec![
                    Span::raw("  "),
                    Span::raw(voice_mark),
                    Span::raw(comment.content.as_str()),
                ]),
            ])
        })
        .collect();

    let title = if thread.loaded {
        format!(" Comentarios ({}) ", thread.count)
    } else {
        " Comentarios ".to_string()
    };
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(list, chunks[0]);

    if writing {
        let title = if thread.submitting {
            " Enviando... "
        } else {
            " Nuevo comentario "
        };
        let input_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let input = Paragraph::new(app.comment_input.as_str()).block(input_block);
        f.render_widget(input, chunks[1]);

        if app.input_mode == InputMode::Comment {
            f.set_cursor_position((
                chunks[1].x + 1 + app.comment_input.len() as u16,
                chunks[1].y + 1,
            ));
        }
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (mode, mode_color) = match app.input_mode {
        InputMode::Normal => ("NORMAL", Color::Blue),
        InputMode::Search => ("BUSCAR", Color::Magenta),
        InputMode::Comment => ("COMENTAR", Color::Green),
        InputMode::NewTask => ("CREAR", Color::Green),
        InputMode::VoicePath => ("VOZ", Color::Green),
    };

    let hints = match app.input_mode {
        InputMode::Normal => {
            "j/k: mover | c: comentarios | i: comentar | v: voz | n: nueva | p/d: estado | s/f: filtros | r: recargar | q: salir"
        }
        InputMode::Search => "Escribe para filtrar | Enter: aplicar | Esc: normal",
        InputMode::Comment => "Enter: publicar | Esc: cancelar",
        InputMode::NewTask => "Enter: crear | Esc: cancelar",
        InputMode::VoicePath => "Ruta del archivo | Enter: transcribir | Esc: cancelar",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode),
            Style::default().bg(mode_color).fg(Color::White),
        ),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ];

    if let Some(ref notice) = app.notice {
        if notice.kind == NoticeKind::Info {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                notice.message.as_str(),
                Style::default().fg(Color::Green),
            ));
        }
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_input_popup(f: &mut Frame, title: &str, value: &str) {
    let area = centered_rect(50, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Input
            Constraint::Length(2), // Hint
            Constraint::Min(0),    // Spacer
        ])
        .split(inner);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let input = Paragraph::new(value).block(input_block);
    f.render_widget(input, chunks[0]);

    let hint = Paragraph::new("Enter: aceptar | Esc: cancelar")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);

    f.set_cursor_position((chunks[0].x + 1 + value.len() as u16, chunks[0].y + 1));
}

fn draw_loading_overlay(f: &mut Frame, message: &str) {
    let area = centered_rect(40, 10, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Cargando ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(block);

    f.render_widget(text, area);
}

fn draw_error_popup(f: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(text, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
