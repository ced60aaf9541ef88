//! Stateless rendering of the board and status line.

use memory_tiles::Tile;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::tracker::TrackerTransport;
use crate::tui::app::App;

const CELL_WIDTH: u16 = 8;
const CELL_HEIGHT: u16 = 3;

/// Draws the whole screen.
pub fn draw<T: TrackerTransport>(frame: &mut Frame, app: &App<T>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(6),    // Board
            Constraint::Length(3), // Status
        ])
        .split(frame.area());

    let game = app.game().game();
    let tracking = if app.game().handle().is_active() {
        "tracked"
    } else {
        "offline"
    };
    let title = Paragraph::new(format!(
        "Memory Game   moves: {}   pairs: {}/{}   ({})",
        game.move_count(),
        game.matched_pairs(),
        game.symbols().pairs(),
        tracking
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_board(frame, chunks[1], app);

    let status = Paragraph::new(app.status())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);
}

fn draw_board<T: TrackerTransport>(frame: &mut Frame, area: Rect, app: &App<T>) {
    let board = app.game().game().board();
    let columns = app.columns();
    let rows = board.len().div_ceil(columns);

    let board_area = center_rect(
        area,
        CELL_WIDTH * columns as u16,
        CELL_HEIGHT * rows as u16,
    );
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CELL_HEIGHT); rows])
        .split(board_area);

    for (row, chunk) in board.chunks(columns).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(CELL_WIDTH); columns])
            .split(row_areas[row]);
        for (column, tile) in chunk.iter().enumerate() {
            let index = row * columns + column;
            draw_tile(frame, cells[column], app, tile, index == app.cursor());
        }
    }
}

fn draw_tile<T: TrackerTransport>(
    frame: &mut Frame,
    area: Rect,
    app: &App<T>,
    tile: &Tile,
    selected: bool,
) {
    let hinted = app.is_hinted(tile.id);
    let (face, style) = if tile.is_matched {
        (tile.content.as_str(), Style::default().fg(Color::Green))
    } else if tile.is_flipped {
        (
            tile.content.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    } else if hinted {
        (tile.content.as_str(), Style::default().fg(Color::Magenta))
    } else {
        ("?", Style::default().fg(Color::DarkGray))
    };

    let border = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let cell = Paragraph::new(Line::from(Span::styled(face, style)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(cell, area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(area.height.saturating_sub(height) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Length(area.width.saturating_sub(width) / 2),
        ])
        .split(vert[1])[1]
}
