use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use crate::camera::DOTS_PER_COL;
use crate::camera::DOTS_PER_ROW;
use crate::events::AppEvent;
use crate::events::Event;
use crate::events::ViewEvent;
use crate::viewport::Direction;
use crate::viewport::Point;
use crate::viewport::Zoom;

/// Converts a crossterm event into a viewer event
///
/// ```notrust
/// h j k l, arrows   pan
/// + K               zoom in
/// - J               zoom out
/// mouse wheel       zoom around the pointer
/// 0                 reset the view
/// r                 reconnect
/// q, ctrl-c         exit
/// ```
pub fn convert_event(event: CrossTermEvent) -> Option<Event> {
    match event {
        CrossTermEvent::Key(key_event) => convert_key(key_event),
        CrossTermEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            ..
        }) => {
            let zoom = match kind {
                MouseEventKind::ScrollUp => Zoom::In,
                MouseEventKind::ScrollDown => Zoom::Out,
                _ => return None,
            };

            Some(Event::ViewEvent(ViewEvent::ZoomAt {
                at: cell_center(column, row),
                zoom,
            }))
        }
        CrossTermEvent::Resize(cols, rows) => {
            Some(Event::ViewEvent(ViewEvent::Resize { cols, rows }))
        }
        _ => None,
    }
}

fn convert_key(key_event: KeyEvent) -> Option<Event> {
    // Some terminals also report releases
    if key_event.kind == KeyEventKind::Release {
        return None;
    }

    let view = |e| Some(Event::ViewEvent(e));

    match key_event {
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        }
        | KeyEvent {
            code: KeyCode::Char('q'),
            ..
        } => Some(Event::AppEvent(AppEvent::Exit)),
        KeyEvent {
            code: KeyCode::Char('r'),
            ..
        } => Some(Event::AppEvent(AppEvent::Reconnect)),
        KeyEvent {
            code: KeyCode::Char('h') | KeyCode::Left,
            ..
        } => view(ViewEvent::Pan(Direction::Left)),
        KeyEvent {
            code: KeyCode::Char('j') | KeyCode::Down,
            ..
        } => view(ViewEvent::Pan(Direction::Down)),
        KeyEvent {
            code: KeyCode::Char('k') | KeyCode::Up,
            ..
        } => view(ViewEvent::Pan(Direction::Up)),
        KeyEvent {
            code: KeyCode::Char('l') | KeyCode::Right,
            ..
        } => view(ViewEvent::Pan(Direction::Right)),
        KeyEvent {
            code: KeyCode::Char('+' | '=' | 'K'),
            ..
        } => view(ViewEvent::Zoom(Zoom::In)),
        KeyEvent {
            code: KeyCode::Char('-' | 'J'),
            ..
        } => view(ViewEvent::Zoom(Zoom::Out)),
        KeyEvent {
            code: KeyCode::Char('0'),
            ..
        } => view(ViewEvent::ResetView),
        _ => None,
    }
}

/// Center of a terminal cell, in dots
pub fn cell_center(column: u16, row: u16) -> Point {
    (
        (column as usize * DOTS_PER_COL) as f64 + DOTS_PER_COL as f64 / 2.0,
        (row as usize * DOTS_PER_ROW) as f64 + DOTS_PER_ROW as f64 / 2.0,
    )
}
