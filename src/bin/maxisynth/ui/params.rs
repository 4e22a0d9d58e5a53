//! Parameter page widget

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use maxisynth::{
    unit::{ParamDescriptor, ParamKind, NUM_PAGES, PAGE_SIZE, UNIT_HEADER},
    Param, NUM_PARAMS,
};

fn format_value(index: usize, desc: &ParamDescriptor, value: i32) -> String {
    if let Some(label) = Param::from_index(index as u8).and_then(|p| p.display_str(value)) {
        return label.to_string();
    }

    let number = if desc.fractional == 0 {
        value.to_string()
    } else {
        let scale = 10f32.powi(desc.fractional as i32);
        format!("{:.*}", desc.fractional as usize, value as f32 / scale)
    };
    match desc.kind {
        ParamKind::Percent => format!("{number}%"),
        ParamKind::Msec => format!("{number} ms"),
        _ => number,
    }
}

/// Render one page of four parameters with the selected row highlighted
pub fn render_params(
    frame: &mut Frame,
    area: Rect,
    page: usize,
    selected: usize,
    values: &[i32; NUM_PARAMS],
) {
    let block = Block::default()
        .title(format!(" Page {}/{} ", page + 1, NUM_PAGES))
        .borders(Borders::ALL);

    let rows = UNIT_HEADER.page(page).iter().enumerate().map(|(slot, desc)| {
        let index = page * PAGE_SIZE + slot;
        let style = if slot == selected {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(desc.name),
            Cell::from(format_value(index, desc, values[index])),
            Cell::from(format!("{}..{}", desc.min, desc.max)).style(Style::default().fg(Color::DarkGray)),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [Constraint::Length(10), Constraint::Length(12), Constraint::Min(10)],
    )
    .block(block);

    frame.render_widget(table, area);
}
