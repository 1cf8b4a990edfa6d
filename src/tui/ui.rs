//! UI rendering for the walkthrough.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    style::{Color, Style, Modifier},
};
use crate::playback::CellHighlight;
use crate::script::{CellKind, Component, Instruction, Phase};
use super::app::WalkthroughApp;
use std::time::Instant;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &WalkthroughApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    // Left side: CPU, buses, narration, status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_cpu(frame, left_chunks[0], app);
    draw_buses(frame, left_chunks[1], app);
    draw_narration(frame, left_chunks[2], app);
    draw_progress(frame, left_chunks[3], app);
    draw_status(frame, left_chunks[4], app);

    // Right side: memory and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(5),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the CPU: registers, control unit and ALU, lit when active.
fn draw_cpu(frame: &mut Frame, area: Rect, app: &WalkthroughApp) {
    let step = app.controller.current_step();
    let regs = &step.registers;

    let pc = regs.pc.map_or_else(|| "—".to_string(), |pc| pc.to_string());
    let ir = match regs.ir.as_deref() {
        None | Some("") => "—".to_string(),
        Some(text) => text.to_string(),
    };
    let acc = regs.acc.map_or_else(|| "—".to_string(), |acc| acc.to_string());

    let decoded = regs
        .ir
        .as_deref()
        .and_then(|text| text.parse::<Instruction>().ok())
        .map(|instr| instr.opcode().effect())
        .unwrap_or("");

    let alu = step.alu_operation.as_deref().unwrap_or("idle");

    let content = vec![
        component_line(app, Component::ProgramCounter, "PC  ", pc),
        component_line(app, Component::InstructionRegister, "IR  ", ir),
        component_line(app, Component::Accumulator, "ACC ", acc),
        Line::from(""),
        component_line(app, Component::ControlUnit, "CU  ", decoded.to_string()),
        component_line(app, Component::Alu, "ALU ", alu.to_string()),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" CPU ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

fn component_line(app: &WalkthroughApp, component: Component, label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label.to_string(), component_style(app, component)),
        Span::raw(" "),
        Span::styled(value, Style::default().fg(Color::White)),
        Span::styled(format!("   {}", component.label()), Style::default().fg(Color::DarkGray)),
    ])
}

/// Draw the address and data buses with the current transfer.
fn draw_buses(frame: &mut Frame, area: Rect, app: &WalkthroughApp) {
    let step = app.controller.current_step();

    let lines: Vec<Line> = [Component::AddressBus, Component::DataBus]
        .into_iter()
        .map(|bus| {
            let transfer = step
                .bus_transfer
                .as_ref()
                .filter(|t| t.signal.bus() == bus)
                .map(|t| format!("{} → {}  [{}]", t.from.label(), t.to.label(), t.signal.display_value()))
                .unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("{:<12}", bus.label()), component_style(app, bus)),
                Span::raw(transfer),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .title(" Buses ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(paragraph, area);
}

/// Draw the phase, title and narration of the current step.
fn draw_narration(frame: &mut Frame, area: Rect, app: &WalkthroughApp) {
    let step = app.controller.current_step();

    let content = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", step.phase), phase_style(step.phase)),
            Span::raw("  "),
            Span::styled(step.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(step.narration.clone()),
    ];

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .block(Block::default()
            .title(" Walkthrough ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)));

    frame.render_widget(paragraph, area);
}

/// Draw the position gauge.
fn draw_progress(frame: &mut Frame, area: Rect, app: &WalkthroughApp) {
    let position = app.controller.position();
    let len = app.controller.len();
    let ratio = if len > 1 { position as f64 / (len - 1) as f64 } else { 1.0 };

    let mut label = format!("Step {}/{}", position + 1, len);
    if let Some(remaining) = app.autoplay_remaining(Instant::now()) {
        label.push_str(&format!("  ▶ next in {:.1}s", remaining.as_secs_f64()));
    }

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);

    frame.render_widget(gauge, area);
}

/// Draw memory with per-cell highlighting.
fn draw_memory(frame: &mut Frame, area: Rect, app: &WalkthroughApp) {
    let memory_active = app.controller.is_active(Component::Memory);

    let items: Vec<ListItem> = app
        .controller
        .state()
        .memory
        .cells()
        .map(|cell| {
            let highlight = app.controller.cell_highlight(cell);
            let marker = match highlight {
                CellHighlight::None => "  ",
                CellHighlight::Address => "A ",
                CellHighlight::Data => "D ",
                CellHighlight::Write => "W ",
            };
            let text = format!(
                "{}{:02}: {:<10} {}",
                marker,
                cell.address,
                cell.content,
                cell.description.as_deref().unwrap_or("")
            );

            let style = match (highlight, cell.kind) {
                (CellHighlight::Write, _) => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                (CellHighlight::Address | CellHighlight::Data, _) => {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                }
                (CellHighlight::None, CellKind::Instruction) => Style::default().fg(Color::Cyan),
                (CellHighlight::None, CellKind::Data) => Style::default().fg(Color::White),
                (CellHighlight::None, CellKind::Empty) => Style::default().fg(Color::DarkGray),
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let border = if memory_active { Color::Yellow } else { Color::Magenta };
    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)));

    frame.render_widget(list, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &WalkthroughApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("→/space: Next  ←: Back  r: Reset"),
        Line::from("Home/End: First/Last  a: Autoplay  q: Quit"),
        Line::from("A: address bus  D: data bus  W: write"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

/// Style for a component label: lit when active, brighter while transitioning.
fn component_style(app: &WalkthroughApp, component: Component) -> Style {
    if !app.controller.is_active(component) {
        return Style::default().fg(Color::DarkGray);
    }
    let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    if app.controller.is_transitioning() {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

/// Get color style for a phase badge.
fn phase_style(phase: Phase) -> Style {
    let color = match phase {
        Phase::Fetch => Color::Blue,
        Phase::Decode => Color::Magenta,
        Phase::Execute => Color::Green,
        Phase::Idle => Color::Gray,
    };
    Style::default().fg(Color::Black).bg(color)
}
