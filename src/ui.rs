//! The single job-details screen: rendering plus key handling.
//!
//! The screen itself holds only presentation state (the pending
//! single-line input, if any); everything it displays comes straight
//! from the tracker's job snapshot.

use bigdecimal::BigDecimal;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use crate::api::ApiError;
use crate::models::job::{EmployeeAssignment, JobStatus};
use crate::tracker::{ActionSet, JobProgressTracker};
use crate::utils::timefmt;

/// What the event loop should do with a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum ScreenCommand {
    None,
    Quit,
    StartWork,
    FinishWork,
    CompleteJob,
    Refresh,
    AddCost { amount: BigDecimal, note: String },
    AddNote { text: String },
}

/// In-progress single-line entry. Cost entry is two steps (amount,
/// then the required note); the job note is one.
enum PendingInput {
    CostAmount { buffer: String },
    CostNote { amount: BigDecimal, buffer: String },
    Note { buffer: String },
}

#[derive(Default)]
pub struct JobScreen {
    input: Option<PendingInput>,
}

impl JobScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a key press into a command, honoring the offered
    /// action set. Keys for actions the tracker does not currently
    /// offer are ignored.
    pub fn handle_key(&mut self, key: KeyCode, actions: &ActionSet) -> ScreenCommand {
        if self.input.is_some() {
            return self.handle_input_key(key);
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => ScreenCommand::Quit,
            KeyCode::Char('s') if actions.start => ScreenCommand::StartWork,
            KeyCode::Char('f') if actions.finish => ScreenCommand::FinishWork,
            KeyCode::Char('c') if actions.complete => ScreenCommand::CompleteJob,
            KeyCode::Char('a') if actions.add_cost => {
                self.input = Some(PendingInput::CostAmount {
                    buffer: String::new(),
                });
                ScreenCommand::None
            }
            KeyCode::Char('n') if actions.add_note => {
                self.input = Some(PendingInput::Note {
                    buffer: String::new(),
                });
                ScreenCommand::None
            }
            KeyCode::Char('r') => ScreenCommand::Refresh,
            _ => ScreenCommand::None,
        }
    }

    fn handle_input_key(&mut self, key: KeyCode) -> ScreenCommand {
        match key {
            KeyCode::Esc => {
                self.input = None;
                ScreenCommand::None
            }
            KeyCode::Char(c) => {
                if let Some(input) = &mut self.input {
                    match input {
                        PendingInput::CostAmount { buffer }
                        | PendingInput::CostNote { buffer, .. }
                        | PendingInput::Note { buffer } => buffer.push(c),
                    }
                }
                ScreenCommand::None
            }
            KeyCode::Backspace => {
                if let Some(input) = &mut self.input {
                    match input {
                        PendingInput::CostAmount { buffer }
                        | PendingInput::CostNote { buffer, .. }
                        | PendingInput::Note { buffer } => {
                            buffer.pop();
                        }
                    }
                }
                ScreenCommand::None
            }
            KeyCode::Enter => self.submit_input(),
            _ => ScreenCommand::None,
        }
    }

    fn submit_input(&mut self) -> ScreenCommand {
        match self.input.take() {
            Some(PendingInput::CostAmount { buffer }) => {
                match buffer.trim().parse::<BigDecimal>() {
                    Ok(amount) => {
                        self.input = Some(PendingInput::CostNote {
                            amount,
                            buffer: String::new(),
                        });
                    }
                    Err(_) => {
                        // Not a number; reopen the amount prompt empty.
                        self.input = Some(PendingInput::CostAmount {
                            buffer: String::new(),
                        });
                    }
                }
                ScreenCommand::None
            }
            Some(PendingInput::CostNote { amount, buffer }) => ScreenCommand::AddCost {
                amount,
                note: buffer,
            },
            Some(PendingInput::Note { buffer }) => ScreenCommand::AddNote { text: buffer },
            None => ScreenCommand::None,
        }
    }

    fn prompt(&self) -> Option<String> {
        match &self.input {
            Some(PendingInput::CostAmount { buffer }) => {
                Some(format!("Additional cost amount: {buffer}_"))
            }
            Some(PendingInput::CostNote { amount, buffer }) => {
                Some(format!("Cost note (amount {amount}): {buffer}_"))
            }
            Some(PendingInput::Note { buffer }) => Some(format!("Job note: {buffer}_")),
            None => None,
        }
    }
}

fn status_color(status: &JobStatus) -> Color {
    match status {
        JobStatus::New => Color::Cyan,
        JobStatus::Ongoing => Color::Yellow,
        JobStatus::Completed => Color::Green,
        JobStatus::Other(_) => Color::Gray,
    }
}

/// Render the whole job-details screen.
pub fn render(frame: &mut Frame, tracker: &JobProgressTracker, screen: &JobScreen) {
    let job = tracker.job();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header + status badge
            Constraint::Length(4), // customer / vehicle reference
            Constraint::Min(6),    // assignments table
            Constraint::Length(3), // job note
            Constraint::Length(3), // actions / input prompt
            Constraint::Length(1), // transient banner
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::raw(format!("Job #{}: {}  ", job.assignment_id, job.service_item.name)),
        Span::styled(
            format!("[{}]", job.job_status.badge_label()),
            Style::default()
                .fg(status_color(&job.job_status))
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().title("Appointment Job").borders(Borders::ALL));

    let reference = Paragraph::new(format!(
        "Customer: {} ({})\nVehicle: {} | Est. duration: {} | Additional costs: {}",
        job.customer.label(),
        job.customer.contact_number,
        job.vehicle.label(),
        job.service_item.estimated_duration,
        job.additional_cost
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "—".to_string()),
    ))
    .block(Block::default().title("Details").borders(Borders::ALL))
    .wrap(Wrap { trim: true });

    let me = tracker.user().employee_id;
    let rows: Vec<Row> = job
        .job_assignments
        .iter()
        .map(|a| {
            let name = if a.employee_id == me {
                format!("{} (you)", a.employee_name)
            } else {
                a.employee_name.clone()
            };
            Row::new(vec![
                Cell::from(name),
                Cell::from(a.start_time.map(timefmt::hms).unwrap_or_else(|| "—".to_string())),
                Cell::from(a.end_time.map(timefmt::hms).unwrap_or_else(|| "—".to_string())),
                Cell::from(a.elapsed_label().unwrap_or_else(|| "—".to_string())),
                Cell::from(cost_label(a)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(26),
            Constraint::Percentage(14),
            Constraint::Percentage(14),
            Constraint::Percentage(14),
            Constraint::Percentage(32),
        ],
    )
    .header(
        Row::new(vec!["Employee", "Start", "End", "Elapsed", "Cost"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title("Work Sessions").borders(Borders::ALL));

    let note = Paragraph::new(job.job_note.clone().unwrap_or_else(|| "—".to_string()))
        .block(Block::default().title("Job Note").borders(Borders::ALL))
        .wrap(Wrap { trim: true });

    let footer_text = screen
        .prompt()
        .unwrap_or_else(|| action_hints(&tracker.actions(), tracker.own_assignment().is_some()));
    let footer = Paragraph::new(footer_text)
        .block(Block::default().title("Actions").borders(Borders::ALL));

    frame.render_widget(header, layout[0]);
    frame.render_widget(reference, layout[1]);
    frame.render_widget(table, layout[2]);
    frame.render_widget(note, layout[3]);
    frame.render_widget(footer, layout[4]);

    if let Some(message) = tracker.banner() {
        let banner = Paragraph::new(message.to_string())
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
        frame.render_widget(banner, layout[5]);
    }
}

/// Full-page error state shown when the initial fetch fails; no stale
/// or partial data is rendered behind it.
pub fn render_load_failure(frame: &mut Frame, assignment_id: i64, error: &ApiError) {
    let body = Paragraph::new(format!(
        "Failed to load job #{assignment_id}.\n\n{error}\n\nPress any key to exit."
    ))
    .style(Style::default().fg(Color::Red))
    .block(Block::default().title("Error").borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    frame.render_widget(body, frame.area());
}

/// Recorded cost with its justification, or a placeholder while the
/// assignment has none. Once set this is the read-only form the cost
/// input is permanently replaced with.
fn cost_label(assignment: &EmployeeAssignment) -> String {
    match (&assignment.additional_cost, &assignment.cost_note) {
        (Some(cost), Some(note)) => format!("{cost} ({note})"),
        (Some(cost), None) => cost.to_string(),
        _ => "—".to_string(),
    }
}

fn action_hints(actions: &ActionSet, assigned: bool) -> String {
    let mut hints = Vec::new();
    if !assigned {
        hints.push("You are not assigned to this job.");
    }
    if actions.start {
        hints.push("[s] start work");
    }
    if actions.finish {
        hints.push("[f] finish work");
    }
    if actions.add_cost {
        hints.push("[a] add cost");
    }
    if actions.add_note {
        hints.push("[n] job note");
    }
    if actions.complete {
        hints.push("[c] complete job");
    }
    hints.push("[r] refresh");
    hints.push("[q] quit");
    hints.join("  ")
}
