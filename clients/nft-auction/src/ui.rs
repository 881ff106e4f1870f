//! Terminal front end of the auction panel.
//!
//! [`UiState`] owns focus and the notice history and turns key presses into
//! [`Command`]s; it knows nothing about the chain. [`run`] drives the draw and
//! input loop and dispatches each triggered action.
use commons::*;
use ratatui::{
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
    DefaultTerminal, Frame,
};
use std::{collections::VecDeque, io, sync::Arc, time::Duration};
use tracing::info;

use crate::connection::{Backend, ConnectionState};
use crate::events::{Action, Notice, NoticeKind, NoticeReceiver};
use crate::panel::AuctionPanel;
use crate::state::{AuctionForm, HighestBidView};

const MAX_NOTICES: usize = 5;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Create,
    Bid,
    Details,
}

impl Section {
    fn title(&self) -> &'static str {
        match self {
            Section::Create => "Create Auction",
            Section::Bid => "Place Bid",
            Section::Details => "Auction Details",
        }
    }
}

/// Something that can hold the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Section, FormField),
    Button(Section, Action),
}

/// Tab order. The NFT ID input appears once per section but edits the same
/// value.
pub const FOCUS_ORDER: [Focus; 11] = [
    Focus::Field(Section::Create, FormField::NftId),
    Focus::Field(Section::Create, FormField::StartPrice),
    Focus::Field(Section::Create, FormField::AuctionDuration),
    Focus::Button(Section::Create, Action::CreateAuction),
    Focus::Field(Section::Bid, FormField::NftId),
    Focus::Field(Section::Bid, FormField::BidAmount),
    Focus::Button(Section::Bid, Action::PlaceBid),
    Focus::Field(Section::Details, FormField::NftId),
    Focus::Button(Section::Details, Action::FetchHighestBid),
    Focus::Button(Section::Details, Action::EndAuction),
    Focus::Button(Section::Details, Action::WithdrawBid),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Backspace,
}

impl Edit {
    pub fn apply(&self, value: &mut String) {
        match self {
            Edit::Insert(c) => value.push(*c),
            Edit::Backspace => {
                value.pop();
            }
        }
    }
}

/// What a key press asks the loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    Edit(FormField, Edit),
    Trigger(Action),
    Quit,
}

#[derive(Debug, Default)]
pub struct UiState {
    focus: usize,
    notices: VecDeque<Notice>,
}

impl UiState {
    pub fn focus(&self) -> Focus {
        FOCUS_ORDER[self.focus]
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Keep the latest notices, newest first.
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_front(notice);
        self.notices.truncate(MAX_NOTICES);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        if key.kind != KeyEventKind::Press {
            return Command::None;
        }

        match key.code {
            KeyCode::Esc => Command::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(1);
                Command::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(FOCUS_ORDER.len() - 1);
                Command::None
            }
            KeyCode::Enter => match self.focus() {
                Focus::Button(_, action) => Command::Trigger(action),
                Focus::Field(..) => {
                    self.move_focus(1);
                    Command::None
                }
            },
            KeyCode::Backspace => match self.focus() {
                Focus::Field(_, field) => Command::Edit(field, Edit::Backspace),
                Focus::Button(..) => Command::None,
            },
            KeyCode::Char(c) => match self.focus() {
                Focus::Field(_, field) => Command::Edit(field, Edit::Insert(c)),
                Focus::Button(..) => Command::None,
            },
            _ => Command::None,
        }
    }

    fn move_focus(&mut self, step: usize) {
        self.focus = (self.focus + step) % FOCUS_ORDER.len();
    }
}

/// Run the terminal UI until the operator quits.
pub async fn run<B: Backend>(
    panel: Arc<AuctionPanel<B>>,
    notices: NoticeReceiver,
) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, panel, notices).await;
    ratatui::restore();
    result
}

async fn event_loop<B: Backend>(
    terminal: &mut DefaultTerminal,
    panel: Arc<AuctionPanel<B>>,
    mut notices: NoticeReceiver,
) -> io::Result<()> {
    let mut ui = UiState::default();

    loop {
        while let Ok(notice) = notices.try_recv() {
            ui.push_notice(notice);
        }

        let form = panel.form().await;
        let view = panel.highest_bid().await;
        terminal.draw(|frame| draw(frame, &ui, panel.connection(), &form, &view))?;

        if !tokio::task::block_in_place(|| event::poll(POLL_INTERVAL))? {
            continue;
        }
        let key = match event::read()? {
            Event::Key(key) => key,
            _ => continue,
        };

        match ui.handle_key(key) {
            Command::None => {}
            Command::Edit(field, edit) => {
                panel
                    .update_form(|form| edit.apply(form.get_mut(field)))
                    .await;
            }
            Command::Trigger(action) => {
                // Inputs are read now; the call itself runs in the background
                Arc::clone(&panel).dispatch(action).await;
            }
            Command::Quit => {
                info!("operator quit");
                return Ok(());
            }
        }
    }
}

fn draw<B: Backend>(
    frame: &mut Frame,
    ui: &UiState,
    connection: &ConnectionState<B>,
    form: &AuctionForm,
    view: &HighestBidView,
) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(MAX_NOTICES as u16 + 3),
    ])
    .areas(frame.area());

    match connection {
        ConnectionState::Ready(session) => {
            let line = Line::from(vec![
                Span::styled("chain ", Style::default().fg(Color::DarkGray)),
                Span::raw(session.chain_id.as_str()),
                Span::styled("  account ", Style::default().fg(Color::DarkGray)),
                Span::raw(session.account_address.as_str()),
                Span::styled("  contract ", Style::default().fg(Color::DarkGray)),
                Span::raw(session.contract_address.as_str()),
            ]);
            frame.render_widget(
                Paragraph::new(line).block(Block::bordered().title("NFT Auction")),
                header,
            );
            draw_sections(frame, body, ui, form, view);
        }
        ConnectionState::Failed(err) => {
            frame.render_widget(
                Paragraph::new(Line::styled(
                    "disconnected",
                    Style::default().fg(Color::Red),
                ))
                .block(Block::bordered().title("NFT Auction")),
                header,
            );
            let lines = vec![
                Line::styled(
                    "Initialization failed",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::from(err.to_string()),
                Line::from(""),
                Line::from(format!(
                    "Every action reports \"{}\". Fix the configuration and restart.",
                    NOT_INITIALIZED
                )),
            ];
            frame.render_widget(
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .block(Block::bordered().title("Error")),
                body,
            );
        }
    }

    draw_footer(frame, footer, ui);
}

fn draw_sections(
    frame: &mut Frame,
    area: Rect,
    ui: &UiState,
    form: &AuctionForm,
    view: &HighestBidView,
) {
    let [create, bid, details] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(area);

    for (section, area) in [
        (Section::Create, create),
        (Section::Bid, bid),
        (Section::Details, details),
    ] {
        let mut lines: Vec<Line> = FOCUS_ORDER
            .iter()
            .filter(|focus| focus_section(focus) == section)
            .map(|focus| focus_line(*focus, ui.focus() == *focus, form))
            .collect();
        if section == Section::Details {
            lines.push(Line::from(""));
            lines.extend(highest_bid_lines(view));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(section.title())),
            area,
        );
    }
}

fn focus_section(focus: &Focus) -> Section {
    match focus {
        Focus::Field(section, _) | Focus::Button(section, _) => *section,
    }
}

fn focus_line(focus: Focus, focused: bool, form: &AuctionForm) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    match focus {
        Focus::Field(_, field) => Line::from(vec![
            Span::styled(format!("{}{}: ", marker, field.label()), style),
            Span::raw(form.get(field).to_owned()),
        ]),
        Focus::Button(_, action) => {
            Line::styled(format!("{}[ {} ]", marker, action.label()), style)
        }
    }
}

fn highest_bid_lines(view: &HighestBidView) -> Vec<Line<'static>> {
    if view.loading {
        return vec![Line::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        )];
    }
    if let Some(err) = &view.error {
        return vec![Line::styled(
            format!("Error: {}", err),
            Style::default().fg(Color::Red),
        )];
    }
    match (&view.bidder, &view.amount) {
        (Some(bidder), Some(amount)) => vec![
            Line::from(format!("Highest Bidder: {}", bidder)),
            Line::from(format!("Highest Bid: {}", amount)),
        ],
        _ => vec![Line::styled(
            "No highest bid fetched",
            Style::default().fg(Color::DarkGray),
        )],
    }
}

fn draw_footer(frame: &mut Frame, area: Rect, ui: &UiState) {
    let mut lines: Vec<Line> = ui
        .notices()
        .map(|notice| {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Failure => Color::Red,
                NoticeKind::NotInitialized | NoticeKind::Invalid => Color::Yellow,
            };
            let text = if notice.superseded {
                format!("{} [superseded]", notice)
            } else {
                notice.to_string()
            };
            Line::styled(text, Style::default().fg(color))
        })
        .collect();
    lines.push(Line::styled(
        "Tab/Shift-Tab move  Enter run  Esc quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title("Messages")),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut ui = UiState::default();
        assert_eq!(ui.focus(), FOCUS_ORDER[0]);

        assert_eq!(ui.handle_key(press(KeyCode::BackTab)), Command::None);
        assert_eq!(
            ui.focus(),
            Focus::Button(Section::Details, Action::WithdrawBid)
        );

        assert_eq!(ui.handle_key(press(KeyCode::Tab)), Command::None);
        assert_eq!(ui.focus(), FOCUS_ORDER[0]);
    }

    #[test]
    fn test_typing_edits_focused_field() {
        let mut ui = UiState::default();
        ui.handle_key(press(KeyCode::Tab));

        assert_eq!(
            ui.handle_key(press(KeyCode::Char('7'))),
            Command::Edit(FormField::StartPrice, Edit::Insert('7'))
        );
        assert_eq!(
            ui.handle_key(press(KeyCode::Backspace)),
            Command::Edit(FormField::StartPrice, Edit::Backspace)
        );
    }

    #[test]
    fn test_enter_triggers_buttons_only() {
        let mut ui = UiState::default();
        assert_eq!(ui.handle_key(press(KeyCode::Enter)), Command::None);
        assert_eq!(
            ui.focus(),
            Focus::Field(Section::Create, FormField::StartPrice)
        );

        while ui.focus() != Focus::Button(Section::Details, Action::EndAuction) {
            ui.handle_key(press(KeyCode::Tab));
        }
        assert_eq!(ui.handle_key(press(KeyCode::Char('x'))), Command::None);
        assert_eq!(
            ui.handle_key(press(KeyCode::Enter)),
            Command::Trigger(Action::EndAuction)
        );
    }

    #[test]
    fn test_quit_keys() {
        let mut ui = UiState::default();
        assert_eq!(ui.handle_key(press(KeyCode::Esc)), Command::Quit);
        assert_eq!(
            ui.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Command::Quit
        );
    }

    #[test]
    fn test_notice_history_is_capped() {
        let mut ui = UiState::default();
        for _ in 0..MAX_NOTICES + 2 {
            ui.push_notice(Notice::not_initialized(Action::PlaceBid));
        }
        ui.push_notice(Notice::failure(Action::EndAuction, "auction still running"));

        assert_eq!(ui.notices().count(), MAX_NOTICES);
        assert_eq!(
            ui.notices().next().map(|notice| notice.action),
            Some(Action::EndAuction)
        );
    }

    #[test]
    fn test_edit_apply() {
        let mut value = String::from("1");
        Edit::Insert('2').apply(&mut value);
        assert_eq!(value, "12");
        Edit::Backspace.apply(&mut value);
        Edit::Backspace.apply(&mut value);
        Edit::Backspace.apply(&mut value);
        assert_eq!(value, "");
    }

    #[test]
    fn test_every_action_has_a_button() {
        for action in Action::ALL.iter() {
            assert!(FOCUS_ORDER
                .iter()
                .any(|focus| matches!(focus, Focus::Button(_, a) if a == action)));
        }
    }
}
