//! Interactive terminal catalog browser

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use gamedex_engine::render;
use gamedex_engine::{CatalogEngine, CatalogPage, CatalogView, ScrollMetrics, ScrollOutcome};
use gamedex_fetch::ListingSource;
use gamedex_library::{GameRecord, RatingSort};

use crate::commands::{card_line, stars_line};

/// Nominal height of one list row when reporting scroll geometry
const ROW_HEIGHT: f64 = 24.0;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    Details,
}

struct App<L> {
    engine: Arc<CatalogEngine<L>>,
    mode: Mode,
    view: CatalogView,
    list_state: ListState,
    visible_rows: usize,
    search_input: String,
    /// One debounced search per keystroke; superseded ones finish with `None`
    pending_searches: Vec<JoinHandle<Option<CatalogPage>>>,
    genre: usize,
    platform: usize,
    status: String,
    should_quit: bool,
}

impl<L: ListingSource + 'static> App<L> {
    fn new(engine: CatalogEngine<L>) -> Self {
        let view = engine.current_view();
        Self {
            engine: Arc::new(engine),
            mode: Mode::Browse,
            view,
            list_state: ListState::default(),
            visible_rows: 1,
            search_input: String::new(),
            pending_searches: Vec::new(),
            genre: 0,
            platform: 0,
            status: "Loading...".to_string(),
            should_quit: false,
        }
    }

    async fn load(&mut self) {
        self.status = match self.engine.load().await {
            Ok(page) => format!("{} games loaded", page.total_count),
            Err(e) => format!("Error: {} ([r] retry)", e),
        };
        self.show(self.engine.current_view());
    }

    async fn handle_input(&mut self, key: KeyCode) {
        match self.mode {
            Mode::Browse => self.handle_browse_input(key).await,
            Mode::Search => self.handle_search_input(key),
            Mode::Details => self.handle_details_input(key),
        }
    }

    async fn handle_browse_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next().await,
            KeyCode::Left | KeyCode::PageUp => self.change_page(-1),
            KeyCode::Right | KeyCode::PageDown => self.change_page(1),
            KeyCode::Enter => {
                if self.selected_record().is_some() {
                    self.mode = Mode::Details;
                }
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.status = "Type to search, [Enter] done".to_string();
            }
            KeyCode::Char('g') => self.cycle_genre(),
            KeyCode::Char('p') => self.cycle_platform(),
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('f') => self.toggle_favorite(),
            KeyCode::Char('v') => {
                let view = self.engine.toggle_view_mode();
                self.show(view);
                self.list_state.select(self.first_row());
            }
            KeyCode::Char('r') => {
                if self.engine.current_page().is_retryable() {
                    self.status = "Retrying...".to_string();
                    self.load().await;
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.queue_search();
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.queue_search();
            }
            KeyCode::Enter | KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.status.clear();
            }
            _ => {}
        }
    }

    fn handle_details_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c @ '1'..='5') => self.rate(i64::from(c as u8 - b'0')),
            KeyCode::Char('f') => self.toggle_favorite(),
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                self.mode = Mode::Browse;
                self.show(self.engine.current_view());
            }
            _ => {}
        }
    }

    fn queue_search(&mut self) {
        let engine = Arc::clone(&self.engine);
        let term = self.search_input.clone();
        self.pending_searches
            .push(tokio::spawn(async move { engine.search_debounced(&term).await }));
    }

    /// Show the result of any debounced search that has settled
    async fn tick(&mut self) {
        let (finished, pending): (Vec<_>, Vec<_>) = self
            .pending_searches
            .drain(..)
            .partition(|handle| handle.is_finished());
        self.pending_searches = pending;

        for handle in finished {
            match handle.await {
                Ok(Some(page)) => {
                    self.status = format!("{} matches", page.total_count);
                    self.show(self.engine.current_view());
                    self.list_state.select(self.first_row());
                }
                Ok(None) => {}
                Err(e) => warn!("Search task failed: {}", e),
            }
        }
    }

    fn show(&mut self, view: CatalogView) {
        let len = view.records().len();
        self.view = view;
        let selected = match self.list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }

    fn first_row(&self) -> Option<usize> {
        (!self.view.records().is_empty()).then_some(0)
    }

    fn selected_record(&self) -> Option<&GameRecord> {
        self.list_state
            .selected()
            .and_then(|i| self.view.records().get(i))
    }

    fn select_prev(&mut self) {
        if let Some(i) = self.list_state.selected()
            && i > 0
        {
            self.list_state.select(Some(i - 1));
        }
    }

    /// Moving past the last row counts as scrolling to the bottom. An empty
    /// page is always at the bottom.
    async fn select_next(&mut self) {
        let len = self.view.records().len();
        match self.list_state.selected() {
            Some(i) if i + 1 < len => self.list_state.select(Some(i + 1)),
            Some(i) => self.scroll(i, len).await,
            None if len == 0 => self.scroll(0, 0).await,
            None => {}
        }
    }

    async fn scroll(&mut self, selected: usize, len: usize) {
        let metrics = scroll_metrics(selected, self.visible_rows, len);
        match self.engine.on_scroll(metrics).await {
            ScrollOutcome::Advanced(page) => {
                self.status = render::pagination_label(&page);
                self.show(CatalogView::Catalog(page));
                self.list_state.select(self.first_row());
            }
            ScrollOutcome::Extended(page) => {
                self.status = format!("Loaded more games ({} total)", page.total_count);
                self.show(CatalogView::Catalog(page));
            }
            ScrollOutcome::Exhausted => self.status = "End of catalog".to_string(),
            ScrollOutcome::Failed(e) => self.status = format!("Error: {}", e),
            ScrollOutcome::Ignored => {}
        }
    }

    fn change_page(&mut self, delta: i64) {
        if self.view.is_favorites() {
            return;
        }
        let page = self.engine.change_page(delta);
        self.show(CatalogView::Catalog(page));
        self.list_state.select(self.first_row());
    }

    fn cycle_genre(&mut self) {
        let genres = self.engine.filter_options().genres;
        self.genre = (self.genre + 1) % (genres.len() + 1);
        let value = choice_at(&genres, self.genre);
        match self.engine.set_genre_filter(value) {
            Ok(_) => self.after_filter_change(),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn cycle_platform(&mut self) {
        let platforms = self.engine.filter_options().platforms;
        self.platform = (self.platform + 1) % (platforms.len() + 1);
        let value = choice_at(&platforms, self.platform);
        match self.engine.set_platform_filter(value) {
            Ok(_) => self.after_filter_change(),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn cycle_sort(&mut self) {
        let sort = next_sort(self.engine.criteria().rating_sort);
        self.engine.set_rating_sort(sort);
        self.after_filter_change();
    }

    fn after_filter_change(&mut self) {
        self.show(self.engine.current_view());
        self.list_state.select(self.first_row());
    }

    fn toggle_favorite(&mut self) {
        let Some(record) = self.selected_record().cloned() else {
            return;
        };
        let view = self.engine.toggle_favorite(&record);
        self.status = if self.engine.is_favorite(&record.id) {
            "Added to favorites".to_string()
        } else {
            "Removed from favorites".to_string()
        };
        // Details keep showing the record even if it left the favorites list
        if self.mode != Mode::Details {
            self.show(view);
        }
    }

    fn rate(&mut self, stars: i64) {
        let Some(id) = self.selected_record().map(|r| r.id.clone()) else {
            return;
        };
        self.status = match self.engine.set_rating(&id, stars) {
            Ok(stars) => render::rating_confirmation(stars),
            Err(e) => e.to_string(),
        };
    }

    fn criteria_line(&self) -> String {
        let criteria = self.engine.criteria();
        let platform = criteria
            .platform
            .as_ref()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| "all".to_string());
        format!(
            "Search: {:<20} Genre: {:<12} Platform: {:<12} Sort: {}",
            if self.search_input.is_empty() { "-" } else { &self.search_input },
            criteria.genre.as_deref().unwrap_or("all"),
            platform,
            criteria.rating_sort.as_str()
        )
    }
}

/// Scroll geometry for a list with `total` rows, `visible` on screen and
/// the cursor on row `selected`
fn scroll_metrics(selected: usize, visible: usize, total: usize) -> ScrollMetrics {
    let visible = visible.max(1);
    let first_visible = (selected + 1).saturating_sub(visible);
    ScrollMetrics::new(
        first_visible as f64 * ROW_HEIGHT,
        visible as f64 * ROW_HEIGHT,
        total as f64 * ROW_HEIGHT,
    )
}

/// `index` 0 means "all"
fn choice_at(choices: &[String], index: usize) -> &str {
    index
        .checked_sub(1)
        .and_then(|i| choices.get(i))
        .map(String::as_str)
        .unwrap_or("all")
}

fn next_sort(sort: RatingSort) -> RatingSort {
    match sort {
        RatingSort::None => RatingSort::Descending,
        RatingSort::Descending => RatingSort::Ascending,
        RatingSort::Ascending => RatingSort::None,
    }
}

fn draw_ui<L: ListingSource + 'static>(frame: &mut Frame, app: &mut App<L>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);

    match app.mode {
        Mode::Details => draw_details(frame, chunks[1], app),
        Mode::Browse | Mode::Search => draw_list(frame, chunks[1], app),
    }

    draw_footer(frame, chunks[2], app);
}

fn draw_header<L: ListingSource + 'static>(frame: &mut Frame, area: Rect, app: &App<L>) {
    let title = match (&app.view, app.mode) {
        (_, Mode::Details) => "Gamedex - Game Info",
        (CatalogView::Favorites(_), _) => "Gamedex - Favorites",
        (CatalogView::Catalog(_), _) => "Gamedex - Catalog",
    };

    let mut search_style = Style::default();
    if app.mode == Mode::Search {
        search_style = search_style.fg(Color::Yellow);
    }

    let text = Text::from(vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(app.criteria_line(), search_style)),
    ]);

    let header = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_list<L: ListingSource + 'static>(frame: &mut Frame, area: Rect, app: &mut App<L>) {
    app.visible_rows = area.height.saturating_sub(2).max(1) as usize;

    let block_title = match &app.view {
        CatalogView::Catalog(page) if page.loading => "Games (loading...)".to_string(),
        CatalogView::Catalog(page) => render::pagination_label(page),
        CatalogView::Favorites(records) => format!("{} favorites", records.len()),
    };
    let block = Block::default().borders(Borders::ALL).title(block_title);

    if app.view.records().is_empty() {
        let lines = match &app.view {
            CatalogView::Catalog(page) => {
                let (headline, hint) = render::empty_state(page.filters_active);
                let mut lines = vec![Line::from(headline)];
                if let Some(hint) = hint {
                    lines.push(Line::from(hint));
                }
                if let Some(error) = &page.error {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        format!("{} ([r] retry)", error),
                        Style::default().fg(Color::Red),
                    )));
                }
                lines
            }
            CatalogView::Favorites(_) => vec![Line::from(render::empty_favorites())],
        };
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .engine
        .cards(app.view.records())
        .iter()
        .map(|card| ListItem::new(card_line(card)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_details<L: ListingSource + 'static>(frame: &mut Frame, area: Rect, app: &App<L>) {
    let content = match app.selected_record() {
        Some(record) => {
            let details = app.engine.details(record);
            let field = |label: &'static str, value: String| {
                Line::from(vec![
                    Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(value),
                ])
            };

            let mut lines = vec![
                field("Title: ", details.title.clone()),
                field("Genres: ", details.genres.clone()),
                field("Platforms: ", details.platforms.clone()),
                field("Developers: ", details.developers.clone()),
                field("Publishers: ", details.publishers.clone()),
                field("Released: ", details.release_date.clone()),
                field("Rating: ", details.rating.clone()),
                field("Your rating: ", stars_line(&details.stars)),
            ];
            if let Some(website) = &details.website {
                lines.push(field("Website: ", website.clone()));
            }
            lines.push(field("Image: ", details.image.clone()));
            lines.push(Line::from(""));
            lines.push(Line::from(details.description.clone()));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("[f] {}", details.favorite_label()),
                Style::default().fg(Color::Yellow),
            )));
            Text::from(lines)
        }
        None => Text::raw("No game selected"),
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Game Info"))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_footer<L: ListingSource + 'static>(frame: &mut Frame, area: Rect, app: &App<L>) {
    let help_text = match app.mode {
        Mode::Browse => {
            "[↑↓] Navigate  [←→] Page  [/] Search  [G]enre [P]latform [S]ort  [F]avorite  [V]iew  [Enter] Info  [Q] Quit"
        }
        Mode::Search => "[Type] Search  [Backspace] Delete  [Enter] Done",
        Mode::Details => "[1-5] Rate  [F] Favorite  [B] Back",
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, chunks[0]);
    frame.render_widget(status, chunks[1]);
}

/// Run the browser until the user quits
pub(crate) async fn run<L: ListingSource + 'static>(engine: CatalogEngine<L>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(engine);
    let result = event_loop(&mut terminal, &mut app).await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop<L: ListingSource + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<L>,
) -> Result<()> {
    terminal.draw(|f| draw_ui(f, app))?;
    app.load().await;

    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, app))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_input(key.code).await;
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.tick().await;
            last_tick = Instant::now();
        }

        if app.should_quit {
            info!("Browser closed");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedex_config::GamedexConfig;
    use gamedex_fetch::mock::MockListing;
    use gamedex_storage::MemoryStore;
    use std::sync::Arc;

    fn app(total: usize) -> App<MockListing> {
        let engine = CatalogEngine::new(
            &GamedexConfig::default(),
            MockListing::with_generated(total, 100),
            Arc::new(MemoryStore::new()),
        );
        App::new(engine)
    }

    #[test]
    fn test_scroll_metrics_at_last_row_is_near_bottom() {
        let metrics = scroll_metrics(31, 10, 32);
        assert!(metrics.is_near_bottom(100.0));

        let metrics = scroll_metrics(5, 10, 32);
        assert!(!metrics.is_near_bottom(100.0));
    }

    #[test]
    fn test_choice_at() {
        let choices = vec!["Action".to_string(), "RPG".to_string()];
        assert_eq!(choice_at(&choices, 0), "all");
        assert_eq!(choice_at(&choices, 2), "RPG");
        assert_eq!(choice_at(&choices, 3), "all");
    }

    #[test]
    fn test_sort_cycle_returns_to_none() {
        let mut sort = RatingSort::None;
        for _ in 0..3 {
            sort = next_sort(sort);
        }
        assert_eq!(sort, RatingSort::None);
    }

    #[tokio::test]
    async fn test_moving_past_last_row_advances_page() {
        let mut app = app(100);
        app.load().await;
        assert_eq!(app.status, "100 games loaded");
        assert_eq!(app.list_state.selected(), Some(0));

        for _ in 0..31 {
            app.handle_input(KeyCode::Down).await;
        }
        assert_eq!(app.list_state.selected(), Some(31));

        app.handle_input(KeyCode::Down).await;
        assert_eq!(app.engine.current_page().current_page, 2);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_applies_on_tick_after_quiet_period() {
        let mut app = app(100);
        app.load().await;

        app.handle_input(KeyCode::Char('/')).await;
        for c in "game 42".chars() {
            app.handle_input(KeyCode::Char(c)).await;
        }
        assert_eq!(app.mode, Mode::Search);
        assert_eq!(app.pending_searches.len(), 7);

        app.tick().await;
        assert_eq!(app.view.records().len(), 32);

        tokio::time::sleep(Duration::from_millis(400)).await;
        while !app.pending_searches.iter().all(|h| h.is_finished()) {
            tokio::task::yield_now().await;
        }
        app.tick().await;
        assert!(app.pending_searches.is_empty());
        assert_eq!(app.view.records().len(), 1);
        assert_eq!(app.status, "1 matches");
        assert_eq!(app.engine.criteria().search_term, "game 42");
    }

    #[tokio::test]
    async fn test_down_on_empty_page_extends_from_remote() {
        let mut app = app(300);
        app.load().await;
        assert_eq!(app.engine.record_count(), 100);

        app.engine.search("zzz");
        app.show(app.engine.current_view());
        assert_eq!(app.list_state.selected(), None);

        app.handle_input(KeyCode::Down).await;
        assert_eq!(app.engine.record_count(), 200);
        assert_eq!(app.engine.source().requests(), vec![1, 2]);
        assert_eq!(app.status, "Loaded more games (0 total)");
    }

    #[tokio::test]
    async fn test_rate_from_details() {
        let mut app = app(10);
        app.load().await;

        app.handle_input(KeyCode::Enter).await;
        assert_eq!(app.mode, Mode::Details);

        app.handle_input(KeyCode::Char('4')).await;
        assert_eq!(app.status, "Thank you! You rated this game 4/5 stars.");
        assert_eq!(app.engine.rating(&gamedex_library::GameId::from(0)), Some(4));
    }

    #[tokio::test]
    async fn test_favorites_view_toggle() {
        let mut app = app(10);
        app.load().await;

        app.handle_input(KeyCode::Char('f')).await;
        assert_eq!(app.status, "Added to favorites");

        app.handle_input(KeyCode::Char('v')).await;
        assert!(app.view.is_favorites());
        assert_eq!(app.view.records().len(), 1);
    }
}
