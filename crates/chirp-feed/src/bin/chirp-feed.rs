//! Terminal front end for a Chirp profile feed.
//!
//! Reads commands from stdin: an empty line (or `more`) loads the next page
//! the way scrolling to the bottom does, `like <id>` / `rechirp <id>` toggle
//! an interaction, `list` reprints the feed, `quit` exits.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use anyhow::{Context, anyhow};
use tokio::io::{AsyncBufReadExt, BufReader};

use chirp_feed::http::HttpClient;
use chirp_feed::interaction::{ActionButton, Navigator};
use chirp_feed::relative_time::{TimestampSurface, TimestampTicker};
use chirp_feed::render::action_icon;
use chirp_feed::{FeedConfig, FeedItem, FeedPager, FeedView, InteractionClient};
use chirp_types::api::InteractAction;

#[derive(Default)]
struct TerminalView {
    items: RefCell<Vec<FeedItem>>,
    labels: RefCell<HashMap<i64, String>>,
    offset: Cell<u32>,
}

impl TerminalView {
    fn contains(&self, chirp_id: i64) -> bool {
        self.items.borrow().iter().any(|item| item.id == chirp_id)
    }

    fn print_item(&self, item: &FeedItem) {
        let label = self
            .labels
            .borrow()
            .get(&item.id)
            .cloned()
            .unwrap_or_default();
        let verified = if item.verified { " [verified]" } else { "" };
        println!("[{}] {}{} @{}  {}", item.id, item.display_name, verified, item.username, label);
        for line in item.body.lines() {
            println!("    {}", line);
        }
        let mine = |action| if item.is_active(action) { " (you)" } else { "" };
        println!(
            "    replies {}  rechirps {}{}  likes {}{}  {}",
            item.reply_count,
            item.count(InteractAction::Rechirp),
            mine(InteractAction::Rechirp),
            item.count(InteractAction::Like),
            mine(InteractAction::Like),
            item.permalink,
        );
    }

    fn print_all(&self) {
        for item in self.items.borrow().iter() {
            self.print_item(item);
        }
        println!("-- offset {} --", self.offset.get());
    }

    fn update<F: FnOnce(&mut FeedItem)>(&self, chirp_id: i64, f: F) {
        let mut items = self.items.borrow_mut();
        if let Some(item) = items.iter_mut().find(|item| item.id == chirp_id) {
            f(item);
        }
    }
}

impl TimestampSurface for TerminalView {
    fn timestamps(&self) -> Vec<(i64, i64)> {
        self.items
            .borrow()
            .iter()
            .map(|item| (item.id, item.timestamp))
            .collect()
    }

    fn set_relative_time(&self, chirp_id: i64, label: &str) {
        self.labels.borrow_mut().insert(chirp_id, label.to_string());
    }
}

impl FeedView for TerminalView {
    fn show_loading(&self) {
        println!("loading...");
    }

    fn hide_loading(&self) {}

    fn append_item(&self, item: &FeedItem) {
        self.items.borrow_mut().push(item.clone());
    }

    fn set_offset(&self, offset: u32) {
        self.offset.set(offset);
    }

    fn show_end_of_feed(&self) {
        println!("-- no more chirps --");
    }
}

struct TerminalButton<'a> {
    view: &'a TerminalView,
    chirp_id: i64,
    action: InteractAction,
}

impl ActionButton for TerminalButton<'_> {
    fn set_icon(&self, icon: &str) {
        let active = icon == action_icon(self.action, true);
        self.view
            .update(self.chirp_id, |item| item.apply(self.action, Some(active), None));
    }

    fn set_count(&self, count: u64) {
        self.view
            .update(self.chirp_id, |item| item.apply(self.action, None, Some(count)));
    }
}

struct TerminalNavigator {
    base_url: String,
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        println!("Sign in required: open {}{}", self.base_url, route);
    }
}

enum Command {
    More,
    Toggle(i64, InteractAction),
    List,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("more");
        let id = words.next().and_then(|w| w.parse::<i64>().ok());

        match (verb, id) {
            ("more", _) => Self::More,
            ("list", _) => Self::List,
            ("quit" | "exit", _) => Self::Quit,
            ("like", Some(id)) => Self::Toggle(id, InteractAction::Like),
            ("rechirp", Some(id)) => Self::Toggle(id, InteractAction::Rechirp),
            _ => Self::Unknown(line.trim().to_string()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirp_feed=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let user: i64 = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: chirp-feed <user-id>"))?
        .parse()
        .context("user id must be an integer")?;
    let base_url =
        std::env::var("CHIRP_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".into());
    let token = std::env::var("CHIRP_TOKEN").ok().filter(|t| !t.is_empty());

    let config = FeedConfig::default();
    let http = HttpClient::new(&base_url, token);
    let navigator = TerminalNavigator {
        base_url: http.base_url().to_string(),
    };
    let pager = FeedPager::new(http.clone(), TerminalView::default(), user, config.clone());
    let interactions = InteractionClient::new(http, navigator, config.request_timeout);
    let ticker = TimestampTicker::new(config.tick_interval);

    println!("enter: next page | like <id> | rechirp <id> | list | quit");

    let commands = async {
        pager.start().await;
        pager.view().print_all();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Command::More => {
                    let before = pager.view().items.borrow().len();
                    pager.request_next_page().await;
                    let items = pager.view().items.borrow();
                    for item in &items[before..] {
                        pager.view().print_item(item);
                    }
                }
                Command::Toggle(chirp_id, action) => {
                    if !pager.view().contains(chirp_id) {
                        println!("chirp {} is not on the page", chirp_id);
                        continue;
                    }
                    let button = TerminalButton {
                        view: pager.view(),
                        chirp_id,
                        action,
                    };
                    interactions.toggle(chirp_id, action, &button).await;
                    if let Some(item) = pager.view().items.borrow().iter().find(|i| i.id == chirp_id) {
                        pager.view().print_item(item);
                    }
                }
                Command::List => pager.view().print_all(),
                Command::Quit => break,
                Command::Unknown(input) => println!("unknown command: {}", input),
            }
        }

        Ok::<_, anyhow::Error>(())
    };

    tokio::select! {
        result = commands => result?,
        _ = ticker.run(pager.view()) => {}
    }

    Ok(())
}
