use clap::{Parser, Subcommand};
use gutendex_browser::browser::{BrowseError, Browser, LoadOutcome, Retried};
use gutendex_browser::catalog::gutendex;
use gutendex_browser::configs;
use gutendex_browser::item::Filters;
use gutendex_browser::storage::{FileStore, KeyValueStore};
use gutendex_browser::view;
use gutendex_browser::view::detail::render_detail;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::rc::Rc;
use tracing::error;

type GutendexBrowser = Browser<gutendex::Client>;

#[derive(Parser)]
#[command(name = "gutendex-browser", version, about = "Gutendex 도서 카탈로그 브라우저")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 도서 목록을 조회한다. 필터를 지정하면 다음 실행에도 유지 된다.
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        genre: Option<String>,
    },
    /// 도서 상세 정보를 조회한다.
    Show {
        id: Option<String>,
    },
    /// 위시리스트를 보여준다.
    Wishlist {
        #[command(subcommand)]
        action: Option<WishlistAction>,
    },
    /// 대화형으로 목록을 탐색한다.
    Browse,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// 도서를 위시리스트에 추가하거나 제거한다.
    Toggle { id: String },
    /// 위시리스트에서 제거한다.
    Remove { id: u64 },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    configs::load_dotenv();
    let config = match configs::load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match configs::logging::set_global_logging_config(config.logger()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let client = match gutendex::Client::from_config(config.catalog()) {
        Ok(client) => client,
        Err(err) => {
            error!("카탈로그 클라이언트를 생성할 수 없습니다. => {}", err);
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let storage: Rc<dyn KeyValueStore> = Rc::new(FileStore::new(config.storage().dir()));
    let mut browser = Browser::new(client, storage);

    let code = match cli.command {
        Command::List { page, search, genre } => run_list(&mut browser, page, search, genre),
        Command::Show { id } => run_show(&mut browser, id.as_deref()),
        Command::Wishlist { action } => run_wishlist(&mut browser, action),
        Command::Browse => run_browse(&mut browser),
    };

    browser.settle();
    code
}

fn run_list(browser: &mut GutendexBrowser, page: u32, search: Option<String>, genre: Option<String>) -> ExitCode {
    let loaded = if search.is_some() || genre.is_some() {
        let mut filters = browser.state().filters().clone();
        if let Some(search) = &search {
            filters.set_search(Some(search));
        }
        if let Some(genre) = &genre {
            filters.set_genre(Some(genre));
        }
        browser.apply_filters(filters).and_then(|outcome| {
            if page > 1 { browser.goto(page) } else { Ok(outcome) }
        })
    } else {
        browser.load(page)
    };

    match loaded {
        Ok(_) => {
            print!("{}", render_page(browser));
            ExitCode::SUCCESS
        }
        Err(err) => {
            print!("{}", view::render_error("books", &err));
            ExitCode::FAILURE
        }
    }
}

fn run_show(browser: &mut GutendexBrowser, id: Option<&str>) -> ExitCode {
    match browser.open_detail(id) {
        Ok(book) => {
            print!("{}", render_detail(&book, browser.wishlist().contains(book.id)));
            ExitCode::SUCCESS
        }
        Err(err @ (BrowseError::MissingIdentifier | BrowseError::InvalidIdentifier(_))) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
        Err(err) => {
            print!("{}", view::render_error("book details", &err));
            ExitCode::FAILURE
        }
    }
}

fn run_wishlist(browser: &mut GutendexBrowser, action: Option<WishlistAction>) -> ExitCode {
    match action {
        None => {}
        Some(WishlistAction::Toggle { id }) => {
            let book = match browser.open_detail(Some(&id)) {
                Ok(book) => book,
                Err(err) => {
                    println!("{}", err);
                    return ExitCode::FAILURE;
                }
            };
            match browser.wishlist_mut().toggle(&book) {
                Ok(toggle) => println!("{}", toggle),
                Err(err) => {
                    println!("{}", err);
                    return ExitCode::FAILURE;
                }
            }
        }
        Some(WishlistAction::Remove { id }) => match browser.wishlist_mut().remove(id) {
            Ok(true) => println!("Removed from Wishlist"),
            Ok(false) => println!("Book {} is not in the wishlist.", id),
            Err(err) => {
                println!("{}", err);
                return ExitCode::FAILURE;
            }
        },
    }

    print!("{}", browser.wishlist_view().render());
    ExitCode::SUCCESS
}

const BROWSE_HELP: &str = "\
commands: n(ext) | p(rev) | g <page> | s <term> | t <genre> | c(lear) | genres
          w <card#> (wishlist) | d <card#> (details) | wl (wishlist page) | r(etry) | h(elp) | q(uit)";

fn run_browse(browser: &mut GutendexBrowser) -> ExitCode {
    println!("{}", BROWSE_HELP);
    let page = browser.state().current_page();
    let outcome = browser.load(page);
    report(browser, "books", outcome);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(Ok(line)) = lines.next() else { break };
        let line = line.trim();
        let (command, argument) = line.split_once(' ')
            .map(|(command, argument)| (command, argument.trim()))
            .unwrap_or((line, ""));

        let outcome = match command {
            "" => continue,
            "q" | "quit" => break,
            "n" | "next" => browser.next(),
            "p" | "prev" => browser.previous(),
            "g" => match argument.parse::<u32>() {
                Ok(page) => browser.goto(page),
                Err(_) => {
                    println!("usage: g <page>");
                    continue;
                }
            },
            "s" => browser.set_search(argument),
            "t" => browser.set_genre(argument),
            "c" | "clear" => browser.clear_filters(),
            "r" | "retry" => match browser.retry() {
                Ok(Retried::Page(outcome)) => Ok(outcome),
                Ok(Retried::Detail(book)) => {
                    print!("{}", render_detail(&book, browser.wishlist().contains(book.id)));
                    continue;
                }
                Ok(Retried::Nothing) => {
                    println!("Nothing to retry.");
                    continue;
                }
                Err(err) => Err(err),
            },
            other => {
                run_view_command(browser, other, argument);
                continue;
            }
        };
        report(browser, "books", outcome);
    }

    ExitCode::SUCCESS
}

/// 상태를 바꾸지 않거나 위시리스트만 바꾸는 명령
fn run_view_command(browser: &mut GutendexBrowser, command: &str, argument: &str) {
    match command {
        "h" | "help" => println!("{}", BROWSE_HELP),
        "genres" => {
            let genres = browser.state().genres();
            if genres.is_empty() {
                println!("No genres on this page.");
            }
            for genre in genres {
                println!("  {}", genre);
            }
        }
        "w" => toggle_card(browser, argument),
        "d" => show_card(browser, argument),
        "wl" => print!("{}", browser.wishlist_view().render()),
        _ => println!("Unknown command: {}", command),
    }
}

fn report(browser: &GutendexBrowser, context: &str, outcome: Result<LoadOutcome, BrowseError>) {
    match outcome {
        Ok(LoadOutcome::Displayed) | Ok(LoadOutcome::Empty) => print!("{}", render_page(browser)),
        Ok(LoadOutcome::Unchanged) => println!("No more pages."),
        Ok(LoadOutcome::Stale) => {}
        Err(err) => print!("{}", view::render_error(context, &err)),
    }
}

fn render_page(browser: &GutendexBrowser) -> String {
    let state = browser.state();
    let header = describe_filters(state.filters());
    let body = browser.page_view().map(|v| v.render()).unwrap_or_default();
    format!("{}\n{}", header, body)
}

fn describe_filters(filters: &Filters) -> String {
    match (filters.search(), filters.genre()) {
        (None, None) => "All books".to_string(),
        (Some(search), None) => format!("Search: {}", search),
        (None, Some(genre)) => format!("Genre: {}", genre),
        (Some(search), Some(genre)) => format!("Search: {} / Genre: {}", search, genre),
    }
}

fn toggle_card(browser: &mut GutendexBrowser, argument: &str) {
    let Some(view) = browser.page_view() else {
        println!("No page loaded.");
        return;
    };
    let Some(card) = argument.parse::<usize>().ok().and_then(|n| view.card(n)) else {
        println!("usage: w <card#>");
        return;
    };

    match card.toggle(browser.wishlist_mut()) {
        Ok(toggle) => println!("{}", toggle),
        Err(err) => println!("{}", err),
    }
}

fn show_card(browser: &mut GutendexBrowser, argument: &str) {
    let id = browser.page_view()
        .and_then(|view| argument.parse::<usize>().ok().and_then(|n| view.card(n)).map(|card| card.id()));
    let Some(id) = id else {
        println!("usage: d <card#>");
        return;
    };

    match browser.detail(id) {
        Ok(book) => print!("{}", render_detail(&book, browser.wishlist().contains(book.id))),
        Err(err) => print!("{}", view::render_error("book details", &err)),
    }
}
