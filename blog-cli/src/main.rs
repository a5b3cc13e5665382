use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use blog_client::filter::{
    DEFAULT_RELATED_LIMIT, PostFilter, excerpt, reading_time_minutes, related_posts, tag_counts,
};
use blog_client::markdown::render_html;
use blog_client::{BlogClient, BlogClientError, NewPost, Post, PostUpdate};
use clap::{Parser, Subcommand};

const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";
const SERVER_ENV: &str = "BLOG_SERVER";

#[derive(Debug, Parser)]
#[command(name = "blog-cli", version, about = "CLI клиент для blog-server")]
struct Cli {
    /// Адрес сервера (по умолчанию $BLOG_SERVER или http://127.0.0.1:8080).
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Список постов, новые первыми.
    List {
        /// Поиск по заголовку и тексту (без учёта регистра).
        #[arg(long)]
        search: Option<String>,
        /// Только посты с этим тегом.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Теги и число постов по каждому.
    Tags,
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
        /// Вывести содержимое как HTML.
        #[arg(long)]
        render: bool,
    },
    /// Создание поста.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
        content: Option<String>,
        /// Прочитать содержимое из файла.
        #[arg(long)]
        content_file: Option<PathBuf>,
        /// Тег (можно указать несколько раз).
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Обновление поста: меняются только указанные поля.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Новый набор тегов (заменяет текущий).
        #[arg(long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,
        /// Удалить все теги.
        #[arg(long)]
        clear_tags: bool,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let client = BlogClient::new(server).map_err(map_client_error)?;

    match cli.command {
        Command::List { search, tag } => {
            let posts = client.list_posts().await.map_err(load_failed)?;
            let filter = PostFilter { search, tag };
            print_list(&filter.apply(&posts));
        }
        Command::Tags => {
            let posts = client.list_posts().await.map_err(load_failed)?;
            print_tags(&tag_counts(&posts));
        }
        Command::Get { id, render } => {
            let post = client.get_post(id).await.map_err(detail_failed)?;
            print_post("Пост", &post);
            if render {
                println!();
                print!("{}", render_html(&post.content));
            }

            // related posts are best effort
            if let Ok(posts) = client.list_posts().await {
                let related = related_posts(&post, &posts, DEFAULT_RELATED_LIMIT);
                if !related.is_empty() {
                    println!();
                    println!("Похожие посты:");
                    print_list(&related);
                }
            }
        }
        Command::Create {
            title,
            content,
            content_file,
            tags,
        } => {
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("не удалось прочитать {}", path.display()))?,
                (None, None) => bail!("укажите --content или --content-file"),
            };

            let post = client
                .create_post(NewPost::new(title, content).with_tags(tags))
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post);
        }
        Command::Update {
            id,
            title,
            content,
            tags,
            clear_tags,
        } => {
            let update = build_update(title, content, tags, clear_tags);
            if update.is_empty() {
                bail!("нечего обновлять: укажите --title, --content, --tag или --clear-tags");
            }

            let post = client
                .update_post(id, update)
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post);
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
    }

    Ok(())
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn build_update(
    title: Option<String>,
    content: Option<String>,
    tags: Vec<String>,
    clear_tags: bool,
) -> PostUpdate {
    let tags = if clear_tags {
        Some(Vec::new())
    } else if tags.is_empty() {
        None
    } else {
        Some(tags)
    };

    PostUpdate {
        title,
        content,
        tags,
    }
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match err {
        BlogClientError::NotFound => "пост не найден".to_string(),
        BlogClientError::Validation { message, errors } => {
            let fields: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            format!("{message}: {}", fields.join("; "))
        }
        BlogClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        BlogClientError::Server(message) => format!("ошибка сервера: {message}"),
        BlogClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn load_failed(err: BlogClientError) -> anyhow::Error {
    anyhow::anyhow!("не удалось загрузить посты ({})", map_client_error(err))
}

fn detail_failed(err: BlogClientError) -> anyhow::Error {
    match err {
        BlogClientError::Http(_) | BlogClientError::Server(_) => map_client_error(err),
        _ => anyhow::anyhow!("пост не найден"),
    }
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return "-".to_string();
    }
    tags.join(", ")
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("tags: {}", format_tags(&post.tags));
    println!("created_at: {}", post.created_at);
    println!("reading_time: {} мин", reading_time_minutes(&post.content));
    println!("content:");
    println!("{}", post.content);
}

fn print_list(posts: &[&Post]) {
    println!("Постов: {}", posts.len());

    for post in posts {
        println!(
            "- [{}] {} ({}, {} мин)",
            post.id,
            post.title,
            format_tags(&post.tags),
            reading_time_minutes(&post.content)
        );
        let preview = excerpt(&post.content);
        if !preview.is_empty() {
            println!("  {}", preview.replace('\n', " "));
        }
    }
}

fn print_tags(counts: &[(String, usize)]) {
    if counts.is_empty() {
        println!("Тегов нет");
        return;
    }

    for (tag, count) in counts {
        println!("{tag}: {count}");
    }
}
