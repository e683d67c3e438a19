#![deny(rust_2018_idioms)]

use anyhow::{bail, Context, Result};
use gilt::{
    config::{self, AppConfig},
    display,
    drafts::DraftStore,
    types::{PartialRepositoryId, RepositoryId, WikiPage},
    App, GhClient, PersonalAccessToken,
};
use std::{env, fs, path::Path};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

async fn list_repositories(app: &App<'_>) -> Result<()> {
    let repos = app.fetch_repositories().await?;
    print!("{}", display::repositories_table(&repos)?);
    Ok(())
}

async fn list_all_issues(app: &App<'_>) -> Result<()> {
    let repos = app.fetch_repositories().await?;
    let sync = app.fetch_all_issues(&repos).await;
    print!("{}", display::issues_table(&sync.issues)?);
    for failure in &sync.failures {
        eprintln!("warning: {}: {:#}", failure.repository, failure.error);
    }
    Ok(())
}

async fn list_issues(app: &App<'_>, repo_id: RepositoryId) -> Result<()> {
    let issues = app.fetch_issues(&repo_id).await?;
    print!("{}", display::issues_table(&issues)?);
    Ok(())
}

async fn push_wiki_page(
    app: &App<'_>,
    repo_id: RepositoryId,
    title: String,
    file: Option<&Path>,
) -> Result<()> {
    let mut drafts = DraftStore::new(&config::default_drafts_path()?)?;
    let content = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read `{}`.", path.display()))?,
        None => drafts
            .get_draft(&title)?
            .with_context(|| format!("No draft for `{title}` and no --file given."))?,
    };

    // A page that already exists remotely must be pushed with its sha.
    let pages = app.fetch_wiki_pages(&repo_id).await?;
    let existing = pages.into_iter().find(|x| x.title == title);
    let verb = if existing.is_some() { "Updated" } else { "Created" };
    let page =
        existing.unwrap_or(WikiPage { title: title.clone(), content: String::new(), sha: None });

    let published = app.publish_wiki_page(&repo_id, &page, &content, &mut drafts).await?;
    println!("{verb} wiki page `{}` in {repo_id}.", published.title);
    Ok(())
}

fn login(username: String, token: String) -> Result<()> {
    let path = config::default_config_path()?;
    let mut config = AppConfig::load(&path)?;
    config.github.username = username;
    config.github.token = token;
    config.save(&path)?;
    println!("Credentials saved to `{}`.", path.display());
    Ok(())
}

fn env_or(var: &str, fallback: String) -> String {
    env::var(var).ok().filter(|x| !x.is_empty()).unwrap_or(fallback)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli::Cli { cmd } = cli::cmd();
    debug!(?cmd, "launched");

    // login writes the config file and needs no client
    let cmd = match cmd {
        cli::Command::Login { username, token } => return login(username, token),
        other => other,
    };

    // create app
    let config = AppConfig::load(&config::default_config_path()?)?;
    let username = env_or("GILT_USERNAME", config.github.username);
    let token = env_or("GILT_TOKEN", config.github.token);
    if username.is_empty() || token.is_empty() {
        bail!(
            "No GitHub credentials. Run `gilt login <username> <token>` \
             or set GILT_USERNAME and GILT_TOKEN."
        );
    }
    let token = PersonalAccessToken::new(&token);
    let client = GhClient::new(None, &token)?;
    let app = App { username: &username, client };

    // process command
    use cli::Command::*;
    match cmd {
        Login { .. } => unreachable!("handled before client construction"),
        Repos { cmd } => {
            use cli::repos::Command::*;
            match cmd {
                Ls {} => list_repositories(&app).await?,
            }
        }
        Issues { cmd } => {
            use cli::issues::Command::*;
            match cmd {
                Ls { repo: None } => list_all_issues(&app).await?,
                Ls { repo: Some(repo) } => {
                    list_issues(&app, repo.complete(&username)).await?
                }
                Create { repo, title, body } => {
                    let issue =
                        app.create_issue(&repo.complete(&username), title, body).await?;
                    println!("Created issue #{} in {}.", issue.number, issue.repository_name);
                }
                Close { repo, number } => {
                    let issue = app.close_issue(&repo.complete(&username), number).await?;
                    println!("Closed issue #{} in {}.", issue.number, issue.repository_name);
                }
                Reopen { repo, number } => {
                    let issue = app.reopen_issue(&repo.complete(&username), number).await?;
                    println!("Reopened issue #{} in {}.", issue.number, issue.repository_name);
                }
                Comments { repo, number } => {
                    let comments =
                        app.fetch_comments(&repo.complete(&username), number).await?;
                    print!("{}", display::comments_list(&comments));
                }
                Comment { repo, number, body } => {
                    app.post_comment(&repo.complete(&username), number, body).await?;
                    println!("Comment posted on #{number}.");
                }
            }
        }
        Discussions { cmd } => {
            use cli::discussions::Command::*;
            match cmd {
                Ls { repo } => {
                    let discussions =
                        app.fetch_discussions(&repo.complete(&username)).await?;
                    print!("{}", display::discussions_table(&discussions)?);
                }
            }
        }
        Stats { repo } => {
            let stats = app.fetch_stats(&repo.complete(&username)).await;
            print!("{}", display::stats_summary(&stats));
        }
        Wiki { cmd } => {
            use cli::wiki::Command::*;
            match cmd {
                Ls { repo } => {
                    let pages = app.fetch_wiki_pages(&repo.complete(&username)).await?;
                    print!("{}", display::wiki_pages_table(&pages)?);
                }
                Assets { repo } => {
                    let assets = app.fetch_repo_assets(&repo.complete(&username)).await?;
                    for asset in assets {
                        println!("{}\t{}", asset.name, asset.download_url);
                    }
                }
                Push { repo, title, file } => {
                    push_wiki_page(&app, repo.complete(&username), title, file.as_deref())
                        .await?
                }
                Drafts { cmd } => {
                    use cli::wiki::drafts::Command::*;
                    let mut drafts = DraftStore::new(&config::default_drafts_path()?)?;
                    match cmd {
                        Ls {} => {
                            for draft in drafts.list_drafts()? {
                                println!("{}\t{}", draft.page_title, draft.updated_at);
                            }
                        }
                        Save { title, file } => {
                            let content = fs::read_to_string(&file)?;
                            drafts.put_draft(&title, &content)?;
                            println!("Draft saved for `{title}`.");
                        }
                        Show { title } => {
                            let content = drafts
                                .get_draft(&title)?
                                .with_context(|| format!("No draft for `{title}`."))?;
                            print!("{content}");
                        }
                        Discard { title } => {
                            drafts.remove_draft(&title)?;
                            println!("Draft discarded for `{title}`.");
                        }
                    }
                }
            }
        }
    };

    if let Some(limit) = app.client.rate_limit() {
        debug!(remaining = limit.remaining, limit = limit.limit, "rate limit");
    }

    debug!("exiting");
    Ok(())
}
