//! `mailsift` - search, fetch and decode mail from an IMAP folder.

#![forbid(unsafe_code)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailsift_core::{
    FetchOptions, FetchResult, FetchStream, MailboxConfig, SearchCriteria, Uid, generate,
};

use cli::{Cli, Command, FetchArgs};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailsift=info,mailsift_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = MailboxConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Fetch(args) => fetch(&config, &args).await,
        Command::Validate => {
            mailsift_core::validate_credentials(&config)
                .await
                .context("mailbox validation failed")?;
            info!(host = %config.host, folder = %config.folder, "mailbox is reachable");
            Ok(())
        }
        Command::MarkRead { uids } => mailsift_core::mark_read(&config, &to_uids(&uids)?)
            .await
            .context("marking messages read"),
        Command::MarkUnread { uids } => mailsift_core::mark_unread(&config, &to_uids(&uids)?)
            .await
            .context("marking messages unread"),
        Command::Delete { uids } => mailsift_core::delete(&config, &to_uids(&uids)?)
            .await
            .context("deleting messages"),
        Command::VisibleText { unseen } => visible_text(&config, unseen).await,
    }
}

fn to_uids(raw: &[u32]) -> Result<Vec<Uid>> {
    raw.iter()
        .map(|&n| Uid::new(n).with_context(|| format!("invalid UID {n}")))
        .collect()
}

async fn open_stream(
    config: &MailboxConfig,
    criteria: SearchCriteria,
    options: FetchOptions,
) -> Result<FetchStream> {
    generate(config, criteria, options)
        .await
        .with_context(|| format!("opening {} on {}", config.folder, config.host))
}

async fn fetch(config: &MailboxConfig, args: &FetchArgs) -> Result<()> {
    let options = FetchOptions::default()
        .mark_as_read(args.mark_read)
        .delete(args.delete);
    let mut stream = open_stream(config, args.search_criteria(), options).await?;

    let mut delivered = 0usize;
    let mut failed = 0usize;
    while let Some(result) = stream.next().await {
        match result {
            FetchResult::Email(email) => {
                delivered += 1;
                if args.json {
                    println!("{}", serde_json::to_string(&email)?);
                } else {
                    print!("{email}");
                }
            }
            FetchResult::Failed { uid, error } => {
                failed += 1;
                tracing::warn!(?uid, %error, "message skipped");
            }
            FetchResult::Aborted(error) => {
                return Err(error).context("fetch aborted");
            }
        }
    }

    info!(delivered, failed, "fetch finished");
    if failed > 0 {
        bail!("{failed} message(s) failed");
    }
    Ok(())
}

async fn visible_text(config: &MailboxConfig, unseen: bool) -> Result<()> {
    let criteria = if unseen {
        SearchCriteria::unseen()
    } else {
        SearchCriteria::all()
    };
    let (emails, errors) = open_stream(config, criteria, FetchOptions::default())
        .await?
        .collect()
        .await;

    for email in &emails {
        println!("# {} {}", email.uid, email.subject);
        for chunk in email.visible_text() {
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                println!("{chunk}");
            }
        }
    }
    for error in &errors {
        tracing::warn!(%error, uid = ?error.uid(), "message skipped");
    }
    if let Some(fatal) = errors.into_iter().find(mailsift_core::Error::is_fatal) {
        return Err(fatal).context("fetch aborted");
    }
    Ok(())
}
