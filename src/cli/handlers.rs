use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::app::AppContext;

use super::{types::WidgetArgs, Command};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(command: Command, ctx: &mut AppContext) -> Result<()> {
    match command {
        Command::Query {
            query,
            implicit_and,
            count,
        } => handle_query(&query, implicit_and, count, ctx).await,
        Command::Ls { folder } => print_json(&ctx.list(folder.as_deref())),
        Command::Folders {} => print_json(ctx.folders()),
        Command::Suggest {
            text,
            folder,
            limit,
        } => print_json(&ctx.suggest(&text, folder.as_deref(), limit)),
        Command::Daily { date } => {
            let note = ctx.open_daily(date.unwrap_or_else(today)).await?;
            print_json(&note)
        }
        Command::Week { date } => print_json(&ctx.week(date.unwrap_or_else(today))?),
        Command::Quote {} => handle_quote(ctx).await,
        Command::Widget { action } => handle_widget(action, ctx).await,
        Command::Config {} => {
            log::info!("config: {}/config.yaml", ctx.config().base_path());
            print!("{}", serde_yml::to_string(ctx.config())?);
            Ok(())
        }
    }
}

pub async fn handle_query(
    query: &str,
    implicit_and: bool,
    count: bool,
    ctx: &mut AppContext,
) -> Result<()> {
    if implicit_and {
        ctx.set_implicit_and(true);
    }

    let records = ctx.query(query).await?;

    if count {
        println!("{}", records.len());
        return Ok(());
    }

    print_json(&records)
}

pub async fn handle_quote(ctx: &mut AppContext) -> Result<()> {
    if !ctx.config().daily_quote {
        log::info!("daily quote is disabled");
        return Ok(());
    }

    match ctx.daily_quote(today()).await? {
        Some(quote) => print_json(&quote),
        None => {
            log::warn!("no daily quote available");
            Ok(())
        }
    }
}

pub async fn handle_widget(action: WidgetArgs, ctx: &AppContext) -> Result<()> {
    match action {
        WidgetArgs::List {} => print_json(&ctx.config().widgets),
        WidgetArgs::Run { title } => print_json(&ctx.run_widget(&title).await?),
    }
}
